//! # Orchestration
//!
//! Turns a resolved task list into an epic with linked tasks and subtasks.
//!
//! ## Run Sequence
//!
//! ```text
//! project lookup -> epic (create / fetch / reference)
//!                      |
//!                      v
//!          +-> create task -> create its subtasks -+
//!          +------------- next task <--------------+
//!                      |
//!                      v
//!          bulk link (next-gen only) -> done
//! ```
//!
//! Any failure ends the run at that step. Nothing is retried and nothing
//! already created is removed.
//!
//! ## Strategies
//!
//! | Mode | Epic | Linking |
//! |------|------|---------|
//! | Classic | supplied key used as-is, or created | "Epic Link" custom field on each task |
//! | Next-gen | supplied key fetched, or created | one bulk call with all top-level task ids |
//!
//! ## Key Types
//!
//! - [`run`] - Executes a run on the calling thread
//! - [`spawn_run`] - Executes a run on a worker thread, streaming [`RunEvent`]s
//! - [`OrchestrationStrategy`] - The [`Classic`] / [`NextGen`] linking variants
//! - [`RunReport`] - Created issues plus the terminal status

mod engine;
mod error;
mod events;
mod strategy;
mod worker;

pub use engine::{run, run_with};
pub use error::{RunError, Step};
pub use events::{CreatedKind, CreatedRecord, ProgressSink, RunEvent, RunReport, RunStatus};
pub use strategy::{strategy_for, Classic, NextGen, OrchestrationStrategy, RunContext};
pub use worker::{spawn_run, ChannelSink, RunHandle};
