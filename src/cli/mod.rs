//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `tpl` | Create an epic with tasks and subtasks from templates |
//! | `templates list`, `templates show` | Inspect the template directory |
//! | `projects`, `epics` | List tracker projects and a project's epics |
//! | `issues search`, `issues add` | JQL search and single-issue creation |
//! | `config show`, `config path` | Inspect configuration |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON (one object per progress event for `tpl`)
//!
//! ## Logging
//!
//! Logs go to stderr. Use `--verbose` (or `-v`) for debug logs, or set
//! `RUST_LOG` for finer control:
//! ```bash
//! jitzu --verbose tpl -t release.yaml --dry-run
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod config_cmd;
mod logging;
mod output;
mod templates_cmd;
mod tpl;
mod tracker_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
