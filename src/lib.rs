//! jitzu - Create linked Jira issue hierarchies from templates
//!
//! Templates describe the tasks (and subtasks) of an epic and may include
//! other templates. jitzu flattens the include graph into one ordered task
//! list and creates the epic, its tasks and their subtasks in a single run,
//! linking them the way the target project expects (classic epic-link field
//! or next-gen bulk hierarchy call).

pub mod cli;
pub mod config;
pub mod domain;
pub mod orchestrate;
pub mod templates;
pub mod tracker;

pub use domain::{RunParameters, SubTask, Task, Template, WorkflowMode};
pub use orchestrate::{run, RunEvent, RunReport};
pub use templates::Resolver;
pub use tracker::IssueTracker;
