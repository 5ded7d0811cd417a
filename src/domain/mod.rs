//! Domain models for jitzu
//!
//! Contains templates and tracker-facing shapes without any I/O concerns.

mod issue;
mod template;

pub use issue::{
    find_field, CreatedIssue, Epic, Field, IssueRef, IssueType, NewIssue, Project, RunParameters,
    WorkflowMode, DUE_DATE_FORMAT, EPIC_LINK_FIELD_NAME,
};
pub use template::{SubTask, Task, Template, TemplateItem};
