//! # Issue Tracker
//!
//! The capability the orchestration engine drives, plus its Jira REST
//! implementation.
//!
//! ## Operations
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `get_project` | Resolve a project key to its id |
//! | `list_fields` | Field metadata (classic epic-link discovery) |
//! | `create_issue` | Create an epic, task or subtask |
//! | `get_issue` | Fetch an existing issue by key |
//! | `link_children` | Attach issues to an epic in one call (next-gen) |
//!
//! Calls are blocking; the engine issues them one at a time.

mod jira;

use thiserror::Error;

use crate::domain::{CreatedIssue, Field, NewIssue, Project};

pub use jira::{issue_payload, IssueSummary, JiraClient, JiraConfig, ProjectSummary};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tracker returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid tracker configuration: {0}")]
    Config(String),
}

impl TrackerError {
    /// Raw response body, when the tracker sent one
    pub fn body(&self) -> Option<&str> {
        match self {
            TrackerError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Issue tracker capability consumed by the orchestration engine
pub trait IssueTracker: Send + Sync {
    /// Looks up a project by key; unknown keys yield [`TrackerError::NotFound`]
    fn get_project(&self, key: &str) -> Result<Project, TrackerError>;

    fn list_fields(&self) -> Result<Vec<Field>, TrackerError>;

    fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError>;

    fn get_issue(&self, key: &str) -> Result<CreatedIssue, TrackerError>;

    /// Attaches top-level issues to an epic in one call
    fn link_children(
        &self,
        project: &Project,
        epic: &CreatedIssue,
        issue_ids: &[u64],
    ) -> Result<(), TrackerError>;
}
