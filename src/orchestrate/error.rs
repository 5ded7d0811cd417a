//! Run failures

use std::fmt;

use thiserror::Error;

use crate::tracker::TrackerError;

/// Where in the run a failure happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Project,
    Epic,
    Task {
        index: usize,
        title: String,
    },
    SubTask {
        task_index: usize,
        index: usize,
        title: String,
    },
    Link,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Indices are zero-based internally, one-based for people
        match self {
            Step::Project => f.write_str("project lookup"),
            Step::Epic => f.write_str("epic"),
            Step::Task { index, title } => write!(f, "task {} \"{}\"", index + 1, title),
            Step::SubTask {
                task_index,
                index,
                title,
            } => write!(f, "subtask {} of task {} \"{}\"", index + 1, task_index + 1, title),
            Step::Link => f.write_str("epic linking"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Could not resolve project {key}: {source}")]
    Project {
        key: String,
        #[source]
        source: TrackerError,
    },

    #[error("Could not resolve epic: {source}")]
    Epic {
        #[source]
        source: TrackerError,
    },

    #[error("Failed to create {step}: {source}")]
    IssueCreate {
        step: Step,
        #[source]
        source: TrackerError,
    },

    #[error("Failed to link {count} issue(s) to epic {epic}: {source}")]
    BulkLink {
        epic: String,
        count: usize,
        #[source]
        source: TrackerError,
    },

    #[error("No epic issue is available to link children to")]
    MissingEpic,
}

impl RunError {
    /// The step that failed
    pub fn step(&self) -> Step {
        match self {
            RunError::Project { .. } => Step::Project,
            RunError::Epic { .. } | RunError::MissingEpic => Step::Epic,
            RunError::IssueCreate { step, .. } => step.clone(),
            RunError::BulkLink { .. } => Step::Link,
        }
    }

    /// Raw tracker response body, if one was returned
    pub fn detail(&self) -> Option<&str> {
        match self {
            RunError::Project { source, .. }
            | RunError::Epic { source }
            | RunError::IssueCreate { source, .. }
            | RunError::BulkLink { source, .. } => source.body(),
            RunError::MissingEpic => None,
        }
    }
}
