//! Progress events and the final run report

use serde::Serialize;

use super::error::RunError;
use crate::domain::{CreatedIssue, Epic, WorkflowMode};

/// One observable step of a run, emitted as soon as it completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        mode: WorkflowMode,
        project: String,
        tasks: usize,
    },
    EpicCreated {
        issue: CreatedIssue,
    },
    EpicFetched {
        issue: CreatedIssue,
    },
    EpicReferenced {
        key: String,
    },
    TaskCreated {
        index: usize,
        title: String,
        issue: CreatedIssue,
    },
    SubTaskCreated {
        task_index: usize,
        index: usize,
        title: String,
        parent: String,
        issue: CreatedIssue,
    },
    Linked {
        epic: String,
        count: usize,
    },
    Warning {
        message: String,
    },
    NothingToDo,
    Finished {
        epic: String,
        created: usize,
    },
    Failed {
        step: String,
        error: String,
        detail: Option<String>,
    },
}

impl RunEvent {
    /// True for the last event of a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::NothingToDo | RunEvent::Finished { .. } | RunEvent::Failed { .. }
        )
    }

    pub(crate) fn failed(error: &RunError) -> Self {
        RunEvent::Failed {
            step: error.step().to_string(),
            error: error.to_string(),
            detail: error.detail().map(str::to_string),
        }
    }
}

/// Receives progress events in order
pub trait ProgressSink {
    fn emit(&mut self, event: RunEvent);
}

impl ProgressSink for Vec<RunEvent> {
    fn emit(&mut self, event: RunEvent) {
        self.push(event);
    }
}

/// Kind of issue a run created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedKind {
    Epic,
    Task,
    SubTask,
}

/// An issue created during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRecord {
    pub kind: CreatedKind,
    pub title: String,
    pub issue: CreatedIssue,

    /// Key of the parent task, for subtasks
    pub parent: Option<String>,
}

/// Terminal state of a run
#[derive(Debug)]
pub enum RunStatus {
    Done { epic: String },
    NothingToDo,
    Failed(RunError),
}

/// Everything a run produced
///
/// Issues created before a failure stay in `created`; nothing is rolled back.
#[derive(Debug)]
pub struct RunReport {
    pub created: Vec<CreatedRecord>,
    pub epic: Option<Epic>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, RunStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&RunError> {
        match &self.status {
            RunStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Converts the report into a result, keeping the error on failure
    pub fn into_result(self) -> Result<Vec<CreatedRecord>, RunError> {
        match self.status {
            RunStatus::Failed(e) => Err(e),
            _ => Ok(self.created),
        }
    }
}
