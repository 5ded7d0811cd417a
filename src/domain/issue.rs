//! Issue tracker domain model
//!
//! Shapes exchanged with the issue tracker plus the parameters of one run.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed format for due dates supplied by the user
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display name of the classic epic-link custom field
pub const EPIC_LINK_FIELD_NAME: &str = "Epic Link";

/// A tracker project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub key: String,

    #[serde(default)]
    pub name: String,
}

/// Field metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
}

/// Finds the id of the field with the given display name
pub fn find_field<'a>(fields: &'a [Field], name: &str) -> Option<&'a str> {
    fields.iter().find(|f| f.name == name).map(|f| f.id.as_str())
}

/// Issue types the engine creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    Epic,
    Task,
    SubTask,
    /// Any other type name, passed through verbatim
    Other(String),
}

impl IssueType {
    /// Name as the tracker expects it
    pub fn name(&self) -> &str {
        match self {
            IssueType::Epic => "Epic",
            IssueType::Task => "Task",
            IssueType::SubTask => "Sub-task",
            IssueType::Other(name) => name,
        }
    }

    /// Maps a user-supplied type name, case-insensitively, onto a known type
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "epic" => IssueType::Epic,
            "task" => IssueType::Task,
            "sub-task" | "subtask" => IssueType::SubTask,
            _ => IssueType::Other(name.to_string()),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to an existing issue, used as a subtask parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
}

/// Payload for one issue creation
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub issue_type: IssueType,
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub labels: Vec<String>,

    /// Additional fields merged into the payload (e.g. the epic-link field)
    pub extra_fields: BTreeMap<String, serde_json::Value>,

    pub parent: Option<IssueRef>,
    pub due_date: Option<NaiveDate>,
}

impl NewIssue {
    pub fn new(
        issue_type: IssueType,
        project_key: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            project_key: project_key.into(),
            summary: summary.into(),
            description: String::new(),
            labels: Vec::new(),
            extra_fields: BTreeMap::new(),
            parent: None,
            due_date: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn labels(mut self, labels: &[String]) -> Self {
        self.labels = labels.to_vec();
        self
    }

    pub fn field(mut self, id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra_fields.insert(id.into(), value.into());
        self
    }

    pub fn parent(mut self, parent: IssueRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// An issue as returned by the tracker after creation or lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

impl CreatedIssue {
    pub fn to_ref(&self) -> IssueRef {
        IssueRef {
            id: self.id.clone(),
            key: self.key.clone(),
        }
    }

    /// Numeric form of the id, required by the bulk hierarchy API
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// The epic a run attaches its tasks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Epic {
    /// Key supplied by the caller and used without checking it exists
    Referenced { key: String },
    /// Fetched from the tracker by key
    Fetched(CreatedIssue),
    /// Created during this run
    Created(CreatedIssue),
}

impl Epic {
    pub fn key(&self) -> &str {
        match self {
            Epic::Referenced { key } => key,
            Epic::Fetched(issue) | Epic::Created(issue) => &issue.key,
        }
    }

    /// The tracker issue, if the epic was fetched or created
    pub fn issue(&self) -> Option<&CreatedIssue> {
        match self {
            Epic::Referenced { .. } => None,
            Epic::Fetched(issue) | Epic::Created(issue) => Some(issue),
        }
    }
}

/// How the target project links tasks to epics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    /// Epic link set through a custom field at creation time
    #[default]
    Classic,
    /// Children attached with one bulk hierarchy call after creation
    NextGen,
}

impl fmt::Display for WorkflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowMode::Classic => f.write_str("classic"),
            WorkflowMode::NextGen => f.write_str("next-gen"),
        }
    }
}

/// Caller-supplied parameters of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunParameters {
    pub project_key: String,

    /// Existing epic to attach to; a new epic is created when absent
    pub epic_key: Option<String>,

    pub mode: WorkflowMode,

    /// Due date of a new epic, `YYYY-MM-DD`
    pub due_date: Option<String>,

    pub epic_title: Option<String>,
    pub epic_description: Option<String>,

    /// Prepended to the titles of prefixable items
    pub prefix: Option<String>,
}

impl RunParameters {
    pub fn new(project_key: impl Into<String>, mode: WorkflowMode) -> Self {
        Self {
            project_key: project_key.into(),
            mode,
            ..Default::default()
        }
    }

    /// The supplied epic key, ignoring blank values
    pub fn existing_epic(&self) -> Option<&str> {
        self.epic_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Parsed due date; `None` when absent or not in `YYYY-MM-DD` form
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(due_date = raw, error = %e, "ignoring unparseable due date");
                None
            }
        }
    }
}
