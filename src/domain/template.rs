//! Template domain model
//!
//! A template describes the child work of an epic: an ordered list of tasks,
//! each with optional subtasks, plus references to other templates that are
//! flattened in after its own tasks.

use serde::{Deserialize, Serialize};

/// A parsed template file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Informational version; any scalar is accepted
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,

    /// Other templates to flatten in, relative to the template directory
    pub includes: Vec<String>,

    /// Tasks contributed by this template
    pub tasks: Vec<Task>,
}

impl Template {
    /// Parses a template from YAML bytes
    ///
    /// Empty input yields an empty template.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        // A document holding only comments or `~` parses to unit
        let template: Option<Template> = serde_yaml::from_slice(bytes)?;
        Ok(template.unwrap_or_default())
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar version, found {:?}", other))),
    }
}

/// A task to be created under the epic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,

    /// Whether the run-level title prefix applies
    pub prefixable: bool,

    /// Subtasks parented to this task once it is created
    #[serde(alias = "subTasks", alias = "sub_tasks")]
    pub subtasks: Vec<SubTask>,
}

/// A subtask; same shape as [`Task`] but not nestable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubTask {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub prefixable: bool,
}

/// Shared behaviour of anything a template turns into an issue
pub trait TemplateItem {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn labels(&self) -> &[String];
    fn prefixable(&self) -> bool;

    /// Title with the run prefix applied
    ///
    /// The prefix is used only when it is non-empty and the item opted in.
    fn effective_title(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() && self.prefixable() => {
                format!("{} {}", prefix, self.title())
            }
            _ => self.title().to_string(),
        }
    }
}

impl TemplateItem for Task {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn prefixable(&self) -> bool {
        self.prefixable
    }
}

impl TemplateItem for SubTask {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn prefixable(&self) -> bool {
        self.prefixable
    }
}
