//! Epic-linking strategies
//!
//! Both strategies share the run skeleton in the engine and differ only in
//! how the epic is obtained and how tasks end up attached to it.

use tracing::warn;

use super::error::{RunError, Step};
use super::events::{ProgressSink, RunEvent};
use crate::domain::{
    find_field, CreatedIssue, Epic, IssueType, NewIssue, Project, RunParameters, WorkflowMode,
    EPIC_LINK_FIELD_NAME,
};
use crate::tracker::{IssueTracker, TrackerError};

/// Read-only state shared by every step of one run
pub struct RunContext<'a> {
    pub tracker: &'a dyn IssueTracker,
    pub project: &'a Project,
    pub params: &'a RunParameters,
}

impl RunContext<'_> {
    /// Creates a new epic from the run parameters
    pub fn create_epic(&self) -> Result<CreatedIssue, RunError> {
        let params = self.params;
        let issue = NewIssue::new(
            IssueType::Epic,
            &self.project.key,
            params.epic_title.clone().unwrap_or_default(),
        )
        .description(params.epic_description.clone().unwrap_or_default())
        .due_date(params.parsed_due_date());

        self.tracker
            .create_issue(&issue)
            .map_err(|source| RunError::Epic { source })
    }
}

/// How a run attaches its tasks to the epic
pub trait OrchestrationStrategy {
    fn mode(&self) -> WorkflowMode;

    /// Runs once after the project is resolved, before anything is created
    fn prepare(&mut self, _ctx: &RunContext<'_>, _sink: &mut dyn ProgressSink) {}

    fn resolve_epic(&mut self, ctx: &RunContext<'_>) -> Result<Epic, RunError>;

    /// Adjusts a task payload before it is sent
    fn task_issue(&self, issue: NewIssue, _epic: &Epic) -> NewIssue {
        issue
    }

    /// Called after each top-level task is created
    fn task_created(&mut self, _issue: &CreatedIssue, _step: &Step) -> Result<(), RunError> {
        Ok(())
    }

    /// Runs after every task and subtask exists
    fn finish(
        &mut self,
        _ctx: &RunContext<'_>,
        _epic: &Epic,
        _sink: &mut dyn ProgressSink,
    ) -> Result<(), RunError> {
        Ok(())
    }
}

/// Picks the strategy for a workflow mode
pub fn strategy_for(mode: WorkflowMode) -> Box<dyn OrchestrationStrategy> {
    match mode {
        WorkflowMode::Classic => Box::new(Classic::default()),
        WorkflowMode::NextGen => Box::new(NextGen::default()),
    }
}

/// Classic projects: the epic link is a custom field set at creation
///
/// When no "Epic Link" field exists the field id stays empty and the epic key
/// is still sent under it, leaving the tracker to reject or ignore it.
#[derive(Debug, Default)]
pub struct Classic {
    epic_link_field: String,
}

impl Classic {
    /// The discovered epic-link field id; empty when none was found
    pub fn epic_link_field(&self) -> &str {
        &self.epic_link_field
    }
}

impl OrchestrationStrategy for Classic {
    fn mode(&self) -> WorkflowMode {
        WorkflowMode::Classic
    }

    fn prepare(&mut self, ctx: &RunContext<'_>, sink: &mut dyn ProgressSink) {
        self.epic_link_field = match ctx.tracker.list_fields() {
            Ok(fields) => find_field(&fields, EPIC_LINK_FIELD_NAME)
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                warn!(error = %e, "could not list fields");
                String::new()
            }
        };

        if self.epic_link_field.is_empty() {
            let message = format!(
                "no \"{}\" field found; the epic key is sent under an empty field id",
                EPIC_LINK_FIELD_NAME
            );
            warn!("{}", message);
            sink.emit(RunEvent::Warning { message });
        }
    }

    fn resolve_epic(&mut self, ctx: &RunContext<'_>) -> Result<Epic, RunError> {
        match ctx.params.existing_epic() {
            Some(key) => Ok(Epic::Referenced {
                key: key.to_string(),
            }),
            None => ctx.create_epic().map(Epic::Created),
        }
    }

    fn task_issue(&self, issue: NewIssue, epic: &Epic) -> NewIssue {
        issue.field(self.epic_link_field.clone(), epic.key())
    }
}

/// Next-gen projects: children are attached with one bulk call at the end
#[derive(Debug, Default)]
pub struct NextGen {
    top_level_ids: Vec<u64>,
}

impl NextGen {
    /// Ids of the top-level issues created so far, in creation order
    pub fn top_level_ids(&self) -> &[u64] {
        &self.top_level_ids
    }
}

impl OrchestrationStrategy for NextGen {
    fn mode(&self) -> WorkflowMode {
        WorkflowMode::NextGen
    }

    fn resolve_epic(&mut self, ctx: &RunContext<'_>) -> Result<Epic, RunError> {
        match ctx.params.existing_epic() {
            Some(key) => ctx
                .tracker
                .get_issue(key)
                .map(Epic::Fetched)
                .map_err(|source| RunError::Epic { source }),
            None => ctx.create_epic().map(Epic::Created),
        }
    }

    fn task_created(&mut self, issue: &CreatedIssue, step: &Step) -> Result<(), RunError> {
        let id = issue.numeric_id().ok_or_else(|| RunError::IssueCreate {
            step: step.clone(),
            source: TrackerError::InvalidResponse(format!(
                "issue {} has non-numeric id {:?}",
                issue.key, issue.id
            )),
        })?;
        self.top_level_ids.push(id);
        Ok(())
    }

    fn finish(
        &mut self,
        ctx: &RunContext<'_>,
        epic: &Epic,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), RunError> {
        let epic_issue = epic.issue().ok_or(RunError::MissingEpic)?;

        ctx.tracker
            .link_children(ctx.project, epic_issue, &self.top_level_ids)
            .map_err(|source| RunError::BulkLink {
                epic: epic_issue.key.clone(),
                count: self.top_level_ids.len(),
                source,
            })?;

        sink.emit(RunEvent::Linked {
            epic: epic_issue.key.clone(),
            count: self.top_level_ids.len(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str, key: &str) -> CreatedIssue {
        CreatedIssue {
            id: id.into(),
            key: key.into(),
        }
    }

    #[test]
    fn strategy_matches_mode() {
        assert_eq!(strategy_for(WorkflowMode::Classic).mode(), WorkflowMode::Classic);
        assert_eq!(strategy_for(WorkflowMode::NextGen).mode(), WorkflowMode::NextGen);
    }

    #[test]
    fn classic_sets_epic_link_field() {
        let classic = Classic {
            epic_link_field: "customfield_10014".into(),
        };
        let epic = Epic::Referenced { key: "OPS-1".into() };

        let task = classic.task_issue(NewIssue::new(IssueType::Task, "OPS", "Setup"), &epic);
        assert_eq!(task.extra_fields["customfield_10014"], serde_json::json!("OPS-1"));
    }

    #[test]
    fn classic_without_field_sends_key_under_empty_id() {
        let classic = Classic::default();
        let epic = Epic::Referenced { key: "OPS-1".into() };

        let task = classic.task_issue(NewIssue::new(IssueType::Task, "OPS", "Setup"), &epic);
        assert_eq!(task.extra_fields.len(), 1);
        assert_eq!(task.extra_fields[""], serde_json::json!("OPS-1"));
        assert_eq!(classic.epic_link_field(), "");
    }

    #[test]
    fn next_gen_accumulates_numeric_ids() {
        let mut next_gen = NextGen::default();
        let step = Step::Task {
            index: 0,
            title: "Setup".into(),
        };

        next_gen.task_created(&issue("101", "OPS-2"), &step).unwrap();
        next_gen.task_created(&issue("102", "OPS-3"), &step).unwrap();
        assert_eq!(next_gen.top_level_ids(), &[101, 102]);

        let err = next_gen.task_created(&issue("x1", "OPS-4"), &step).unwrap_err();
        assert_eq!(err.step(), step);
        assert_eq!(next_gen.top_level_ids().len(), 2);
    }
}
