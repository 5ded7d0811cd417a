//! Run loop shared by both strategies
//!
//! Calls are strictly sequential: project, epic, then each task followed by
//! its subtasks, then the strategy's finishing step. The first failure ends
//! the run; already created issues are left in place.

use tracing::{error, info};

use super::error::{RunError, Step};
use super::events::{CreatedKind, CreatedRecord, ProgressSink, RunEvent, RunReport, RunStatus};
use super::strategy::{strategy_for, OrchestrationStrategy, RunContext};
use crate::domain::{Epic, IssueType, NewIssue, RunParameters, Task, TemplateItem};
use crate::tracker::IssueTracker;

/// Creates the epic, tasks and subtasks for `tasks`
///
/// An empty task list makes no tracker calls at all.
pub fn run(
    tasks: &[Task],
    params: &RunParameters,
    tracker: &dyn IssueTracker,
    sink: &mut dyn ProgressSink,
) -> RunReport {
    let mut strategy = strategy_for(params.mode);
    run_with(tasks, params, tracker, strategy.as_mut(), sink)
}

/// Like [`run`], with an explicit strategy
pub fn run_with(
    tasks: &[Task],
    params: &RunParameters,
    tracker: &dyn IssueTracker,
    strategy: &mut dyn OrchestrationStrategy,
    sink: &mut dyn ProgressSink,
) -> RunReport {
    if tasks.is_empty() {
        info!("nothing to do");
        sink.emit(RunEvent::NothingToDo);
        return RunReport {
            created: Vec::new(),
            epic: None,
            status: RunStatus::NothingToDo,
        };
    }

    let mut run = Run {
        sink,
        created: Vec::new(),
        epic: None,
    };

    let status = match run.execute(tasks, params, tracker, strategy) {
        Ok(epic) => {
            info!(epic = %epic, created = run.created.len(), "run finished");
            run.sink.emit(RunEvent::Finished {
                epic: epic.clone(),
                created: run.created.len(),
            });
            RunStatus::Done { epic }
        }
        Err(e) => {
            error!(step = %e.step(), error = %e, "run failed");
            run.sink.emit(RunEvent::failed(&e));
            RunStatus::Failed(e)
        }
    };

    RunReport {
        created: run.created,
        epic: run.epic,
        status,
    }
}

struct Run<'s> {
    sink: &'s mut dyn ProgressSink,
    created: Vec<CreatedRecord>,
    epic: Option<Epic>,
}

impl Run<'_> {
    fn execute(
        &mut self,
        tasks: &[Task],
        params: &RunParameters,
        tracker: &dyn IssueTracker,
        strategy: &mut dyn OrchestrationStrategy,
    ) -> Result<String, RunError> {
        let project = tracker
            .get_project(&params.project_key)
            .map_err(|source| RunError::Project {
                key: params.project_key.clone(),
                source,
            })?;

        info!(project = %project.key, mode = %strategy.mode(), "project resolved");
        self.sink.emit(RunEvent::Started {
            mode: strategy.mode(),
            project: project.key.clone(),
            tasks: tasks.len(),
        });

        let ctx = RunContext {
            tracker,
            project: &project,
            params,
        };

        strategy.prepare(&ctx, &mut *self.sink);

        let epic = strategy.resolve_epic(&ctx)?;
        self.epic_resolved(&epic, params);

        let prefix = params.prefix();
        for (index, task) in tasks.iter().enumerate() {
            let title = task.effective_title(prefix);
            let step = Step::Task {
                index,
                title: title.clone(),
            };

            let issue = NewIssue::new(IssueType::Task, &project.key, title.clone())
                .description(task.description())
                .labels(task.labels());
            let issue = strategy.task_issue(issue, &epic);

            let created = tracker
                .create_issue(&issue)
                .map_err(|source| RunError::IssueCreate {
                    step: step.clone(),
                    source,
                })?;

            info!(key = %created.key, title = %title, "created task");
            self.record(
                CreatedRecord {
                    kind: CreatedKind::Task,
                    title: title.clone(),
                    issue: created.clone(),
                    parent: None,
                },
                RunEvent::TaskCreated {
                    index,
                    title,
                    issue: created.clone(),
                },
            );

            strategy.task_created(&created, &step)?;

            for (sub_index, subtask) in task.subtasks.iter().enumerate() {
                let sub_title = subtask.effective_title(prefix);
                let issue = NewIssue::new(IssueType::SubTask, &project.key, sub_title.clone())
                    .description(subtask.description())
                    .labels(subtask.labels())
                    .parent(created.to_ref());

                let sub_created = tracker
                    .create_issue(&issue)
                    .map_err(|source| RunError::IssueCreate {
                        step: Step::SubTask {
                            task_index: index,
                            index: sub_index,
                            title: sub_title.clone(),
                        },
                        source,
                    })?;

                info!(
                    key = %sub_created.key,
                    parent = %created.key,
                    title = %sub_title,
                    "created subtask"
                );
                self.record(
                    CreatedRecord {
                        kind: CreatedKind::SubTask,
                        title: sub_title.clone(),
                        issue: sub_created.clone(),
                        parent: Some(created.key.clone()),
                    },
                    RunEvent::SubTaskCreated {
                        task_index: index,
                        index: sub_index,
                        title: sub_title,
                        parent: created.key.clone(),
                        issue: sub_created,
                    },
                );
            }
        }

        strategy.finish(&ctx, &epic, &mut *self.sink)?;

        Ok(epic.key().to_string())
    }

    fn epic_resolved(&mut self, epic: &Epic, params: &RunParameters) {
        match epic {
            Epic::Created(issue) => {
                info!(key = %issue.key, "created epic");
                self.record(
                    CreatedRecord {
                        kind: CreatedKind::Epic,
                        title: params.epic_title.clone().unwrap_or_default(),
                        issue: issue.clone(),
                        parent: None,
                    },
                    RunEvent::EpicCreated {
                        issue: issue.clone(),
                    },
                );
            }
            Epic::Fetched(issue) => {
                info!(key = %issue.key, "using existing epic");
                self.sink.emit(RunEvent::EpicFetched {
                    issue: issue.clone(),
                });
            }
            Epic::Referenced { key } => {
                info!(key = %key, "using existing epic without lookup");
                self.sink.emit(RunEvent::EpicReferenced { key: key.clone() });
            }
        }
        self.epic = Some(epic.clone());
    }

    fn record(&mut self, record: CreatedRecord, event: RunEvent) {
        self.created.push(record);
        self.sink.emit(event);
    }
}
