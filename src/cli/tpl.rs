//! The `tpl` command: create an epic with tasks from templates

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;

use super::output::Output;
use crate::config::Config;
use crate::domain::{RunParameters, Task, TemplateItem, WorkflowMode};
use crate::orchestrate::{spawn_run, RunEvent};
use crate::templates::{FsTemplateSource, Resolver};
use crate::tracker::JiraClient;

#[derive(Args, Debug)]
pub struct TplArgs {
    /// Templates to use, relative to the template directory
    #[arg(long, short = 't', value_delimiter = ',', required = true)]
    pub templates: Vec<String>,

    /// Target is a next-gen project (bulk hierarchy linking)
    #[arg(long, short = 'n')]
    pub nextgen: bool,

    /// Existing epic key to add issues to
    #[arg(long, short = 'e')]
    pub epic: Option<String>,

    /// Title for the new epic
    #[arg(long, short = 'T')]
    pub title: Option<String>,

    /// Description for the new epic
    #[arg(long = "desc", short = 'D')]
    pub description: Option<String>,

    /// Due date for the new epic (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub duedate: Option<String>,

    /// Prefix for the titles of prefixable tasks
    #[arg(long)]
    pub prefix: Option<String>,

    /// Print the resolved tasks without contacting the tracker
    #[arg(long)]
    pub dry_run: bool,
}

impl TplArgs {
    fn run_parameters(&self, project_key: String) -> RunParameters {
        RunParameters {
            project_key,
            epic_key: self.epic.clone(),
            mode: if self.nextgen {
                WorkflowMode::NextGen
            } else {
                WorkflowMode::Classic
            },
            due_date: self.duedate.clone(),
            epic_title: self.title.clone(),
            epic_description: self.description.clone(),
            prefix: self.prefix.clone(),
        }
    }
}

pub fn run(args: TplArgs, config: &Config, output: &Output) -> Result<()> {
    let resolver = Resolver::new(FsTemplateSource, config.template_dir());
    let tasks = resolver
        .resolve_all(&args.templates)
        .context("Failed to resolve templates")?;

    if args.dry_run {
        print_preview(output, &tasks, args.prefix.as_deref());
        return Ok(());
    }

    if tasks.is_empty() {
        output.event(&RunEvent::NothingToDo);
        return Ok(());
    }

    let project_key = config.project_key(None)?;
    let client = JiraClient::new(config.jira()?)?;
    let params = args.run_parameters(project_key);

    let handle = spawn_run(tasks, params, Arc::new(client)).context("Failed to start run")?;
    for event in handle.events() {
        output.event(&event);
    }

    let report = handle.join().map_err(|_| anyhow!("Run thread panicked"))?;
    if let Some(e) = report.error() {
        anyhow::bail!(
            "Run stopped at {} after creating {} issue(s); created issues were left in place",
            e.step(),
            report.created.len()
        );
    }

    Ok(())
}

/// Task preview with prefixes applied
#[derive(Debug, Serialize)]
pub struct PreviewItem {
    pub title: String,
    pub labels: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<PreviewItem>,
}

pub fn preview(tasks: &[Task], prefix: Option<&str>) -> Vec<PreviewItem> {
    tasks
        .iter()
        .map(|task| PreviewItem {
            title: task.effective_title(prefix),
            labels: task.labels.clone(),
            subtasks: task
                .subtasks
                .iter()
                .map(|sub| PreviewItem {
                    title: sub.effective_title(prefix),
                    labels: sub.labels.clone(),
                    subtasks: Vec::new(),
                })
                .collect(),
        })
        .collect()
}

pub fn print_preview(output: &Output, tasks: &[Task], prefix: Option<&str>) {
    let items = preview(tasks, prefix);

    if output.is_json() {
        output.data(&items);
        return;
    }

    if items.is_empty() {
        println!("Nothing to do");
        return;
    }

    for item in &items {
        println!("{}", with_labels(item));
        for sub in &item.subtasks {
            println!("  - {}", with_labels(sub));
        }
    }
}

fn with_labels(item: &PreviewItem) -> String {
    if item.labels.is_empty() {
        item.title.clone()
    } else {
        format!("{} [{}]", item.title, item.labels.join(", "))
    }
}
