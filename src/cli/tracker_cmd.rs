//! Direct tracker commands: projects, epics, issue search and creation

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::config::Config;
use crate::domain::{IssueType, NewIssue};
use crate::tracker::{IssueSummary, IssueTracker, JiraClient};

/// Maximum search results requested at once
const SEARCH_LIMIT: u32 = 1000;

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Search issues with JQL
    Search {
        /// JQL query
        #[arg(long, short = 'j')]
        jql: String,
    },

    /// Create a single issue
    Add {
        /// Summary of the issue
        #[arg(long, short = 's')]
        summary: String,

        /// Description of the issue
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Labels (repeatable or comma separated)
        #[arg(long, short = 'l', value_delimiter = ',')]
        label: Vec<String>,

        /// Issue type, e.g. task, bug, epic
        #[arg(long = "type", short = 't', default_value = "task")]
        issue_type: String,
    },
}

fn client(config: &Config) -> Result<JiraClient> {
    Ok(JiraClient::new(config.jira()?)?)
}

pub fn projects(config: &Config, output: &Output) -> Result<()> {
    let projects = client(config)?.list_projects()?;

    if output.is_json() {
        output.data(&projects);
    } else if projects.is_empty() {
        println!("No projects found.");
    } else {
        println!("{:<12} NAME", "KEY");
        println!("{}", "-".repeat(50));
        for project in &projects {
            println!("{:<12} {}", project.key, project.name);
        }
    }

    Ok(())
}

pub fn epics(config: &Config, output: &Output) -> Result<()> {
    let project = config.project_key(None)?;
    let epics = client(config)?.list_epics(&project)?;

    if output.is_json() {
        output.data(&epics);
    } else if epics.is_empty() {
        println!("No epics found in {}.", project);
    } else {
        print_issues(&epics);
    }

    Ok(())
}

pub fn issues(cmd: IssueCommands, config: &Config, output: &Output) -> Result<()> {
    match cmd {
        IssueCommands::Search { jql } => {
            let issues = client(config)?.search_issues(&jql, SEARCH_LIMIT)?;
            if output.is_json() {
                output.data(&issues);
            } else if issues.is_empty() {
                println!("No issues found.");
            } else {
                print_issues(&issues);
            }
        }

        IssueCommands::Add {
            summary,
            description,
            label,
            issue_type,
        } => {
            let client = client(config)?;
            let project = client.get_project(&config.project_key(None)?)?;

            let issue = NewIssue::new(IssueType::from_name(&issue_type), &project.key, summary)
                .description(description)
                .labels(&label);
            let created = client.create_issue(&issue)?;

            if output.is_json() {
                output.data(&created);
            } else {
                output.success(&format!("Created {} {}", created.id, created.key));
            }
        }
    }

    Ok(())
}

fn print_issues(issues: &[IssueSummary]) {
    println!("{:<12} {:<14} SUMMARY", "KEY", "STATUS");
    println!("{}", "-".repeat(70));
    for issue in issues {
        println!(
            "{:<12} {:<14} {}",
            issue.key,
            issue.status.as_deref().unwrap_or("-"),
            issue.summary
        );
    }
}
