//! Output formatting for CLI commands

use serde::Serialize;

use crate::orchestrate::RunEvent;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers normally render text themselves; this is the fallback
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints a table row (text only, ignored in JSON mode)
    pub fn row(&self, columns: &[&str]) {
        if self.format == OutputFormat::Text {
            println!("{}", columns.join("\t"));
        }
    }

    /// Prints one run progress event
    pub fn event(&self, event: &RunEvent) {
        if self.is_json() {
            self.data(event);
            return;
        }

        match event {
            RunEvent::Started { mode, project, tasks } => {
                println!("Using {} workflow for {} ({} task(s))", mode, project, tasks)
            }
            RunEvent::EpicCreated { issue } => println!("Created epic {}", issue.key),
            RunEvent::EpicFetched { issue } => println!("Using epic {}", issue.key),
            RunEvent::EpicReferenced { key } => println!("Using epic {}", key),
            RunEvent::TaskCreated { title, issue, .. } => {
                println!("Created ({}) {}", issue.key, title)
            }
            RunEvent::SubTaskCreated { title, issue, parent, .. } => {
                println!("  Created ({}) {} [under {}]", issue.key, title, parent)
            }
            RunEvent::Linked { epic, count } => println!("Linked {} issue(s) to {}", count, epic),
            RunEvent::Warning { message } => eprintln!("Warning: {}", message),
            RunEvent::NothingToDo => println!("Nothing to do"),
            RunEvent::Finished { epic, .. } => println!("Done {}", epic),
            RunEvent::Failed { step, error, detail } => {
                eprintln!("Failed at {}: {}", step, error);
                if let Some(detail) = detail {
                    eprintln!("{}", detail);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
