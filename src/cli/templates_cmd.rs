//! Template commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::tpl::print_preview;
use crate::config::Config;
use crate::templates::{list_templates, FsTemplateSource, Resolver};

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List templates in the template directory
    List,

    /// Show the flattened task list of a template
    Show {
        /// Template name, relative to the template directory
        name: String,

        /// Prefix to apply to prefixable titles
        #[arg(long)]
        prefix: Option<String>,
    },
}

pub fn run(cmd: TemplateCommands, config: &Config, output: &Output) -> Result<()> {
    let dir = config.template_dir();

    match cmd {
        TemplateCommands::List => {
            let templates = list_templates(&dir)?;

            if output.is_json() {
                output.data(&templates);
            } else if templates.is_empty() {
                println!("No templates found in {}", dir.display());
            } else {
                for template in &templates {
                    output.row(&[template.name.as_str()]);
                }
            }
        }

        TemplateCommands::Show { name, prefix } => {
            let resolver = Resolver::new(FsTemplateSource, &dir);
            let resolution = resolver
                .resolve(&name)
                .with_context(|| format!("Failed to resolve template '{}'", name))?;

            if !output.is_json() && resolution.visited.len() > 1 {
                let included: Vec<_> = resolution.visited[1..]
                    .iter()
                    .map(|p| p.strip_prefix(&dir).unwrap_or(p).display().to_string())
                    .collect();
                println!("# includes: {}", included.join(", "));
            }

            print_preview(output, &resolution.tasks, prefix.as_deref());
        }
    }

    Ok(())
}
