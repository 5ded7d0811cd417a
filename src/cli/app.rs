//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{config_cmd, logging, templates_cmd, tpl, tracker_cmd};
use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "jitzu")]
#[command(author, version, about = "Create linked Jira epics, tasks and subtasks from templates")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (default: platform config dir, jitzu/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the Jira instance
    #[arg(long, short = 'b', global = true, env = "JITZU_BASE_URL")]
    pub base_url: Option<String>,

    /// Project key
    #[arg(long, short = 'p', global = true, env = "JITZU_PROJECT")]
    pub project: Option<String>,

    /// Template directory
    #[arg(long, short = 'g', global = true, env = "JITZU_TEMPLATE_PATH")]
    pub template_path: Option<String>,

    /// Username to authenticate with
    #[arg(long, short = 'U', global = true, env = "JITZU_USERNAME")]
    pub username: Option<String>,

    /// Password or API token
    #[arg(long, short = 'P', global = true, env = "JITZU_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            project: self.project.clone(),
            template_path: self.template_path.clone(),
            insecure_tls: self.insecure,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an epic with tasks and subtasks from templates
    Tpl(tpl::TplArgs),

    /// List projects
    Projects,

    /// List epics of the project
    Epics,

    /// Search or create issues
    #[command(subcommand)]
    Issues(tracker_cmd::IssueCommands),

    /// Inspect templates
    #[command(subcommand)]
    Templates(templates_cmd::TemplateCommands),

    /// Inspect configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let output = Output::new(cli.format);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(&cli.overrides());
    tracing::debug!(template_dir = %config.template_dir().display(), "configuration ready");

    match cli.command {
        Commands::Tpl(args) => tpl::run(args, &config, &output),
        Commands::Projects => tracker_cmd::projects(&config, &output),
        Commands::Epics => tracker_cmd::epics(&config, &output),
        Commands::Issues(cmd) => tracker_cmd::issues(cmd, &config, &output),
        Commands::Templates(cmd) => templates_cmd::run(cmd, &config, &output),
        Commands::Config(cmd) => config_cmd::run(cmd, &config, &output),
    }
}
