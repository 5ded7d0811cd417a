//! Config commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (password masked)
    Show,

    /// Print the default config file location
    Path,
}

pub fn run(cmd: ConfigCommands, config: &Config, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let masked = config.masked();
            if output.is_json() {
                output.data(&masked);
            } else {
                let text = toml::to_string_pretty(&masked).context("Failed to serialize config")?;
                print!("{}", text);
            }
        }

        ConfigCommands::Path => {
            let path = Config::default_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
            if output.is_json() {
                output.data(&serde_json::json!({ "path": path.display().to_string() }));
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
