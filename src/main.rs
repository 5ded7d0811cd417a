//! jitzu - Create linked Jira issue hierarchies from templates

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = jitzu::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
