// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use tracing::instrument;

pub mod args;
pub mod bookmark_commands;
pub mod completion;
pub mod display;
pub mod error;

/// Runs the parsed command. Commands that need the database get services
/// built from `settings`; `create-db` and `completion` do not.
#[instrument(skip_all, level = "debug")]
pub fn execute_command(cli: Cli, settings: &Settings) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }
    match cli.command {
        None => Ok(()),
        Some(Commands::CreateDb { .. }) => bookmark_commands::create_db(cli),
        Some(Commands::Completion { ref shell }) => handle_completion(shell),
        Some(_) => {
            let services = ServiceContainer::new(settings)?;
            execute_command_with_services(cli, &services)
        }
    }
}

pub fn execute_command_with_services(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    match cli.command {
        Some(Commands::Add { .. }) => bookmark_commands::add(cli, services),
        Some(Commands::List { .. }) => bookmark_commands::list(cli, services),
        Some(Commands::Edit { .. }) => bookmark_commands::edit(cli, services),
        Some(Commands::Delete { .. }) => bookmark_commands::delete(cli, services),
        Some(Commands::Open { .. }) => bookmark_commands::open(cli, services),
        Some(Commands::Watch { .. }) => bookmark_commands::watch(cli, services),
        Some(Commands::CreateDb { .. }) => bookmark_commands::create_db(cli),
        Some(Commands::Completion { ref shell }) => handle_completion(shell),
        None => Ok(()),
    }
}

fn handle_completion(shell: &str) -> CliResult<()> {
    // Write a brief comment to stderr about what's being output
    match shell.to_lowercase().as_str() {
        "bash" => {
            eprintln!("# Outputting bash completion script for linkstash");
            eprintln!("# To use, run one of:");
            eprintln!("# - eval \"$(linkstash completion bash)\"              # one-time use");
            eprintln!("# - linkstash completion bash >> ~/.bashrc             # add to bashrc");
            eprintln!("#");
        }
        "zsh" => {
            eprintln!("# Outputting zsh completion script for linkstash");
            eprintln!("# To use, run one of:");
            eprintln!("# - eval \"$(linkstash completion zsh)\"               # one-time use");
            eprintln!("# - linkstash completion zsh > ~/.zfunc/_linkstash     # save to fpath directory");
            eprintln!("#");
        }
        "fish" => {
            eprintln!("# Outputting fish completion script for linkstash");
            eprintln!("# - linkstash completion fish | source                 # one-time use");
            eprintln!("#");
        }
        _ => {}
    }

    completion::generate_completion(shell).map_err(|e| {
        CliError::CommandFailed(format!("Failed to generate completion script: {}", e))
    })
}
