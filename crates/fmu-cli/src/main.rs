//! fmu CLI
//!
//! Command-line access to `.fmu` project settings directories.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{}: tracing subscriber already set", "warning".yellow());
        }
        tracing::debug!("verbose mode enabled");
    }

    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(cmd) => execute_command(cmd, &path),
        None => {
            println!("{} .fmu settings CLI", "fmu".green().bold());
            println!();
            println!("Run {} for available commands.", "fmu --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, path: &std::path::Path) -> Result<()> {
    match cmd {
        Commands::Init { user } => commands::run_init(path, user),
        Commands::Diff { incoming, json } => commands::run_diff(path, &incoming, json),
        Commands::Sync { incoming, json } => commands::run_sync(path, &incoming, json),
        Commands::Log {
            field,
            op,
            value,
            filter_type,
            json,
        } => {
            let filter = match (field, value) {
                (Some(field), Some(value)) => Some(commands::LogFilter {
                    field,
                    op,
                    value,
                    filter_type,
                }),
                (None, None) => None,
                _ => {
                    return Err(CliError::user(
                        "--field and --value must be given together",
                    ));
                }
            };
            commands::run_log(path, filter, json)
        }
        Commands::Config { user, action } => commands::run_config(path, action, user),
        Commands::Lock { action } => commands::run_lock(path, action),
    }
}
