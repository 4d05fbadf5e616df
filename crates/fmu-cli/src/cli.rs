//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage .fmu project settings directories
#[derive(Parser, Debug)]
#[command(name = "fmu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory to operate on (defaults to the current directory)
    #[arg(short = 'C', long, global = true, env = "FMU_PROJECT_DIR")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a .fmu directory with a default config
    Init {
        /// Create the per-user directory in $HOME instead
        #[arg(long)]
        user: bool,
    },

    /// Show what syncing another .fmu directory into this one would change
    ///
    /// Examples:
    ///   fmu diff ../shared-project        # Human-readable summary
    ///   fmu diff ../shared-project --json # Full change lists
    Diff {
        /// Project directory (or its .fmu) to read changes from
        incoming: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Merge another .fmu directory into this one
    Sync {
        /// Project directory (or its .fmu) to read changes from
        incoming: PathBuf,

        /// Output the merged resources as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the changelog, optionally filtered on one field
    ///
    /// Examples:
    ///   fmu log --field key --value masterdata
    ///   fmu log --field timestamp --op '>=' --value 2025-01-01T00:00:00Z --type datetime
    Log {
        /// Entry field to filter on
        #[arg(long, requires = "value")]
        field: Option<String>,

        /// Comparison operator: ==, !=, <=, >=
        #[arg(long, default_value = "==")]
        op: String,

        /// Value to compare against
        #[arg(long, requires = "field")]
        value: Option<String>,

        /// How values are compared: str, number, datetime
        #[arg(long = "type", default_value = "str")]
        filter_type: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Read or change config values
    Config {
        /// Use the per-user config in $HOME/.fmu
        #[arg(long)]
        user: bool,

        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Inspect or take the directory write lock
    Lock {
        #[command(subcommand)]
        action: LockAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the value at a dotted key
    Get { key: String },

    /// Set the value at a dotted key and log the change
    ///
    /// VALUE is parsed as JSON; anything that is not valid JSON is stored
    /// as a string.
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// Show who holds the lock
    Status,
    /// Take the lock for this process
    Acquire,
    /// Release a lock held by this process
    Release,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_filter() {
        let cli = Cli::parse_from([
            "fmu", "log", "--field", "key", "--op", "!=", "--value", "config",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Log {
                field: Some("key".into()),
                op: "!=".into(),
                value: Some("config".into()),
                filter_type: "str".into(),
                json: false,
            })
        );
    }

    #[test]
    fn field_without_value_is_rejected() {
        assert!(Cli::try_parse_from(["fmu", "log", "--field", "key"]).is_err());
    }

    #[test]
    fn value_without_field_is_rejected() {
        assert!(Cli::try_parse_from(["fmu", "log", "--value", "config"]).is_err());
    }

    #[test]
    fn user_flag_on_config() {
        let cli = Cli::parse_from(["fmu", "config", "--user", "get", "version"]);
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                user: true,
                action: ConfigAction::Get {
                    key: "version".into()
                },
            })
        );
    }

    #[test]
    fn global_path_after_subcommand() {
        let cli = Cli::parse_from(["fmu", "lock", "status", "-C", "/tmp/project"]);
        assert_eq!(cli.path, Some(PathBuf::from("/tmp/project")));
        assert_eq!(
            cli.command,
            Some(Commands::Lock {
                action: LockAction::Status
            })
        );
    }
}
