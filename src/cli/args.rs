//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Watch projects and run their sync command, one invocation at a time
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: syncwatch.toml)
    #[arg(short = 'C', long, global = true, default_value = "syncwatch.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch all configured projects and sync on change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        command_args: CommandArgs,
    },

    /// Run the sync command once for a single project
    #[command(visible_alias = "s")]
    Sync {
        /// Project identifier (`-i` of the sync command)
        #[arg(short, long)]
        id: String,

        /// Project root (`-p` of the sync command)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        path: String,

        /// Watermark in ms since the epoch (`-t` of the sync command)
        #[arg(short, long, default_value_t = 0)]
        timestamp: i64,

        #[command(flatten)]
        command_args: CommandArgs,
    },

    /// Load and validate the config file, then list projects
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        command_args: CommandArgs,
    },
}

/// Sync command overrides shared by all subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommandArgs {
    /// Path to the sync command (overrides `[sync] command`)
    #[arg(long = "command", value_hint = clap::ValueHint::ExecutablePath)]
    pub command: Option<String>,

    /// Mock command jar for automated tests (overrides `[sync] mock_command`)
    #[arg(long = "mock-command", env = "SYNCWATCH_MOCK_COMMAND", value_hint = clap::ValueHint::FilePath)]
    pub mock_command: Option<String>,

    /// Program that runs the mock command (overrides `[sync] loader`)
    #[arg(long)]
    pub loader: Option<String>,
}

impl Cli {
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync { .. })
    }

    pub fn command_args(&self) -> &CommandArgs {
        match &self.command {
            Commands::Watch { command_args }
            | Commands::Sync { command_args, .. }
            | Commands::Check { command_args } => command_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "syncwatch", "sync", "--id", "abc", "--path", "/work/app", "-t", "1000", "--command",
            "/opt/cwctl",
        ])
        .unwrap();
        assert!(cli.is_sync());
        match &cli.command {
            Commands::Sync {
                id,
                path,
                timestamp,
                command_args,
            } => {
                assert_eq!(id, "abc");
                assert_eq!(path, "/work/app");
                assert_eq!(*timestamp, 1000);
                assert_eq!(command_args.command.as_deref(), Some("/opt/cwctl"));
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_parse_watch_global_flags() {
        let cli = Cli::try_parse_from(["syncwatch", "watch", "-v", "-C", "other.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(!cli.is_sync());

        let cli = Cli::try_parse_from(["syncwatch", "check", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_is_not_shadowed() {
        let err = Cli::try_parse_from(["syncwatch", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
