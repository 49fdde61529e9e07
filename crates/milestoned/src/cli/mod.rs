//! Command-line interface for milestoned.
//!
//! This module provides the CLI structure and command handlers for the
//! `milestoned` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, MilestonesCommand, ServeCommand, UploadsCommand};

/// milestoned - Milestone timeline backend
///
/// A small HTTP service that stores milestone records and their attached
/// images, plus offline tooling for the stored data.
#[derive(Debug, Parser)]
#[command(name = "milestoned")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Inspect stored milestones
    #[command(subcommand)]
    Milestones(MilestonesCommand),

    /// Manage stored uploads
    #[command(subcommand)]
    Uploads(UploadsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "milestoned");
    }

    #[test]
    fn test_verbosity_quiet_wins() {
        let cli = Cli::try_parse_from(["milestoned", "--quiet", "-vv", "serve"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let cli = Cli::try_parse_from(["milestoned", "serve"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let cli = Cli::try_parse_from(["milestoned", "-v", "serve"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        let cli = Cli::try_parse_from(["milestoned", "-vvv", "serve"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_serve_flags_parse() {
        let cli =
            Cli::try_parse_from(["milestoned", "serve", "--port", "8080", "--bind", "127.0.0.1"])
                .unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.port, Some(8080));
                assert_eq!(cmd.bind.as_deref(), Some("127.0.0.1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_milestones_list_parses() {
        let cli =
            Cli::try_parse_from(["milestoned", "milestones", "list", "--json", "--limit", "5"])
                .unwrap();
        match cli.command {
            Command::Milestones(MilestonesCommand::List { json, limit }) => {
                assert!(json);
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_uploads_prune_parses() {
        let cli = Cli::try_parse_from(["milestoned", "uploads", "prune", "--dry-run"]).unwrap();
        match cli.command {
            Command::Uploads(UploadsCommand::Prune { dry_run }) => assert!(dry_run),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_show_parses() {
        let cli = Cli::try_parse_from(["milestoned", "config", "show", "--json"]).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Show { json }) => assert!(json),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
