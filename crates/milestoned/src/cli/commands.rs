//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Port to listen on (overrides config file and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config file)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Milestone inspection commands.
#[derive(Debug, Subcommand)]
pub enum MilestonesCommand {
    /// List stored milestones
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Upload maintenance commands.
#[derive(Debug, Subcommand)]
pub enum UploadsCommand {
    /// Delete upload files that no stored milestone references
    Prune {
        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
