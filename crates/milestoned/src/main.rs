//! `milestoned` - CLI for the milestone backend
//!
//! This binary runs the HTTP server and provides offline tooling for the
//! stored milestone collection and its uploads.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::HashSet;

use clap::Parser;

use milestoned::cli::{Cli, Command, ConfigCommand, MilestonesCommand, UploadsCommand};
use milestoned::{http, init_logging, Config, FileStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => {
            if let Some(port) = cmd.port {
                config.server.port = port;
            }
            if let Some(bind) = cmd.bind {
                config.server.bind = bind;
            }
            // Flag overrides bypass load-time validation, so re-check
            config.validate()?;
            http::serve(&config).await?;
            Ok(())
        }
        Command::Milestones(cmd) => handle_milestones(&config, &cmd),
        Command::Uploads(cmd) => handle_uploads(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_milestones(config: &Config, cmd: &MilestonesCommand) -> anyhow::Result<()> {
    match cmd {
        MilestonesCommand::List { json, limit } => {
            let store = RecordStore::open(config.db_path())?;
            let mut milestones = store.load();
            if let Some(limit) = limit {
                milestones.truncate(*limit);
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&milestones)?);
            } else if milestones.is_empty() {
                println!("No milestones stored.");
            } else {
                for m in &milestones {
                    println!(
                        "{}  {}  (owner {}, {} image{})",
                        m.id,
                        m.title,
                        m.owner,
                        m.images.len(),
                        if m.images.len() == 1 { "" } else { "s" }
                    );
                }
            }
            Ok(())
        }
    }
}

fn handle_uploads(config: &Config, cmd: &UploadsCommand) -> anyhow::Result<()> {
    match cmd {
        UploadsCommand::Prune { dry_run } => {
            let records = RecordStore::open(config.db_path())?;
            let files = FileStore::open(config.upload_dir())?;

            // Image URLs end in the stored file name
            let referenced: HashSet<String> = records
                .load()
                .iter()
                .flat_map(|m| m.images.iter())
                .filter_map(|url| url.rsplit('/').next())
                .map(ToString::to_string)
                .collect();

            let mut pruned = 0usize;
            for name in files.stored_names()? {
                if referenced.contains(&name) {
                    continue;
                }
                if *dry_run {
                    println!("would delete {name}");
                } else {
                    files.remove(&name)?;
                    println!("deleted {name}");
                }
                pruned += 1;
            }

            if pruned == 0 {
                println!("Nothing to prune.");
            } else if *dry_run {
                println!("{pruned} unreferenced upload(s), none deleted (dry run).");
            } else {
                println!("Pruned {pruned} unreferenced upload(s).");
            }
            Ok(())
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Port:             {}", config.server.port);
                println!("  Bind address:     {}", config.server.bind);
                println!();
                println!("[Storage]");
                println!("  Data dir:         {}", config.data_dir().display());
                println!("  Milestone file:   {}", config.db_path().display());
                println!("  Upload dir:       {}", config.upload_dir().display());
                println!();
                println!("[Upload]");
                println!("  Max body bytes:   {}", config.upload.max_body_bytes);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
            Ok(())
        }
    }
}
