//! CLI frontend for the adventure engine.

mod commands;
mod demo;

use std::path::PathBuf;
use std::process;

use adv_core::GameConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "adv",
    about = "A room-based text adventure",
    version,
    propagate_version = true
)]
struct Cli {
    /// JSON file with game settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Inventory slots for the player (overrides the config file)
    #[arg(long, global = true)]
    max_items: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the demo world, reading commands from stdin
    Play {
        /// Print only game text: no banner, no prompt, no colors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the player's surroundings as JSON
    Snapshot {
        /// Commands to run before taking the snapshot
        #[arg(short = 'x', long)]
        exec: Vec<String>,
    },

    /// List registered entities
    List {
        /// Filter by kind (e.g. room, door, item, character, weapon)
        kind: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config, cli.seed, cli.max_items).and_then(|config| {
        match cli.command {
            Commands::Play { quiet } => commands::play::run(config, quiet),
            Commands::Snapshot { exec } => commands::snapshot::run(config, &exec),
            Commands::List { kind } => commands::list::run(config, kind.as_deref()),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Read the config file if one was given, then apply flag overrides.
fn load_config(
    path: Option<PathBuf>,
    seed: Option<u64>,
    max_items: Option<usize>,
) -> Result<GameConfig, String> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<GameConfig>(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(max_items) = max_items {
        config = config.with_max_items(max_items);
    }
    tracing::debug!(?config, "loaded config");
    Ok(config)
}
