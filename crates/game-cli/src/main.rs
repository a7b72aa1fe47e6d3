mod config;
mod play;
mod selfplay;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use config::Config;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "4x4 sliding-tile merge game: interactive play and headless self-play"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base RNG seed (overrides the config file; entropy when absent)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively on stdin/stdout
    Play,
    /// Run seeded headless games with a random-move policy
    Selfplay {
        /// Number of games (overrides the config file)
        #[arg(long, value_name = "N")]
        games: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_toml(path)
            .map_err(|err| anyhow::anyhow!("failed to load config {}: {err}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.seed = Some(seed);
    }

    // Pay the lookup-table cost up front rather than on the first move.
    grid_engine::engine::init();

    match cli.command {
        Command::Play => play::run(&cfg),
        Command::Selfplay { games } => {
            if let Some(games) = games {
                cfg.selfplay.games = games;
            }
            let summaries = selfplay::run(&cfg)?;
            info!("completed {} game(s)", summaries.len());
            Ok(())
        }
    }
}
