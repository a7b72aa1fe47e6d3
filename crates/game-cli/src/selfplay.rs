use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use grid_engine::GridEngine;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;

// Keeps the policy stream distinct from the engine's spawn stream for the
// same seed (splitmix64 increment).
const POLICY_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Summary for one completed (or capped) game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: u32,
    pub seed: u64,
    pub steps: u64,
    pub score: u64,
    pub highest_tile: u32,
}

/// Play `games` seeded games with a uniformly random legal-move policy,
/// log a summary per game, and write the optional JSON report.
pub fn run(cfg: &Config) -> Result<Vec<GameSummary>> {
    let base_seed = cfg.seed.unwrap_or_else(|| rand::random());
    info!(
        "self-play: {} game(s), base seed {}",
        cfg.selfplay.games, base_seed
    );

    let mut summaries = Vec::with_capacity(cfg.selfplay.games as usize);
    for game_id in 0..cfg.selfplay.games {
        let seed = base_seed.wrapping_add(game_id as u64);
        let summary = play_one(game_id, seed, cfg.selfplay.max_steps);
        info!(
            "game {}: steps={} score={} highest_tile={}",
            game_id, summary.steps, summary.score, summary.highest_tile
        );
        summaries.push(summary);
    }

    if let Some(path) = &cfg.report.results_file {
        write_report(path, &summaries)?;
        info!("wrote report to {}", path.display());
    }
    Ok(summaries)
}

/// Drive a single game to its terminal state (or the step cap).
pub fn play_one(game_id: u32, seed: u64, max_steps: Option<u64>) -> GameSummary {
    let mut engine = GridEngine::seeded(seed);
    let mut policy = StdRng::seed_from_u64(seed ^ POLICY_STREAM);
    let mut steps: u64 = 0;

    while !engine.is_over() {
        if max_steps.is_some_and(|cap| steps >= cap) {
            debug!("game {game_id}: step cap {steps} reached");
            break;
        }
        let legal = engine.board().legal_moves();
        let Some(&direction) = legal.choose(&mut policy) else {
            break;
        };
        match engine.apply_move(direction) {
            Ok(result) => {
                debug_assert!(result.changed, "legal move must change the board");
                steps += 1;
                debug!(
                    "game {game_id} step {steps}: {direction:?} +{}",
                    result.score_delta
                );
            }
            Err(_) => break,
        }
    }

    GameSummary {
        game_id,
        seed,
        steps,
        score: engine.score(),
        highest_tile: engine.board().highest_tile(),
    }
}

fn write_report(path: &Path, summaries: &[GameSummary]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summaries)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
