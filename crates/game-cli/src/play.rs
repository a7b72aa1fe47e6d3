use std::io::{self, BufRead};

use anyhow::Result;
use grid_engine::{Direction, GridEngine, MoveError};

use crate::config::Config;

enum PlayCommand {
    Move(Direction),
    NewGame,
    Quit,
}

fn parse_command(input: &str) -> Option<PlayCommand> {
    match input.to_ascii_lowercase().as_str() {
        "w" | "up" => Some(PlayCommand::Move(Direction::Up)),
        "s" | "down" => Some(PlayCommand::Move(Direction::Down)),
        "a" | "left" => Some(PlayCommand::Move(Direction::Left)),
        "d" | "right" => Some(PlayCommand::Move(Direction::Right)),
        "n" | "new" => Some(PlayCommand::NewGame),
        "q" | "quit" | "exit" => Some(PlayCommand::Quit),
        _ => None,
    }
}

fn render<R: rand::Rng>(engine: &GridEngine<R>) {
    println!("{}", engine.board());
    println!("score: {}", engine.score());
}

/// Interactive stdin/stdout loop. All grid logic lives in the engine; this
/// only translates lines into directions and renders snapshots.
pub fn run(cfg: &Config) -> Result<()> {
    let mut engine = match cfg.seed {
        Some(seed) => GridEngine::seeded(seed),
        None => GridEngine::from_entropy(),
    };

    println!("w/a/s/d or up/left/down/right to move, n for a new game, q to quit");
    render(&engine);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_command(line.trim()) {
            Some(PlayCommand::Quit) => break,
            Some(PlayCommand::NewGame) => {
                engine.new_game();
                println!("new game");
                render(&engine);
            }
            Some(PlayCommand::Move(direction)) => match engine.apply_move(direction) {
                Ok(result) if result.changed => {
                    render(&engine);
                    if result.score_delta > 0 {
                        println!("+{} points", result.score_delta);
                    }
                    if result.terminal {
                        println!("game over! final score: {}", engine.score());
                        println!("n for a new game, q to quit");
                    }
                }
                Ok(_) => println!("nothing moved"),
                Err(MoveError::GameOver) => {
                    println!("the game is over; n for a new game, q to quit");
                }
            },
            None => println!("commands: w/a/s/d to move, n for a new game, q to quit"),
        }
    }
    Ok(())
}
