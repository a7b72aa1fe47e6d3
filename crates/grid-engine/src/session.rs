//! Game session layer: an owned `{board, score, terminal}` value mutated
//! exclusively through `apply_move`, with the random source injected at
//! construction so spawns are reproducible under test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::engine::state::{Board, Direction, Grid};
use crate::engine::{is_terminal, move_score};

/// Commands that are invalid in the session's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The session is terminal; `new_game` is the only way forward.
    #[error("no moves remain: the game is over")]
    GameOver,
}

/// Outcome of one `apply_move` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MoveResult {
    /// Whether any tile moved or merged.
    pub changed: bool,
    /// Sum of the values of the tiles produced by merges in this move.
    pub score_delta: u64,
    /// Whether the move left the session with no legal move remaining.
    pub terminal: bool,
    /// Snapshot of the grid after the move (and spawn, if any).
    pub grid: Grid,
}

#[derive(Debug, Clone, Copy, Default)]
struct GameSession {
    board: Board,
    score: u64,
    over: bool,
}

/// The grid state machine: owns the board, the running score, the terminal
/// flag, and the injected random source used for tile spawns.
///
/// Terminal is absorbing: once a move leaves the board with no legal move,
/// further `apply_move` calls return [`MoveError::GameOver`] until
/// `new_game` resets the session.
///
/// ```
/// use grid_engine::{Direction, GridEngine};
///
/// let mut engine = GridEngine::seeded(42);
/// assert_eq!(engine.score(), 0);
/// assert!(!engine.is_over());
///
/// let result = engine.apply_move(Direction::Down).unwrap();
/// if result.changed {
///     assert_eq!(result.grid, engine.snapshot());
/// }
/// ```
pub struct GridEngine<R: Rng> {
    rng: R,
    session: GameSession,
}

impl GridEngine<StdRng> {
    /// Engine with a deterministic spawn sequence derived from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Engine seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> GridEngine<R> {
    /// Create an engine with the given random source and start a game:
    /// zeroed grid, two spawned tiles, score 0.
    pub fn new(mut rng: R) -> Self {
        let board = Board::EMPTY
            .with_random_tile(&mut rng)
            .with_random_tile(&mut rng);
        Self {
            rng,
            session: GameSession {
                board,
                score: 0,
                over: false,
            },
        }
    }

    /// Resume from a known position with score 0. The terminal flag is
    /// derived from the board. Escape hatch for tests and AI harnesses.
    pub fn with_board(rng: R, board: Board) -> Self {
        let over = is_terminal(board);
        Self {
            rng,
            session: GameSession {
                board,
                score: 0,
                over,
            },
        }
    }

    /// Discard the current session and start over: zeroed grid, two
    /// independent spawns, score 0, Active state. Returns the initial
    /// snapshot.
    pub fn new_game(&mut self) -> Grid {
        let board = Board::EMPTY
            .with_random_tile(&mut self.rng)
            .with_random_tile(&mut self.rng);
        self.session = GameSession {
            board,
            score: 0,
            over: false,
        };
        board.to_grid()
    }

    /// Slide/merge in `direction`; on any change, spawn one random tile
    /// and re-evaluate terminal state.
    ///
    /// A move that changes nothing is a valid outcome (`changed: false`,
    /// no spawn, no score), not an error. A move on a terminal session is
    /// rejected with [`MoveError::GameOver`].
    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveResult, MoveError> {
        if self.session.over {
            return Err(MoveError::GameOver);
        }
        let before = self.session.board;
        let shifted = before.shift(direction);
        if shifted == before {
            return Ok(MoveResult {
                changed: false,
                score_delta: 0,
                terminal: false,
                grid: before.to_grid(),
            });
        }
        let score_delta = move_score(before, direction);
        let board = shifted.with_random_tile(&mut self.rng);
        self.session.board = board;
        self.session.score += score_delta;
        self.session.over = is_terminal(board);
        Ok(MoveResult {
            changed: true,
            score_delta,
            terminal: self.session.over,
            grid: board.to_grid(),
        })
    }

    /// Whether no legal move remains. Cached on the session and refreshed
    /// after every grid-changing move.
    pub fn is_over(&self) -> bool {
        self.session.over
    }

    /// Running score: the sum of every merged tile's value this game.
    pub fn score(&self) -> u64 {
        self.session.score
    }

    /// Read-only 4x4 view of the current grid, for rendering.
    pub fn snapshot(&self) -> Grid {
        self.session.board.to_grid()
    }

    /// The packed board, for advanced callers.
    pub fn board(&self) -> Board {
        self.session.board
    }
}
