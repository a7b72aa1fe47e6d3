//! Core state machine for a 4x4 sliding-tile merge game.
//!
//! The crate has two layers:
//!
//! - [`engine`]: the packed board representation and the raw operations on
//!   it (slide/merge shifts, merge scoring, spawning, terminal detection).
//! - [`session`]: the [`GridEngine`] game session that owns a board, a
//!   running score, and an injected random source, and exposes the
//!   command/query interface front ends drive.
//!
//! ```
//! use grid_engine::{Direction, GridEngine};
//!
//! let mut engine = GridEngine::seeded(7);
//! let spawned = engine
//!     .snapshot()
//!     .iter()
//!     .flatten()
//!     .filter(|&&v| v != 0)
//!     .count();
//! assert_eq!(spawned, 2);
//!
//! let result = engine.apply_move(Direction::Left).unwrap();
//! assert_eq!(result.terminal, engine.is_over());
//! ```

pub mod engine;
pub mod session;

pub use engine::{Board, Direction, Grid};
pub use session::{GridEngine, MoveError, MoveResult};
