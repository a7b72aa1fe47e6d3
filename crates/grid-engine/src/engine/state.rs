use rand::Rng;
use std::fmt;

use super::ops;
use serde::{Deserialize, Serialize};

// Internal type aliases for the packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Tile = u64;

/// Read-only 4x4 snapshot holding actual tile values: 0 for an empty cell,
/// otherwise a power of two >= 2. Row index grows downward, column index
/// grows rightward.
pub type Grid = [[u32; 4]; 4];

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, handy for iteration.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Packed 4x4 board as 16 4-bit exponent nibbles in a `u64`.
///
/// Nibble value 0 is an empty cell; nibble value `n >= 1` is the tile
/// `2^n`. The top-left cell sits in the most significant nibble, row-major
/// from there. Public methods provide ergonomic, safe operations while
/// preserving an escape hatch to the raw packed representation for
/// advanced use. Exponents cap at 15, so the largest representable tile is
/// 32768.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Pack a value grid into a `Board`.
    ///
    /// Cells must be 0 or powers of two in `2..=32768`; anything else is a
    /// caller bug (checked in debug builds, masked to the nibble range in
    /// release).
    ///
    /// ```
    /// use grid_engine::Board;
    ///
    /// let board = Board::from_grid(&[
    ///     [2, 0, 0, 0],
    ///     [0, 4, 0, 0],
    ///     [0, 0, 8, 0],
    ///     [0, 0, 0, 16],
    /// ]);
    /// assert_eq!(board.count_empty(), 12);
    /// assert_eq!(board.highest_tile(), 16);
    /// ```
    pub fn from_grid(grid: &Grid) -> Self {
        let mut raw: BoardRaw = 0;
        for (idx, &val) in grid.iter().flatten().enumerate() {
            if val != 0 {
                debug_assert!(
                    val.is_power_of_two() && (2..=32768).contains(&val),
                    "grid cells must be 0 or powers of two in 2..=32768, got {val}"
                );
                let exp = (val.trailing_zeros() as u64) & 0xf;
                raw |= exp << (60 - 4 * idx);
            }
        }
        Board(raw)
    }

    /// Unpack this board into a value grid (0 for empty, else 2, 4, 8, ...).
    pub fn to_grid(self) -> Grid {
        let mut grid: Grid = [[0; 4]; 4];
        for (idx, exp) in self.tiles().enumerate() {
            if exp != 0 {
                grid[idx / 4][idx % 4] = 1u32 << exp;
            }
        }
        grid
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use grid_engine::{Board, Direction};
    ///
    /// let board = Board::from_grid(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let merged = board.shift(Direction::Left);
    /// assert_eq!(merged.to_grid()[0], [4, 0, 0, 0]);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction) -> Self {
        ops::shift(self, dir)
    }

    /// True if sliding in `dir` would change the board.
    #[inline]
    pub fn can_move(self, dir: Direction) -> bool {
        self.shift(dir) != self
    }

    /// The directions whose slide would change the board, in `Direction::ALL` order.
    pub fn legal_moves(self) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|&dir| self.can_move(dir))
            .collect()
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly random
    /// empty cell, using the provided RNG. A full board is returned
    /// unchanged.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use grid_engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = ops::count_empty(self);
        if empty == 0 {
            return self;
        }
        let mut index = rng.gen_range(0..empty);
        let mut tmp = self.0;
        let mut tile = ops::generate_random_tile(rng);
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            tile <<= 4;
        }
        Board(self.0 | tile)
    }

    /// True if no cell is empty and no two adjacent cells are equal.
    #[inline]
    pub fn is_game_over(self) -> bool {
        ops::is_terminal(self)
    }

    /// Return the highest tile value (e.g., 2048) present, or 0 when empty.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::get_highest_tile_val(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// Get the actual value at `idx` (0 for empty, else `2^exponent`).
    ///
    /// Index runs 0..16 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        ops::get_tile_val(self, idx)
    }

    /// Iterate over tile exponents (nibbles) in row-major order.
    /// Returns 0 for empty, 1 for 2, 2 for 4, etc.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter { raw: self.0, idx: 0 }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board: Vec<_> = self.tiles().map(|n| ops::format_val(&n)).collect();
        write!(
            f,
            "\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n",
            board[0],
            board[1],
            board[2],
            board[3],
            board[4],
            board[5],
            board[6],
            board[7],
            board[8],
            board[9],
            board[10],
            board[11],
            board[12],
            board[13],
            board[14],
            board[15]
        )
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

impl IntoIterator for &Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_roundtrip() {
        let grid: Grid = [
            [2, 0, 4, 0],
            [0, 8, 0, 16],
            [32, 0, 64, 0],
            [0, 128, 0, 32768],
        ];
        let board = Board::from_grid(&grid);
        assert_eq!(board.to_grid(), grid);
        assert_eq!(board.count_empty(), 8);
        assert_eq!(board.highest_tile(), 32768);
    }

    #[test]
    fn from_grid_packs_row_major() {
        let board = Board::from_grid(&[[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]);
        assert_eq!(board.raw(), 0x1000_0000_0000_0002);
        assert_eq!(board.tile_value(0), 2);
        assert_eq!(board.tile_value(15), 4);
        assert_eq!(board.tile_value(1), 0);
    }

    #[test]
    fn legal_moves_on_compacted_board() {
        // Everything is packed against the left edge with no equal
        // neighbors, so only Right (and the vertical slides) can change it.
        let board = Board::from_grid(&[
            [2, 4, 8, 16],
            [0; 4],
            [0; 4],
            [0; 4],
        ]);
        assert!(!board.can_move(Direction::Left));
        assert!(board.can_move(Direction::Right));
        assert!(board.can_move(Direction::Down));
        assert!(!board.can_move(Direction::Up));
        assert_eq!(board.legal_moves(), vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn random_tile_fills_board_then_stops() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let mut board = Board::EMPTY;
        for _ in 0..16 {
            board = board.with_random_tile(&mut rng);
        }
        assert_eq!(board.count_empty(), 0);
        // Full board: spawning is a no-op, not a panic.
        assert_eq!(board.with_random_tile(&mut rng), board);
    }

    #[test]
    fn random_tile_values_are_two_or_four() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let mut fours = 0u32;
        for _ in 0..1000 {
            let board = Board::EMPTY.with_random_tile(&mut rng);
            match board.highest_tile() {
                2 => {}
                4 => fours += 1,
                other => panic!("unexpected spawned tile {other}"),
            }
        }
        // 10% of 1000 spawns, with generous slack.
        assert!((40..=200).contains(&fours), "fours = {fours}");
    }
}
