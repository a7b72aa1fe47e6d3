use rand::Rng;

use super::state::{Board, BoardRaw, Direction, Line, Tile};
use super::tables::{get_line_entry, get_merge_score_entry, stores};

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, direction: Direction) -> Board {
    match direction {
        Direction::Left | Direction::Right => shift_rows(board, direction),
        Direction::Up | Direction::Down => shift_cols(board, direction),
    }
}

/// Sum of the values of all tiles a move in `direction` would produce by
/// merging, across the four lines. Zero when nothing merges.
///
/// A run of k equal tiles yields the same floor(k/2) merged values whether
/// it compacts toward either end, so one table keyed by the packed line
/// serves every direction; only the row/column split matters.
pub fn move_score(board: Board, direction: Direction) -> u64 {
    let raw = match direction {
        Direction::Left | Direction::Right => board.0,
        Direction::Up | Direction::Down => transpose(board.0),
    };
    (0..4).fold(0, |acc, idx| {
        let line_val = extract_line(raw, idx) as u16;
        acc + get_merge_score_entry(line_val)
    })
}

/// True if no cell is empty and no two adjacent cells (horizontally or
/// vertically) are equal. A pure function of the board; move history is
/// irrelevant.
pub fn is_terminal(board: Board) -> bool {
    if count_empty(board) > 0 {
        return false;
    }
    let transposed = transpose(board.0);
    (0..4).all(|idx| {
        !line_has_adjacent_equal(extract_line(board.0, idx))
            && !line_has_adjacent_equal(extract_line(transposed, idx))
    })
}

fn line_has_adjacent_equal(line: Line) -> bool {
    (0..3).any(|i| {
        let a = (line >> ((3 - i) * 4)) & 0xf;
        let b = (line >> ((2 - i) * 4)) & 0xf;
        a != 0 && a == b
    })
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub(crate) fn get_tile_val(board: Board, idx: usize) -> u32 {
    let raw_val = (board.0 >> (60 - (4 * idx))) & 0xf;
    if raw_val == 0 { 0 } else { 1u32 << raw_val }
}

/// Count the number of zero tiles.
// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 1 } else { 2 }
}

fn shift_rows(board: Board, move_dir: Direction) -> Board {
    let s = stores();
    let table: &[u64] = match move_dir {
        Direction::Left => &s.shift_left,
        Direction::Right => &s.shift_right,
        _ => unreachable!("vertical move in shift_rows"),
    };
    let res = (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = get_line_entry(table, row_val);
        new_board | (new_row_val << (48 - (16 * row_idx)))
    });
    Board(res)
}

fn shift_cols(board: Board, move_dir: Direction) -> Board {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match move_dir {
        Direction::Up => &s.shift_up,
        Direction::Down => &s.shift_down,
        _ => unreachable!("horizontal move in shift_cols"),
    };
    let res = (0..4).fold(0, |new_board, col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = get_line_entry(table, col_val);
        new_board | (new_col_val << (12 - (4 * col_idx)))
    });
    Board(res)
}

/// Reduce one packed line toward its most significant nibble: extract the
/// non-zero tiles in order, merge adjacent equal pairs in a single pass
/// (a merged tile never merges again in the same move), compact to the
/// near end, pad with zeros. Returns the reduced line and the sum of the
/// tile values produced by merges.
pub(crate) fn reduce_line(line: Line) -> (Line, u64) {
    let mut vals = [0u64; 4];
    let mut len = 0;
    for idx in 0..4 {
        let nib = (line >> ((3 - idx) * 4)) & 0xf;
        if nib != 0 {
            vals[len] = nib;
            len += 1;
        }
    }

    let mut out = [0u64; 4];
    let mut out_len = 0;
    let mut score = 0u64;
    let mut i = 0;
    while i < len {
        // Exponent 15 is the nibble ceiling; two ceiling tiles stay apart.
        if i + 1 < len && vals[i] == vals[i + 1] && vals[i] < 15 {
            let exp = vals[i] + 1;
            out[out_len] = exp;
            score += 1u64 << exp;
            i += 2;
        } else {
            out[out_len] = vals[i];
            i += 1;
        }
        out_len += 1;
    }

    let reduced = (0..4).fold(0u64, |acc, idx| acc | (out[idx] << ((3 - idx) * 4)));
    (reduced, score)
}

/// Merge score of a line; direction-independent (see `move_score`).
pub(crate) fn line_merge_score(line: Line) -> u64 {
    reduce_line(line).1
}

/// Table-building form of the line reduction: the replacement packed line
/// for each direction. Left/Right results stay row-packed; Up/Down results
/// come back spread into column positions so `shift_cols` can OR them in
/// without a second transpose.
pub(crate) fn shift_line(line: Line, direction: Direction) -> Line {
    match direction {
        Direction::Left => reduce_line(line).0,
        Direction::Right => reverse_line(reduce_line(reverse_line(line)).0),
        Direction::Up => spread_col(reduce_line(line).0),
        Direction::Down => spread_col(reverse_line(reduce_line(reverse_line(line)).0)),
    }
}

fn reverse_line(line: Line) -> Line {
    ((line & 0x000f) << 12) | ((line & 0x00f0) << 4) | ((line & 0x0f00) >> 4) | ((line & 0xf000) >> 12)
}

// Row-packed nibbles t0..t3 -> t0<<48 | t1<<32 | t2<<16 | t3, so that
// shifting by (12 - 4*col) lands each tile in its column slot.
fn spread_col(line: Line) -> Line {
    ((line & 0xf000) << 36) | ((line & 0x0f00) << 24) | ((line & 0x00f0) << 12) | (line & 0x000f)
}

pub(crate) fn format_val(val: &u8) -> String {
    match val {
        0 => String::from("       "),
        &x => {
            let mut x = (2_i32.pow(x as u32)).to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}

pub(crate) fn get_highest_tile_val(board: Board) -> u32 {
    match board.tiles().max() {
        Some(exp) if exp > 0 => 1u32 << exp,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::Grid;

    fn row_board(row: [u32; 4]) -> Board {
        Board::from_grid(&[row, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn reduce_compacts_and_merges_once() {
        // [2,2,0,0] -> [4,0,0,0], +4
        assert_eq!(reduce_line(0x1100), (0x2000, 4));
        // [2,0,0,2] -> [4,0,0,0], +4
        assert_eq!(reduce_line(0x1001), (0x2000, 4));
        // [2,2,2,2] -> [4,4,0,0], +8: two pairs, never a 16
        assert_eq!(reduce_line(0x1111), (0x2200, 8));
        // [4,4,4,4] -> [8,8,0,0], +16
        assert_eq!(reduce_line(0x2222), (0x3300, 16));
        // [2,4,4,2] -> [2,8,2,0], +8: merges stay inside the line scan
        assert_eq!(reduce_line(0x1221), (0x1310, 8));
        // [2,4,8,16]: compacted, nothing equal, no movement
        assert_eq!(reduce_line(0x1234), (0x1234, 0));
        // empty line
        assert_eq!(reduce_line(0x0000), (0x0000, 0));
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        // [2,2,4,0]: the fresh 4 must not swallow the old 4 in the same move.
        assert_eq!(reduce_line(0x1120), (0x2200, 4));
        // [4,2,2,0]: same from the other side.
        assert_eq!(reduce_line(0x2110), (0x2200, 4));
    }

    #[test]
    fn ceiling_tiles_do_not_merge() {
        // Two 32768 tiles (exponent 15) stay apart.
        assert_eq!(reduce_line(0xff00), (0xff00, 0));
    }

    #[test]
    fn shift_left_vectors() {
        assert_eq!(shift(Board::from_raw(0x0000), Direction::Left), Board::from_raw(0x0000));
        assert_eq!(shift(Board::from_raw(0x0002), Direction::Left), Board::from_raw(0x2000));
        assert_eq!(shift(Board::from_raw(0x2020), Direction::Left), Board::from_raw(0x3000));
        assert_eq!(shift(Board::from_raw(0x1332), Direction::Left), Board::from_raw(0x1420));
        assert_eq!(shift(Board::from_raw(0x1234), Direction::Left), Board::from_raw(0x1234));
        assert_eq!(shift(Board::from_raw(0x1002), Direction::Left), Board::from_raw(0x1200));
    }

    #[test]
    fn shift_right_vectors() {
        assert_eq!(shift(Board::from_raw(0x2000), Direction::Right), Board::from_raw(0x0002));
        assert_eq!(shift(Board::from_raw(0x2020), Direction::Right), Board::from_raw(0x0003));
        assert_eq!(shift(Board::from_raw(0x1332), Direction::Right), Board::from_raw(0x0142));
        assert_eq!(shift(Board::from_raw(0x1234), Direction::Right), Board::from_raw(0x1234));
        assert_eq!(shift(Board::from_raw(0x1002), Direction::Right), Board::from_raw(0x0012));
    }

    #[test]
    fn shift_full_board_left_right() {
        let board = Board::from_raw(0x1234133220021002);
        assert_eq!(shift(board, Direction::Left), Board::from_raw(0x1234142030001200));
        assert_eq!(shift(board, Direction::Right), Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn shift_full_board_up_down() {
        let board = Board::from_raw(0x1121230033004222);
        assert_eq!(shift(board, Direction::Up), Board::from_raw(0x1131240232004000));
        assert_eq!(shift(board, Direction::Down), Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn shift_preserves_tile_value_sum() {
        let board = Board::from_raw(0x1121230033004222);
        let sum = |b: Board| -> u64 {
            b.tiles().filter(|&e| e != 0).map(|e| 1u64 << e).sum()
        };
        for dir in Direction::ALL {
            assert_eq!(sum(board.shift(dir)), sum(board), "{dir:?}");
        }
    }

    #[test]
    fn move_score_counts_merged_values() {
        // Two 2s merging into a 4 contribute exactly +4.
        assert_eq!(move_score(row_board([2, 2, 0, 0]), Direction::Left), 4);
        assert_eq!(move_score(row_board([2, 2, 0, 0]), Direction::Right), 4);
        // [4,4,4,4] -> two 8s.
        assert_eq!(move_score(row_board([4, 4, 4, 4]), Direction::Left), 16);
        // Independent lines accumulate.
        let board = Board::from_grid(&[
            [2, 2, 0, 0],
            [4, 4, 8, 8],
            [0; 4],
            [2, 4, 8, 16],
        ]);
        assert_eq!(move_score(board, Direction::Left), 4 + 8 + 16);
        // Columns of the same board: the two vertical 2-2 and 4-4 pairs.
        let cols = Board::from_grid(&[
            [2, 4, 0, 0],
            [2, 4, 0, 0],
            [0; 4],
            [0; 4],
        ]);
        assert_eq!(move_score(cols, Direction::Up), 4 + 8);
        assert_eq!(move_score(cols, Direction::Down), 4 + 8);
        // No merges, no score.
        assert_eq!(move_score(row_board([2, 4, 8, 16]), Direction::Left), 0);
    }

    #[test]
    fn mirrored_right_matches_left() {
        let rows: [[u32; 4]; 5] = [
            [2, 2, 4, 4],
            [2, 0, 0, 2],
            [0, 2, 2, 2],
            [4, 4, 4, 4],
            [2, 4, 8, 16],
        ];
        let mirror = |row: [u32; 4]| [row[3], row[2], row[1], row[0]];
        for row in rows {
            let left = row_board(row).shift(Direction::Left).to_grid()[0];
            let right = row_board(mirror(row)).shift(Direction::Right).to_grid()[0];
            assert_eq!(mirror(right), left, "row {row:?}");
        }
    }

    #[test]
    fn terminal_needs_full_board_without_equal_neighbors() {
        let checkerboard: Grid = [
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ];
        assert!(is_terminal(Board::from_grid(&checkerboard)));

        let mut with_hole = checkerboard;
        with_hole[2][1] = 0;
        assert!(!is_terminal(Board::from_grid(&with_hole)));

        let mut with_pair = checkerboard;
        with_pair[0][1] = 2; // horizontal 2-2 pair
        assert!(!is_terminal(Board::from_grid(&with_pair)));

        let mut with_col_pair = checkerboard;
        with_col_pair[1][0] = 2; // vertical 2-2 pair
        assert!(!is_terminal(Board::from_grid(&with_col_pair)));

        assert!(!is_terminal(Board::EMPTY));
    }

    #[test]
    fn count_empty_vectors() {
        assert_eq!(count_empty(Board::from_raw(0x1111000011110000)), 8);
        assert_eq!(count_empty(Board::from_raw(0x1100000000000000)), 14);
        assert_eq!(count_empty(Board::EMPTY), 16);
    }

    #[test]
    fn tile_values_decode_exponents() {
        let board = Board::from_raw(0x0123456789abcdef);
        assert_eq!(get_tile_val(board, 0), 0);
        assert_eq!(get_tile_val(board, 3), 8);
        assert_eq!(get_tile_val(board, 10), 1024);
        assert_eq!(get_tile_val(board, 15), 32768);
    }
}
