use std::sync::OnceLock;

use super::state::Direction;

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Shifting/merging a row or column depends only on its 4 nibbles, and
/// there are 2^16 possible 16-bit values. We precompute the result of
/// shifting left/right/up/down and the merge-score contribution for each
/// line, keeping moves branch-light at runtime.
///
/// Layout:
/// - `shift_left/right/up/down[i]`: replacement packed line after the move
///   (the up/down entries are pre-spread into column bit positions).
/// - `merge_score[i]`: sum of the tile values produced by merging the line.
///
/// Access is via `stores()`, which lazily initializes a single global
/// `Stores` on first use. The public `engine::init()` forces init early.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[u64]>,
    pub(crate) shift_right: Box<[u64]>,
    pub(crate) shift_up: Box<[u64]>,
    pub(crate) shift_down: Box<[u64]>,
    pub(crate) merge_score: Box<[u64]>,
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut merge_score = vec![0u64; LINE_TABLE_SIZE];

    let mut val: usize = 0;
    while val < LINE_TABLE_SIZE {
        let line = val as u64;
        shift_left[val] = super::ops::shift_line(line, Direction::Left);
        shift_right[val] = super::ops::shift_line(line, Direction::Right);
        shift_up[val] = super::ops::shift_line(line, Direction::Up);
        shift_down[val] = super::ops::shift_line(line, Direction::Down);
        merge_score[val] = super::ops::line_merge_score(line);
        val += 1;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        merge_score: merge_score.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn get_line_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    table[idx as usize]
}

#[inline(always)]
pub(crate) fn get_merge_score_entry(idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    stores().merge_score[idx as usize]
}
