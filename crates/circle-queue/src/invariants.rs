//! Debug assertion macros for the arena-backed queue.
//!
//! Only active in debug builds (`#[cfg(debug_assertions)]`); zero overhead in
//! release builds. Mirrors the `INV-*`-tagged macro style used for the
//! ring-buffer invariants elsewhere in this workspace's heritage.

// =============================================================================
// INV-ARENA-01: Entry Bounds
// =============================================================================

/// Assert that an entry's byte range lies within the arena.
///
/// **Invariant**: `offset + len <= arena.len()`
macro_rules! debug_assert_entry_in_bounds {
    ($offset:expr, $len:expr, $arena_len:expr) => {
        debug_assert!(
            $offset.saturating_add($len) <= $arena_len,
            "INV-ARENA-01 violated: entry [{}, {}) outside arena of length {}",
            $offset,
            $offset + $len,
            $arena_len
        )
    };
}

// =============================================================================
// INV-ARENA-02: Contiguous Insertion Order
// =============================================================================

/// Assert that the next entry starts exactly where the arena's written
/// portion ends.
///
/// **Invariant**: a push always starts at `arena_cursor`, never leaving a gap.
macro_rules! debug_assert_contiguous {
    ($offset:expr, $cursor:expr) => {
        debug_assert_eq!(
            $offset, $cursor,
            "INV-ARENA-02 violated: push started at {} but arena cursor was at {}",
            $offset, $cursor
        )
    };
}

// =============================================================================
// INV-Q-01: LIFO Identity
// =============================================================================

/// Assert that the entry table's length matches the reported item count.
macro_rules! debug_assert_count_matches_entries {
    ($count:expr, $entries_len:expr) => {
        debug_assert_eq!(
            $count, $entries_len,
            "INV-Q-01 violated: item count {} does not match entry table length {}",
            $count, $entries_len
        )
    };
}

pub(crate) use debug_assert_contiguous;
pub(crate) use debug_assert_count_matches_entries;
pub(crate) use debug_assert_entry_in_bounds;
