use thiserror::Error;

/// Errors raised by [`crate::Queue`] operations.
///
/// Every variant is local to the rank that raised it; none of these ever cross
/// the wire to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `push` was called with a zero-length item.
    #[error("item is empty")]
    EmptyItem,
    /// `push` was called with an item longer than `max_item_len`.
    #[error("item length {len} exceeds max_item_len {max}")]
    ItemTooLong {
        /// The length the caller tried to push.
        len: usize,
        /// The configured ceiling.
        max: usize,
    },
    /// `push` was called with an item containing an embedded LF or NUL byte.
    #[error("item contains an embedded LF or NUL byte, which the checkpoint format forbids")]
    ForbiddenByte,
    /// The arena does not have enough remaining capacity for this item.
    #[error("arena is full: {needed} bytes requested, {available} available")]
    ArenaFull {
        /// Bytes the push would have consumed (item + terminator).
        needed: usize,
        /// Bytes actually free in the arena.
        available: usize,
    },
    /// `pop` was called on an empty queue.
    #[error("queue is empty")]
    Empty,
}
