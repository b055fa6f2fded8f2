use thiserror::Error;

/// Errors raised by a [`crate::Substrate`] implementation.
///
/// A substrate failure is always fatal to the calling rank — see §7 of the
/// design: the library logs and returns rather than attempting recovery.
#[derive(Debug, Error)]
pub enum SubstrateError {
    /// The target rank is out of range `0..size()`.
    #[error("rank {rank} is out of range for an ensemble of size {size}")]
    RankOutOfRange { rank: usize, size: usize },
    /// The peer's inbox has been dropped (process exited, connection closed).
    #[error("peer {rank} is unreachable")]
    PeerUnreachable { rank: usize },
    /// A framing or I/O error on the wire transport.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// A message arrived that did not decode to a known tag.
    #[error("malformed message from peer {rank}: {reason}")]
    MalformedMessage { rank: usize, reason: String },
}
