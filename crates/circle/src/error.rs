use circle_net::SubstrateError;
use circle_queue::QueueError;
use thiserror::Error;

/// Aggregate error type returned by the public API.
///
/// Input and capacity errors (`Queue`) are almost always handled locally by
/// the caller; `Checkpoint` and `Substrate` are the two variants that end a
/// run.
#[derive(Debug, Error)]
pub enum CircleError {
    /// A Local Queue operation failed (bad item, arena exhaustion).
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    /// Checkpoint read or write failed.
    #[error("checkpoint I/O error: {0}")]
    Checkpoint(#[from] std::io::Error),
    /// The message substrate reported a fatal error.
    #[error("substrate error: {0}")]
    Substrate(#[from] SubstrateError),
}
