/// Outcome of a completed `begin()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Total items this rank processed before exiting.
    pub processed: u64,
    /// `true` if this rank exited via an abort rather than normal
    /// termination detection.
    pub aborted: bool,
}
