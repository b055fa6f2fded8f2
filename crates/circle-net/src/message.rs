/// Token colour used by the termination-detection ring (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    /// No work has been sent downstream (to a lower rank) since the token
    /// was last held.
    White,
    /// Work was sent downstream, or received while a candidate token-holder,
    /// since the token was last held.
    Black,
}

/// A message exchanged between ranks over a [`crate::Substrate`].
///
/// Every tag from the external interface is represented here. `WorkReply`'s
/// payload is the already-decoded sequence of items (framing happens at the
/// substrate layer, not in this type).
#[derive(Debug, Clone)]
pub enum Message {
    /// An idle rank asking a target rank for work.
    RequestWork,
    /// A loaded rank's response: the items it split off for the requester.
    WorkReply { items: Vec<Vec<u8>> },
    /// A loaded-enough-to-ask-but-not-to-give rank's response: "I have ≤ 1
    /// item, nothing to spare."
    NoWork,
    /// The termination-detection token, circulating the ring.
    Token { colour: Colour },
    /// Broadcast from the rank that initiated an abort: checkpoint and exit.
    Abort,
    /// Broadcast from rank 0 once termination has been declared.
    Done,
    /// A local progress contribution toward the periodic reduction, always
    /// addressed to rank 0.
    Reduce { processed: u64 },
}
