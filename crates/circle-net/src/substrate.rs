use crate::error::SubstrateError;
use crate::message::Message;
use std::future::Future;
use std::pin::Pin;

/// The message-passing fabric a rank uses to talk to its peers.
///
/// Defines exactly the capabilities the Worker Loop needs: point-to-point
/// send, a blocking receive and a non-blocking probe, plus the two
/// collectives actually used (`barrier`, `broadcast`). `reduce` is
/// deliberately absent — the Reduction Tree (§4.5) is realized as an
/// ordinary `send` carrying a `Message::Reduce` tag, because the spec
/// requires it be non-blocking and interleaved with message servicing rather
/// than a synchronizing collective.
///
/// Uses native async fn in traits; for dynamic dispatch (`Box<dyn
/// SubstrateBoxed>`, which is what the Worker Loop actually holds) use the
/// blanket-implemented [`SubstrateBoxed`] instead.
pub trait Substrate: Send + Sync {
    /// This process's rank, `0..size()`.
    fn rank(&self) -> usize;

    /// The number of ranks in the ensemble.
    fn size(&self) -> usize;

    /// Sends `msg` to `to`. Delivery is ordered per sender-receiver pair but
    /// otherwise unordered across peers.
    fn send(
        &self,
        to: usize,
        msg: Message,
    ) -> impl Future<Output = Result<(), SubstrateError>> + Send;

    /// Blocks until a message arrives, returning the sender's rank alongside
    /// it.
    fn recv(&self) -> impl Future<Output = (usize, Message)> + Send;

    /// Returns a pending message without blocking, or `None` if the inbox is
    /// currently empty.
    fn try_recv(&self) -> Option<(usize, Message)>;

    /// Waits until every rank has called `barrier`.
    fn barrier(&self) -> impl Future<Output = ()> + Send;

    /// Sends `msg` to every rank (including the caller).
    fn broadcast(&self, msg: Message) -> impl Future<Output = Result<(), SubstrateError>> + Send;
}

/// Object-safe counterpart to [`Substrate`], for `Box<dyn SubstrateBoxed>`.
///
/// Any `Substrate` implementation gets this for free via the blanket impl
/// below.
pub trait SubstrateBoxed: Send + Sync {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn send_boxed(
        &self,
        to: usize,
        msg: Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubstrateError>> + Send + '_>>;
    fn recv_boxed(&self) -> Pin<Box<dyn Future<Output = (usize, Message)> + Send + '_>>;
    fn try_recv(&self) -> Option<(usize, Message)>;
    fn barrier_boxed(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
    fn broadcast_boxed(
        &self,
        msg: Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubstrateError>> + Send + '_>>;
}

impl<T: Substrate> SubstrateBoxed for T {
    fn rank(&self) -> usize {
        Substrate::rank(self)
    }

    fn size(&self) -> usize {
        Substrate::size(self)
    }

    fn send_boxed(
        &self,
        to: usize,
        msg: Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubstrateError>> + Send + '_>> {
        Box::pin(self.send(to, msg))
    }

    fn recv_boxed(&self) -> Pin<Box<dyn Future<Output = (usize, Message)> + Send + '_>> {
        Box::pin(self.recv())
    }

    fn try_recv(&self) -> Option<(usize, Message)> {
        Substrate::try_recv(self)
    }

    fn barrier_boxed(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.barrier())
    }

    fn broadcast_boxed(
        &self,
        msg: Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubstrateError>> + Send + '_>> {
        Box::pin(self.broadcast(msg))
    }
}
