use crate::error::SubstrateError;
use crate::message::Message;
use crate::substrate::Substrate;
use std::sync::Arc;
use tokio::sync::{mpsc, Barrier, Mutex};

/// An in-process substrate for `N` virtual ranks, wired together with
/// per-rank unbounded channels.
///
/// Used by the test suite (and anything that wants to exercise the Worker
/// Loop without standing up a real cluster): [`EmulatedSubstrate::ensemble`]
/// returns one handle per rank, each runnable as its own `tokio::task`.
pub struct EmulatedSubstrate {
    rank: usize,
    size: usize,
    inboxes: Arc<Vec<mpsc::UnboundedSender<(usize, Message)>>>,
    receiver: Mutex<mpsc::UnboundedReceiver<(usize, Message)>>,
    barrier: Arc<Barrier>,
}

impl EmulatedSubstrate {
    /// Builds an ensemble of `size` virtual ranks, returning one
    /// [`EmulatedSubstrate`] per rank in rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn ensemble(size: usize) -> Vec<Self> {
        assert!(size > 0, "an ensemble needs at least one rank");

        let mut senders = Vec::with_capacity(size);
        let mut receivers = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }
        let inboxes = Arc::new(senders);
        let barrier = Arc::new(Barrier::new(size));

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| EmulatedSubstrate {
                rank,
                size,
                inboxes: Arc::clone(&inboxes),
                receiver: Mutex::new(rx),
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }
}

impl Substrate for EmulatedSubstrate {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&self, to: usize, msg: Message) -> Result<(), SubstrateError> {
        let target = self
            .inboxes
            .get(to)
            .ok_or(SubstrateError::RankOutOfRange {
                rank: to,
                size: self.size,
            })?;
        target
            .send((self.rank, msg))
            .map_err(|_| SubstrateError::PeerUnreachable { rank: to })
    }

    async fn recv(&self) -> (usize, Message) {
        let mut rx = self.receiver.lock().await;
        rx.recv()
            .await
            .expect("EmulatedSubstrate keeps every sender alive for the ensemble's lifetime")
    }

    fn try_recv(&self) -> Option<(usize, Message)> {
        let mut rx = self.receiver.try_lock().ok()?;
        rx.try_recv().ok()
    }

    async fn barrier(&self) {
        self.barrier.wait().await;
    }

    async fn broadcast(&self, msg: Message) -> Result<(), SubstrateError> {
        for to in 0..self.size {
            self.send(to, msg.clone()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Colour;

    #[tokio::test]
    async fn point_to_point_delivers_sender_rank() {
        let mut ranks = EmulatedSubstrate::ensemble(2);
        let rank1 = ranks.pop().unwrap();
        let rank0 = ranks.pop().unwrap();

        rank0.send(1, Message::RequestWork).await.unwrap();
        let (from, msg) = rank1.recv().await;
        assert_eq!(from, 0);
        assert!(matches!(msg, Message::RequestWork));
    }

    #[tokio::test]
    async fn broadcast_reaches_every_rank_including_sender() {
        let ranks = EmulatedSubstrate::ensemble(3);
        ranks[1].broadcast(Message::Done).await.unwrap();
        for rank in &ranks {
            let (_, msg) = rank.recv().await;
            assert!(matches!(msg, Message::Done));
        }
    }

    #[tokio::test]
    async fn try_recv_is_none_when_empty() {
        let ranks = EmulatedSubstrate::ensemble(1);
        assert!(ranks[0].try_recv().is_none());
    }

    #[tokio::test]
    async fn send_to_out_of_range_rank_errors() {
        let ranks = EmulatedSubstrate::ensemble(2);
        let err = ranks[0]
            .send(5, Message::Token { colour: Colour::White })
            .await
            .unwrap_err();
        assert!(matches!(err, SubstrateError::RankOutOfRange { rank: 5, size: 2 }));
    }

    #[tokio::test]
    async fn barrier_releases_once_every_rank_arrives() {
        let ranks = EmulatedSubstrate::ensemble(3);
        let handles: Vec<_> = ranks
            .into_iter()
            .map(|rank| tokio::spawn(async move { rank.barrier().await }))
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
