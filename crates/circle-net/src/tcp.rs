use crate::error::SubstrateError;
use crate::message::Message;
use crate::substrate::Substrate;
use crate::wire::{decode_frame, encode_frame, Frame};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};

struct Inner {
    rank: usize,
    size: usize,
    writers: Vec<Option<Mutex<OwnedWriteHalf>>>,
    app_tx: mpsc::UnboundedSender<(usize, Message)>,
    barrier_join_count: AtomicUsize,
    barrier_release: Mutex<Option<oneshot::Sender<()>>>,
}

/// A reliable, per-peer-ordered substrate over plain TCP.
///
/// Every rank's listen address must be known to every other rank in advance
/// (e.g. via a shared config file or launcher). Connections are established
/// once, at [`TcpSubstrate::connect`]: for each pair `(i, j)` with `i < j`,
/// rank `j` dials rank `i`'s listen address. After all `size * (size - 1) /
/// 2` connections are up, every rank can reach every other rank directly.
pub struct TcpSubstrate {
    inner: Arc<Inner>,
    app_rx: Mutex<mpsc::UnboundedReceiver<(usize, Message)>>,
}

impl TcpSubstrate {
    /// Connects this rank to every peer named in `addrs` (`addrs[r]` is rank
    /// `r`'s listen address; this process's own rank is `rank`).
    pub async fn connect(rank: usize, addrs: Vec<SocketAddr>) -> std::io::Result<Self> {
        let size = addrs.len();
        assert!(rank < size, "rank {rank} out of range for {size} addresses");

        let listener = TcpListener::bind(addrs[rank]).await?;
        let (app_tx, app_rx) = mpsc::unbounded_channel();

        let mut writers: Vec<Option<TcpStream>> = (0..size).map(|_| None).collect();

        // Rank `rank` accepts one connection from every higher-numbered rank,
        // and dials every lower-numbered rank. Accepting first (in a
        // background-free, sequential handshake) keeps this routine simple;
        // it is not meant to be fast, only correct, per the ambient scope of
        // this transport.
        let incoming = size.saturating_sub(rank + 1);
        for _ in 0..incoming {
            let (mut stream, _) = listener.accept().await?;
            let peer = read_handshake(&mut stream).await?;
            writers[peer] = Some(stream);
        }
        for peer in 0..rank {
            let mut stream = TcpStream::connect(addrs[peer]).await?;
            write_handshake(&mut stream, rank).await?;
            writers[peer] = Some(stream);
        }

        let mut split_writers = Vec::with_capacity(size);
        let mut reader_streams = Vec::with_capacity(size);
        for (peer, stream) in writers.into_iter().enumerate() {
            match stream {
                Some(stream) => {
                    let (read_half, write_half) = stream.into_split();
                    split_writers.push(Some(Mutex::new(write_half)));
                    reader_streams.push(Some((peer, read_half)));
                }
                None => {
                    split_writers.push(None);
                    reader_streams.push(None);
                }
            }
        }

        let inner = Arc::new(Inner {
            rank,
            size,
            writers: split_writers,
            app_tx,
            barrier_join_count: AtomicUsize::new(0),
            barrier_release: Mutex::new(None),
        });

        for entry in reader_streams.into_iter().flatten() {
            let (peer, read_half) = entry;
            let inner = Arc::clone(&inner);
            tokio::spawn(reader_task(inner, peer, read_half));
        }

        Ok(Self {
            inner,
            app_rx: Mutex::new(app_rx),
        })
    }

    async fn send_frame(&self, to: usize, frame: Frame) -> Result<(), SubstrateError> {
        let slot = self
            .inner
            .writers
            .get(to)
            .and_then(|w| w.as_ref())
            .ok_or(SubstrateError::RankOutOfRange {
                rank: to,
                size: self.inner.size,
            })?;
        let bytes = encode_frame(&frame);
        let mut writer = slot.lock().await;
        writer
            .write_all(&bytes)
            .await
            .map_err(SubstrateError::Transport)
    }
}

impl Substrate for TcpSubstrate {
    fn rank(&self) -> usize {
        self.inner.rank
    }

    fn size(&self) -> usize {
        self.inner.size
    }

    async fn send(&self, to: usize, msg: Message) -> Result<(), SubstrateError> {
        self.send_frame(to, Frame::App(msg)).await
    }

    async fn recv(&self) -> (usize, Message) {
        let mut rx = self.app_rx.lock().await;
        rx.recv()
            .await
            .expect("reader tasks outlive this substrate for its whole lifetime")
    }

    fn try_recv(&self) -> Option<(usize, Message)> {
        let mut rx = self.app_rx.try_lock().ok()?;
        rx.try_recv().ok()
    }

    async fn barrier(&self) {
        if self.inner.rank == 0 {
            let (tx, rx) = oneshot::channel();
            *self.inner.barrier_release.lock().await = Some(tx);
            // Rank 0 itself contributes no BarrierJoin frame (it has no
            // connection to itself); the join count only ever needs to
            // reach `size - 1`.
            if self.inner.size == 1 {
                return;
            }
            rx.await.ok();
        } else {
            let _ = self.send_frame(0, Frame::BarrierJoin).await;
            // This rank has no further work until released; park on a
            // channel fed by its reader task when `BarrierRelease` arrives.
            let (tx, rx) = oneshot::channel();
            // Reuse the same slot rank 0 uses so a single reader-task code
            // path handles both roles uniformly.
            *self.inner.barrier_release.lock().await = Some(tx);
            rx.await.ok();
        }
    }

    async fn broadcast(&self, msg: Message) -> Result<(), SubstrateError> {
        for to in 0..self.inner.size {
            if to == self.inner.rank {
                self.inner
                    .app_tx
                    .send((self.inner.rank, msg.clone()))
                    .map_err(|_| SubstrateError::PeerUnreachable { rank: to })?;
            } else {
                self.send(to, msg.clone()).await?;
            }
        }
        Ok(())
    }
}

async fn reader_task(
    inner: Arc<Inner>,
    peer: usize,
    mut read_half: tokio::net::tcp::OwnedReadHalf,
) {
    loop {
        let len = match read_half.read_u32_le().await {
            Ok(len) => len as usize,
            Err(_) => return, // peer closed the connection
        };
        let mut buf = vec![0u8; len];
        if read_half.read_exact(&mut buf).await.is_err() {
            return;
        }
        let frame = match decode_frame(&buf, peer) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(peer, error = %e, "dropping malformed frame");
                continue;
            }
        };
        match frame {
            Frame::App(msg) => {
                if inner.app_tx.send((peer, msg)).is_err() {
                    return;
                }
            }
            Frame::BarrierJoin => {
                let prev = inner.barrier_join_count.fetch_add(1, Ordering::AcqRel);
                if prev + 1 == inner.size - 1 {
                    inner.barrier_join_count.store(0, Ordering::Release);
                    for to in 0..inner.size {
                        if to != inner.rank {
                            let slot = inner.writers[to].as_ref().unwrap();
                            let bytes = encode_frame(&Frame::BarrierRelease);
                            let mut writer = slot.lock().await;
                            let _ = writer.write_all(&bytes).await;
                        }
                    }
                    if let Some(tx) = inner.barrier_release.lock().await.take() {
                        let _ = tx.send(());
                    }
                }
            }
            Frame::BarrierRelease => {
                if let Some(tx) = inner.barrier_release.lock().await.take() {
                    let _ = tx.send(());
                }
            }
        }
    }
}

async fn read_handshake(stream: &mut TcpStream) -> std::io::Result<usize> {
    let rank = stream.read_u32_le().await?;
    Ok(rank as usize)
}

async fn write_handshake(stream: &mut TcpStream, rank: usize) -> std::io::Result<()> {
    stream.write_u32_le(rank as u32).await
}
