use crate::abort::AbortHandle;
use crate::config::Config;
use crate::error::CircleError;
use crate::handle::Handle;
use crate::options::OptionFlags;
use crate::summary::Summary;
use circle_net::SubstrateBoxed;
use circle_queue::{self, Queue, ReadOutcome, WriteOutcome};
use std::sync::Arc;

/// Creator callback: seeds the Local Queue via a [`Handle`]. Invoked exactly
/// once per rank that runs it (rank 0 only, unless `CREATE_GLOBAL`).
pub type Creator = Box<dyn FnMut(&mut Handle) + Send>;

/// Processor callback: consumes one popped item, optionally enqueueing more
/// work via the [`Handle`].
pub type Processor = Box<dyn FnMut(&mut Handle, Vec<u8>) + Send>;

/// Per-rank state spanning `init` to `finalize`: the Local Queue, registered
/// callbacks, option flags, and the substrate this rank talks to its peers
/// through.
///
/// Stores the substrate as `Arc<dyn SubstrateBoxed>` rather than a generic
/// type parameter, mirroring the teacher's `AsyncSpanCollector`, which holds
/// its exporter as `Arc<dyn SpanExporterBoxed>` for the same reason: the
/// concrete substrate (emulated or TCP) is chosen once at the call site and
/// everything downstream — the Worker Loop, tests — is written against the
/// trait object.
pub struct Context {
    pub(crate) rank: usize,
    pub(crate) size: usize,
    pub(crate) substrate: Arc<dyn SubstrateBoxed>,
    pub(crate) flags: OptionFlags,
    pub(crate) queue: Queue,
    pub(crate) creator: Option<Creator>,
    pub(crate) processor: Option<Processor>,
    pub(crate) config: Config,
    pub(crate) processed: u64,
    finalized: bool,
}

impl Context {
    /// Initialises this rank's state against an already-connected substrate.
    /// Building the substrate itself (the real or emulated ensemble) happens
    /// at the call site, since it is the one step that necessarily involves
    /// every rank at once.
    pub fn init(substrate: Arc<dyn SubstrateBoxed>, config: Config) -> Self {
        let rank = substrate.rank();
        let size = substrate.size();
        let queue = Queue::new(config.queue_arena_capacity(), config.max_item_len);
        Self {
            rank,
            size,
            substrate,
            flags: OptionFlags::default(),
            queue,
            creator: None,
            processor: None,
            config,
            processed: 0,
            finalized: false,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Replaces the option flag word.
    pub fn set_options(&mut self, flags: OptionFlags) {
        self.flags = flags;
    }

    /// Registers the creator callback, replacing any prior registration.
    pub fn on_create<F>(&mut self, f: F)
    where
        F: FnMut(&mut Handle) + Send + 'static,
    {
        self.creator = Some(Box::new(f));
    }

    /// Registers the processor callback, replacing any prior registration.
    pub fn on_process<F>(&mut self, f: F)
    where
        F: FnMut(&mut Handle, Vec<u8>) + Send + 'static,
    {
        self.processor = Some(Box::new(f));
    }

    /// Writes this rank's current Local Queue to `circle<rank>.txt` in the
    /// configured checkpoint directory, without otherwise altering state.
    pub fn checkpoint(&self) -> Result<WriteOutcome, CircleError> {
        Ok(circle_queue::write(&self.queue, self.rank, &self.config.checkpoint_dir)?)
    }

    /// Loads this rank's checkpoint, if one exists, onto the Local Queue.
    /// Must be called between `init` and `begin`.
    pub fn read_restarts(&mut self) -> Result<ReadOutcome, CircleError> {
        Ok(circle_queue::read(
            &mut self.queue,
            self.rank,
            &self.config.checkpoint_dir,
        )?)
    }

    /// Runs the Worker Loop (§4.6) to termination.
    pub async fn begin(&mut self) -> Result<Summary, CircleError> {
        crate::worker_loop::begin(self).await
    }

    /// Returns a handle that can trigger an abort independently of this
    /// `Context`, including from another task while `begin` is running on
    /// this one (which otherwise holds `&mut self` for the Worker Loop's
    /// entire lifetime). Take this before calling `begin`.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(Arc::clone(&self.substrate))
    }

    /// Releases resources. Idempotent — a second call, or a call after
    /// `Drop`, is a no-op.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        tracing::debug!(rank = self.rank, processed = self.processed, "finalized");
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.finalized {
            self.finalize();
        }
    }
}
