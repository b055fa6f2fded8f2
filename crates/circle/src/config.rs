use std::path::PathBuf;
use std::time::Duration;

/// Tunables for a `circle` run.
///
/// Mirrors the teacher's `Config` pattern: a `Copy` struct built by a
/// validating `const fn new`, a `Default` impl, and named presets for common
/// shapes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-item length ceiling enforced by every rank's Local Queue.
    pub max_item_len: usize,
    /// How many items the Worker Loop drains into the processor callback per
    /// steady-state iteration before servicing messages again.
    pub processing_batch_size: usize,
    /// Wall-clock interval between reduction contributions.
    pub reduce_interval: Duration,
    /// Directory checkpoints are written to and read from.
    pub checkpoint_dir: PathBuf,
}

impl Config {
    /// Creates a configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `max_item_len` is 0, or if `processing_batch_size` is 0.
    pub fn new(
        max_item_len: usize,
        processing_batch_size: usize,
        reduce_interval: Duration,
        checkpoint_dir: PathBuf,
    ) -> Self {
        assert!(max_item_len > 0, "max_item_len must be positive");
        assert!(
            processing_batch_size > 0,
            "processing_batch_size must be positive"
        );
        Self {
            max_item_len,
            processing_batch_size,
            reduce_interval,
            checkpoint_dir,
        }
    }

    /// The arena capacity a Local Queue should be built with under this
    /// config: generous enough to hold many max-length items without forcing
    /// ranks to throttle on arena pressure alone.
    pub fn queue_arena_capacity(&self) -> usize {
        self.max_item_len.saturating_mul(256).max(1 << 16)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_item_len: 4096,
            processing_batch_size: 64,
            reduce_interval: Duration::from_secs(10),
            checkpoint_dir: PathBuf::from("."),
        }
    }
}

/// Suited to short-lived test ensembles: tiny items, small batches, fast
/// reduction, so end-to-end scenarios do not spend wall-clock time waiting on
/// a 10-second reduce tick.
pub fn test_config(checkpoint_dir: PathBuf) -> Config {
    Config {
        max_item_len: 256,
        processing_batch_size: 8,
        reduce_interval: Duration::from_millis(50),
        checkpoint_dir,
    }
}
