//! Arena-backed LIFO work queue and on-disk checkpoint codec.
//!
//! This crate implements the Local Queue and Checkpoint Codec components: a
//! per-rank store of opaque byte-string work items with LIFO pop order, and a
//! line-oriented on-disk format for suspending and restoring that store
//! across a restart.

mod arena;
mod checkpoint;
mod error;
mod invariants;

pub use arena::Queue;
pub use checkpoint::{checkpoint_path, read, write, ReadOutcome, WriteOutcome};
pub use error::QueueError;
