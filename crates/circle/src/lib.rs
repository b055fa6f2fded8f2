//! Distributed work-stealing and termination detection for a symmetric,
//! peer-to-peer ensemble of ranks connected by a message-passing substrate.
//!
//! A user program registers a *creator* callback (seeds work) and a
//! *processor* callback (consumes work, may enqueue more) on a [`Context`],
//! then calls [`Context::begin`]. The library drives both callbacks,
//! balancing work across ranks on demand and detecting global termination
//! safely.

mod abort;
mod backoff;
mod config;
mod context;
mod error;
mod handle;
mod options;
mod summary;
mod token_ring;
mod work_request;
mod worker_loop;

pub mod telemetry;

pub use abort::AbortHandle;
pub use config::{test_config, Config};
pub use context::{Context, Creator, Processor};
pub use error::CircleError;
pub use handle::Handle;
pub use options::{OptionFlags, CREATE_GLOBAL, SPLIT_EQUAL, SPLIT_RANDOM};
pub use summary::Summary;

pub use circle_net::{Colour, EmulatedSubstrate, Message, Substrate, SubstrateBoxed, SubstrateError, TcpSubstrate};
pub use circle_queue::{QueueError, ReadOutcome, WriteOutcome};
