//! Message-passing substrate for `circle`: a trait each rank uses to talk to
//! its peers, plus two implementations — an in-process emulator for tests
//! and local runs, and a minimal TCP transport for a real cluster.

mod emulated;
mod error;
mod message;
mod substrate;
mod tcp;
mod wire;

pub use emulated::EmulatedSubstrate;
pub use error::SubstrateError;
pub use message::{Colour, Message};
pub use substrate::{Substrate, SubstrateBoxed};
pub use tcp::TcpSubstrate;
