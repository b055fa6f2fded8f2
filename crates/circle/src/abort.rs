use crate::error::CircleError;
use circle_net::{Message, SubstrateBoxed};
use std::sync::Arc;

/// An independently-callable trigger for aborting a run.
///
/// `Context::begin` takes `&mut self` for the Worker Loop's entire lifetime,
/// so nothing holding only a `&Context`/`&mut Context` can call back into it
/// concurrently. `AbortHandle` sidesteps that by holding its own clone of the
/// `Arc<dyn SubstrateBoxed>` rather than a reference to the `Context` at all:
/// obtain one via [`crate::Context::abort_handle`] before calling `begin`,
/// keep it on another task, and call [`AbortHandle::abort`] whenever the
/// decision to abort is made — including while `begin` is still running.
#[derive(Clone)]
pub struct AbortHandle {
    substrate: Arc<dyn SubstrateBoxed>,
}

impl AbortHandle {
    pub(crate) fn new(substrate: Arc<dyn SubstrateBoxed>) -> Self {
        Self { substrate }
    }

    /// Broadcasts `Message::Abort` to every rank, including this one. Each
    /// rank checkpoints and exits at its next Worker Loop iteration.
    pub async fn abort(&self) -> Result<(), CircleError> {
        tracing::warn!("abort requested");
        self.substrate.broadcast_boxed(Message::Abort).await?;
        Ok(())
    }
}
