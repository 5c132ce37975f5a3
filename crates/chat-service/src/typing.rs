//! Typing indicator kept alive for the lifetime of a guard.

use crate::client::ChatClient;
use crate::error::Result;
use serenity::model::id::ChannelId;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Keeps the typing indicator visible in a channel until dropped.
///
/// The indicator expires on its own after a few seconds, so a background task
/// broadcasts it again every configured typing interval. A failed broadcast
/// ends the task.
#[derive(Debug)]
pub struct TypingGuard {
    channel_id: ChannelId,
    handle: JoinHandle<()>,
}

impl TypingGuard {
    /// Spawn the broadcast task on the current Tokio runtime.
    ///
    /// Fails with [`ServiceError::NoRuntime`](crate::ServiceError::NoRuntime)
    /// when called outside one.
    pub(crate) fn start(client: ChatClient, channel_id: ChannelId) -> Result<Self> {
        let runtime = Handle::try_current()?;
        let interval = client.config().typing_interval();
        let handle = runtime.spawn(async move {
            loop {
                if let Err(e) = client.service().broadcast_typing(channel_id).await {
                    warn!(%channel_id, error = %e, "Typing broadcast failed");
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });
        debug!(%channel_id, "Entered typing state");
        Ok(Self { channel_id, handle })
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Whether the background task is still broadcasting.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(channel_id = %self.channel_id, "Left typing state");
    }
}
