//! Watch notifiers.
//!
//! The network watcher lives outside this workspace. These implementations
//! cover the two ways a caller hands identities to it: not at all, or through
//! a bounded channel the watcher drains.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use sigil_core::error::{Result, SigilError};
use sigil_core::traits::WatchNotifier;
use sigil_core::types::{Address, Identity, OriginNode};

/// What the watcher needs to monitor an identity. Carries no key material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchRequest {
    /// Address to watch
    pub address: Address,
    /// Node the identity belongs to
    pub origin_node: OriginNode,
    /// Display name, for the watcher's own logs
    pub display_name: String,
}

impl WatchRequest {
    /// Extracts the public parts of an identity.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            address: identity.address().clone(),
            origin_node: identity.origin_node(),
            display_name: identity.display_name().to_string(),
        }
    }
}

/// Notifier that drops every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl WatchNotifier for NoopNotifier {
    async fn observe(&self, identity: &Identity) -> Result<()> {
        debug!(address = %identity.address(), "No watcher configured");
        Ok(())
    }
}

/// Notifier that queues requests on a bounded channel.
///
/// `observe` never waits: a full queue or a dropped receiver is reported as
/// `NotificationFailed`.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<WatchRequest>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver the watcher reads from.
    ///
    /// # Errors
    /// Returns `ConfigError` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<(Self, mpsc::Receiver<WatchRequest>)> {
        if capacity == 0 {
            return Err(SigilError::ConfigError(
                "notification queue capacity must be at least 1".into(),
            ));
        }
        let (sender, receiver) = mpsc::channel(capacity);
        Ok((Self { sender }, receiver))
    }
}

#[async_trait]
impl WatchNotifier for ChannelNotifier {
    async fn observe(&self, identity: &Identity) -> Result<()> {
        self.sender
            .try_send(WatchRequest::from_identity(identity))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    SigilError::NotificationFailed("watch queue is full".into())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    SigilError::NotificationFailed("watcher is not running".into())
                }
            })?;
        debug!(address = %identity.address(), "Queued identity for watching");
        Ok(())
    }
}
