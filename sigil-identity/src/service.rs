//! Identity creation.
//!
//! [`IdentityService::start`] validates a request and either spawns a miner
//! (fresh key) or checks the supplied key (import). The returned
//! [`PendingIdentity`] finishes the job: wrap the key into an [`Identity`],
//! add it to the vault, then notify the watcher.

use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use tracing::{info, instrument, warn};
use zeroize::Zeroizing;

use sigil_core::error::Result;
use sigil_core::traits::{IdentityVault, WatchNotifier};
use sigil_core::types::{validate_display_name, Identity, OriginNode};
use sigil_crypto::{check_prefix_length, validate_hex, MinedAddress, MiningOutcome};

use crate::mining::MiningTask;
use crate::notifier::NoopNotifier;

/// Where the key of a new identity comes from.
#[derive(Clone)]
pub enum KeySource {
    /// Mine a fresh key pair
    Generate,
    /// Use the given hex-encoded private key as is
    Import(Zeroizing<String>),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Generate => f.write_str("Generate"),
            KeySource::Import(_) => f.write_str("Import([REDACTED])"),
        }
    }
}

/// A request for a new identity.
#[derive(Clone, Debug)]
pub struct IdentityRequest {
    /// Display name (trimmed, must not be empty)
    pub display_name: String,
    /// Node the identity is created for
    pub origin_node: OriginNode,
    /// Required number of leading zero bits
    pub prefix_length: u8,
    /// Key source
    pub key: KeySource,
}

impl IdentityRequest {
    /// Requests a freshly mined identity on the default node.
    pub fn generate(display_name: impl Into<String>, prefix_length: u8) -> Self {
        Self {
            display_name: display_name.into(),
            origin_node: OriginNode::default(),
            prefix_length,
            key: KeySource::Generate,
        }
    }

    /// Requests an identity for an existing hex-encoded private key.
    pub fn import(
        display_name: impl Into<String>,
        prefix_length: u8,
        private_key_hex: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            origin_node: OriginNode::default(),
            prefix_length,
            key: KeySource::Import(Zeroizing::new(private_key_hex.into())),
        }
    }

    /// Sets the origin node.
    pub fn origin_node(mut self, node: OriginNode) -> Self {
        self.origin_node = node;
        self
    }
}

/// Final state of a creation attempt.
#[derive(Debug)]
pub enum Creation {
    /// The identity was stored (and the watcher was told, best effort).
    Created(Identity),
    /// Mining was cancelled; nothing was stored.
    Cancelled {
        /// Key pairs tried before cancellation
        attempts: u64,
    },
}

impl Creation {
    /// Returns the created identity, if any.
    pub fn identity(self) -> Option<Identity> {
        match self {
            Creation::Created(identity) => Some(identity),
            Creation::Cancelled { .. } => None,
        }
    }
}

/// Orchestrates identity creation against a vault and a watcher.
pub struct IdentityService<V: IdentityVault> {
    vault: Arc<V>,
    notifier: Arc<dyn WatchNotifier>,
}

impl<V: IdentityVault> Clone for IdentityService<V> {
    fn clone(&self) -> Self {
        Self {
            vault: self.vault.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<V: IdentityVault> IdentityService<V> {
    /// Creates a service that does not notify anyone.
    pub fn new(vault: Arc<V>) -> Self {
        Self::with_notifier(vault, Arc::new(NoopNotifier))
    }

    /// Creates a service with a watcher.
    pub fn with_notifier(vault: Arc<V>, notifier: Arc<dyn WatchNotifier>) -> Self {
        Self { vault, notifier }
    }

    /// Returns the vault.
    pub fn vault(&self) -> &Arc<V> {
        &self.vault
    }

    /// Validates a request and starts producing its key.
    ///
    /// Input errors are reported here, before any mining:
    /// `InvalidDisplayName`, `InvalidPrefixLength`, and for imports
    /// `InvalidPrivateKeyEncoding`, `InvalidPrivateKeyValue` or
    /// `KeyDoesNotMatchPrefix`.
    pub fn start(&self, request: IdentityRequest) -> Result<PendingIdentity<V>> {
        self.start_inner(request, MiningTask::spawn)
    }

    /// Same as [`start`](Self::start), mining with the given random source.
    pub fn start_with_rng<R>(&self, request: IdentityRequest, rng: R) -> Result<PendingIdentity<V>>
    where
        R: RngCore + CryptoRng + Send + 'static,
    {
        self.start_inner(request, move |prefix_length| {
            MiningTask::spawn_with_rng(rng, prefix_length)
        })
    }

    #[instrument(skip(self, request, spawn), fields(prefix_length = request.prefix_length, node = %request.origin_node))]
    fn start_inner(
        &self,
        request: IdentityRequest,
        spawn: impl FnOnce(u8) -> Result<MiningTask>,
    ) -> Result<PendingIdentity<V>> {
        let display_name = validate_display_name(request.display_name)?;
        check_prefix_length(request.prefix_length)?;

        let key = match request.key {
            KeySource::Generate => PendingKey::Mining(spawn(request.prefix_length)?),
            KeySource::Import(hex) => {
                PendingKey::Ready(validate_hex(&hex, request.prefix_length)?)
            }
        };

        Ok(PendingIdentity {
            display_name,
            origin_node: request.origin_node,
            key,
            vault: self.vault.clone(),
            notifier: self.notifier.clone(),
        })
    }

    /// Starts a request and waits for it to finish.
    pub async fn create(&self, request: IdentityRequest) -> Result<Creation> {
        self.start(request)?.complete().await
    }

    /// Sends a stored identity to the watcher again.
    ///
    /// Unlike the hand-off after creation, a notifier failure is returned.
    #[instrument(skip(self))]
    pub async fn renotify(&self, address: &str) -> Result<()> {
        let identity = self.vault.find_by_address(address).await?;
        self.notifier.observe(&identity).await?;
        info!("Watcher notified");
        Ok(())
    }
}

enum PendingKey {
    Mining(MiningTask),
    Ready(MinedAddress),
}

/// An identity whose key is being produced.
///
/// Dropping it before [`complete`](Self::complete) resolves cancels any
/// running search and stores nothing.
pub struct PendingIdentity<V: IdentityVault> {
    display_name: String,
    origin_node: OriginNode,
    key: PendingKey,
    vault: Arc<V>,
    notifier: Arc<dyn WatchNotifier>,
}

impl<V: IdentityVault> PendingIdentity<V> {
    /// Cancels mining. Has no effect on an imported key.
    pub fn cancel(&self) {
        if let PendingKey::Mining(task) = &self.key {
            task.cancel();
        }
    }

    /// Returns the number of key pairs tried so far.
    pub fn attempts(&self) -> u64 {
        match &self.key {
            PendingKey::Mining(task) => task.attempts(),
            PendingKey::Ready(mined) => mined.attempts,
        }
    }

    /// Returns a handle that can cancel mining from elsewhere.
    pub fn control(&self) -> Option<sigil_crypto::MiningControl> {
        match &self.key {
            PendingKey::Mining(task) => Some(task.control()),
            PendingKey::Ready(_) => None,
        }
    }

    /// Waits for the key, stores the identity and notifies the watcher.
    ///
    /// # Errors
    /// `DuplicateAddress` if the vault already holds the address (the key is
    /// discarded, nothing is retried), or any vault write error.
    #[instrument(skip(self), fields(name = %self.display_name))]
    pub async fn complete(self) -> Result<Creation> {
        let mined = match self.key {
            PendingKey::Ready(mined) => mined,
            PendingKey::Mining(task) => match task.outcome().await? {
                MiningOutcome::Found(mined) => mined,
                MiningOutcome::Cancelled { attempts } => {
                    info!(attempts, "Identity creation cancelled");
                    return Ok(Creation::Cancelled { attempts });
                }
            },
        };

        let identity = Identity::new(mined.address, mined.keypair, self.display_name, self.origin_node)?;
        self.vault.add(identity.clone()).await?;
        info!(address = %identity.address(), attempts = mined.attempts, "Identity created");

        if let Err(e) = self.notifier.observe(&identity).await {
            warn!(address = %identity.address(), error = %e, "Failed to notify watcher");
        }

        Ok(Creation::Created(identity))
    }
}
