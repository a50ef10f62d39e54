//! Common traits for SIGIL.
//!
//! These traits define the interfaces that different implementations can satisfy,
//! enabling modularity and testing.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Identity, SecretKey};

// ═══════════════════════════════════════════════════════════════════════════════
// VAULT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for identity storage.
///
/// The vault is the sole source of truth for which identities exist.
/// Implementations must guarantee that:
/// - no two entries share an encoded address
/// - `list` returns entries in insertion order
/// - a mutation is durable before it becomes visible to readers
/// - mutations on one store never interleave
#[async_trait]
pub trait IdentityVault: Send + Sync {
    /// Returns true if at least one identity is stored.
    async fn has_any(&self) -> Result<bool>;

    /// Returns all identities in storage order.
    async fn list(&self) -> Result<Vec<Identity>>;

    /// Stores a new identity.
    ///
    /// Fails with `DuplicateAddress` if the address is already present.
    async fn add(&self, identity: Identity) -> Result<()>;

    /// Looks up an identity by its encoded address.
    ///
    /// Fails with `NotFound` if absent.
    async fn find_by_address(&self, address: &str) -> Result<Identity>;

    /// Permanently removes an identity and its secret key.
    ///
    /// Fails with `NotFound` if absent. There is no way to undo this.
    async fn delete(&self, address: &str) -> Result<()>;

    /// Returns the secret key of a stored identity.
    ///
    /// Callers must not log the result or send it over untrusted channels.
    async fn export_private_key(&self, address: &str) -> Result<SecretKey> {
        let identity = self.find_by_address(address).await?;
        Ok(identity.keypair().secret.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WATCH NOTIFIER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Hand-off point to the component that watches the network for activity on
/// an address.
///
/// Called once after an identity has been durably added. Implementations
/// should return quickly; a failure is logged by the caller and does not undo
/// the vault mutation.
#[async_trait]
pub trait WatchNotifier: Send + Sync {
    /// Starts watching the given identity.
    async fn observe(&self, identity: &Identity) -> Result<()>;
}
