//! In-memory identity vault.
//!
//! Nothing survives the process. Suitable for tests and for callers that
//! only need a scratch identity.

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use sigil_core::error::{Result, SigilError};
use sigil_core::traits::IdentityVault;
use sigil_core::types::Identity;

use crate::record::verify_identity;

/// In-memory identity vault.
///
/// Readers see an ordered snapshot behind a `RwLock`. Mutations build the
/// next snapshot under an async mutex and swap it in whole, which is the
/// same protocol [`FileVault`](crate::FileVault) uses with a disk write
/// between the two steps.
#[derive(Debug, Default)]
pub struct MemoryVault {
    /// Identities in insertion order
    entries: RwLock<Vec<Identity>>,
    /// Serializes mutations
    mutation: Mutex<()>,
}

impl MemoryVault {
    /// Creates an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of identities.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the vault is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of all identities in order.
    pub fn snapshot(&self) -> Vec<Identity> {
        self.entries.read().clone()
    }

    /// Replaces the contents with the given identities.
    ///
    /// Waits for in-flight mutations and blocks new ones until done.
    ///
    /// # Errors
    /// Returns `DuplicateAddress` if two identities share an address; the
    /// vault is left unchanged.
    pub(crate) async fn import(&self, identities: Vec<Identity>) -> Result<usize> {
        let _guard = self.lock_mutations().await;
        let mut staged = Vec::with_capacity(identities.len());
        for identity in identities {
            staged = with_added(&staged, identity)?;
        }
        let count = staged.len();
        self.replace(staged);
        Ok(count)
    }

    /// Acquires the mutation lock.
    pub(crate) async fn lock_mutations(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.mutation.lock().await
    }

    /// Builds the snapshot that would result from adding `identity`.
    ///
    /// Fails with `IdentityKeyMismatch` if the key pair does not derive the
    /// address, so nothing unloadable is ever staged.
    pub(crate) fn staged_add(&self, identity: Identity) -> Result<Vec<Identity>> {
        verify_identity(&identity)?;
        with_added(&self.entries.read(), identity)
    }

    /// Builds the snapshot that would result from deleting `address`.
    pub(crate) fn staged_delete(&self, address: &str) -> Result<Vec<Identity>> {
        let entries = self.entries.read();
        let address = address.trim();
        let position = entries
            .iter()
            .position(|identity| identity.address().encoded() == address)
            .ok_or_else(|| SigilError::NotFound(address.to_string()))?;

        let mut next = entries.clone();
        next.remove(position);
        Ok(next)
    }

    /// Publishes a new snapshot.
    pub(crate) fn replace(&self, next: Vec<Identity>) {
        *self.entries.write() = next;
    }

    fn find(&self, address: &str) -> Option<Identity> {
        let address = address.trim();
        self.entries
            .read()
            .iter()
            .find(|identity| identity.address().encoded() == address)
            .cloned()
    }
}

fn with_added(current: &[Identity], identity: Identity) -> Result<Vec<Identity>> {
    let encoded = identity.address().encoded();
    if current.iter().any(|existing| existing.address().encoded() == encoded) {
        return Err(SigilError::DuplicateAddress(encoded.to_string()));
    }

    let mut next = Vec::with_capacity(current.len() + 1);
    next.extend_from_slice(current);
    next.push(identity);
    Ok(next)
}

#[async_trait]
impl IdentityVault for MemoryVault {
    async fn has_any(&self) -> Result<bool> {
        Ok(!self.is_empty())
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.snapshot())
    }

    #[instrument(skip(self, identity), fields(address = %identity.address()))]
    async fn add(&self, identity: Identity) -> Result<()> {
        let _guard = self.lock_mutations().await;
        let next = self.staged_add(identity)?;
        self.replace(next);
        debug!("Identity added");
        Ok(())
    }

    async fn find_by_address(&self, address: &str) -> Result<Identity> {
        self.find(address)
            .ok_or_else(|| SigilError::NotFound(address.trim().to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, address: &str) -> Result<()> {
        let _guard = self.lock_mutations().await;
        let next = self.staged_delete(address)?;
        self.replace(next);
        debug!("Identity deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{make_identity, make_mismatched_identity};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_vault() {
        let vault = MemoryVault::new();
        assert!(!vault.has_any().await.unwrap());
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_find() {
        let vault = MemoryVault::new();
        let identity = make_identity(1, "alice");
        let address = identity.address().encoded().to_string();

        vault.add(identity.clone()).await.unwrap();

        assert!(vault.has_any().await.unwrap());
        assert_eq!(vault.find_by_address(&address).await.unwrap(), identity);
        assert_eq!(
            vault.find_by_address(&format!(" {} ", address)).await.unwrap(),
            identity
        );
    }

    #[tokio::test]
    async fn test_duplicate_leaves_one_entry() {
        let vault = MemoryVault::new();
        let identity = make_identity(2, "bob");

        vault.add(identity.clone()).await.unwrap();
        let result = vault.add(identity.clone()).await;

        assert!(matches!(result, Err(SigilError::DuplicateAddress(_))));
        assert_eq!(vault.len(), 1);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let vault = MemoryVault::new();
        let identities: Vec<_> = (10..15).map(|seed| make_identity(seed, "n")).collect();
        for identity in &identities {
            vault.add(identity.clone()).await.unwrap();
        }
        assert_eq!(vault.list().await.unwrap(), identities);
    }

    #[tokio::test]
    async fn test_delete_then_find_not_found() {
        let vault = MemoryVault::new();
        let identity = make_identity(3, "carol");
        let address = identity.address().encoded().to_string();

        vault.add(identity).await.unwrap();
        vault.delete(&address).await.unwrap();

        assert!(matches!(
            vault.find_by_address(&address).await,
            Err(SigilError::NotFound(_))
        ));
        assert!(matches!(vault.delete(&address).await, Err(SigilError::NotFound(_))));
        assert!(!vault.has_any().await.unwrap());
    }

    #[tokio::test]
    async fn test_export_private_key() {
        let vault = MemoryVault::new();
        let identity = make_identity(4, "dave");
        let address = identity.address().encoded().to_string();
        vault.add(identity.clone()).await.unwrap();

        let secret = vault.export_private_key(&address).await.unwrap();
        assert_eq!(secret, identity.keypair().secret);
    }

    #[tokio::test]
    async fn test_mismatched_identity_rejected() {
        let vault = MemoryVault::new();
        let result = vault.add(make_mismatched_identity(20, 21)).await;

        assert!(matches!(result, Err(SigilError::IdentityKeyMismatch(_))));
        assert!(vault.is_empty());
    }

    #[tokio::test]
    async fn test_import_waits_for_mutation_lock() {
        let vault = Arc::new(MemoryVault::new());
        let identity = make_identity(22, "imported");

        let guard = vault.lock_mutations().await;
        let import = {
            let vault = vault.clone();
            let identity = identity.clone();
            tokio::spawn(async move { vault.import(vec![identity]).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(vault.is_empty());

        drop(guard);
        assert_eq!(import.await.unwrap().unwrap(), 1);
        assert_eq!(vault.snapshot(), vec![identity]);
    }

    #[tokio::test]
    async fn test_import_rejects_duplicates_without_change() {
        let vault = MemoryVault::new();
        vault.add(make_identity(5, "existing")).await.unwrap();

        let dup = make_identity(6, "dup");
        let result = vault.import(vec![dup.clone(), dup]).await;

        assert!(matches!(result, Err(SigilError::DuplicateAddress(_))));
        assert_eq!(vault.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_same_identity() {
        let vault = Arc::new(MemoryVault::new());
        let identity = make_identity(7, "race");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let vault = vault.clone();
            let identity = identity.clone();
            handles.push(tokio::spawn(async move { vault.add(identity).await }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(vault.len(), 1);
    }
}
