//! # SIGIL Vault
//!
//! Identity storage for SIGIL.
//!
//! This crate provides two storage backends:
//!
//! - **Memory**: In-process storage for tests and throwaway sessions
//! - **File**: Durable single-file storage with atomic replace
//!
//! Both keep entries in insertion order, reject duplicate addresses and make
//! a mutation visible only after it has been persisted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sigil_vault::{FileVault, Vault};
//!
//! let vault = FileVault::open("~/.sigil/vault.bin").await?;
//! vault.add(identity).await?;
//!
//! for identity in vault.list().await? {
//!     println!("{} {}", identity.display_name(), identity.address());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;
mod record;

pub use file::FileVault;
pub use memory::MemoryVault;
pub use record::{verify_identity, IdentityRecord};

// Re-export the trait from core
pub use sigil_core::traits::IdentityVault as Vault;

#[cfg(test)]
pub(crate) mod test_util {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use sigil_core::types::{Identity, KeyPair, OriginNode};
    use sigil_crypto::{mine_with_rng, MiningControl};

    /// Builds a reproducible identity with prefix length 0.
    pub fn make_identity(seed: u64, name: &str) -> Identity {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mined = mine_with_rng(&mut rng, 0, &MiningControl::new())
            .unwrap()
            .found()
            .unwrap();
        Identity::new(mined.address, mined.keypair, name, OriginNode::default()).unwrap()
    }

    /// Builds an identity carrying the address of `address_seed` but the key
    /// pair of `key_seed`.
    pub fn make_mismatched_identity(address_seed: u64, key_seed: u64) -> Identity {
        let owner = make_identity(address_seed, "owner");
        let other = make_identity(key_seed, "other");
        Identity::new(
            owner.address().clone(),
            KeyPair::new(other.keypair().public, other.keypair().secret.clone()),
            "mismatched",
            OriginNode::default(),
        )
        .unwrap()
    }
}
