//! On-disk representation of an identity.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use sigil_core::error::{Result, SigilError};
use sigil_core::types::{Identity, OriginNode};
use sigil_crypto::{decode, encode, keypair_from_secret, parse_private_key_hex};

/// A serialized vault entry.
///
/// Only the secret is authoritative; the public key is not stored and the
/// address is re-derived and compared on load.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct IdentityRecord {
    /// Encoded address
    pub address: String,
    /// Hex-encoded secret scalar
    pub private_key: String,
    /// Display name
    pub name: String,
    /// Prefix length the address was minted with (bits)
    pub prefix_length: u8,
    /// Origin node
    #[zeroize(skip)]
    pub node: OriginNode,
    /// Creation time (Unix seconds)
    pub created_at: u64,
}

impl IdentityRecord {
    /// Captures an identity for storage.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            address: identity.address().encoded().to_string(),
            private_key: identity.keypair().secret.to_hex(),
            name: identity.display_name().to_string(),
            prefix_length: identity.prefix_length(),
            node: identity.origin_node(),
            created_at: identity.created_at(),
        }
    }

    /// Rebuilds the identity, checking the record against its own secret.
    ///
    /// # Errors
    /// Returns `VaultCorrupted` if the secret is unusable or the stored
    /// address is not the one the secret derives.
    pub fn to_identity(&self) -> Result<Identity> {
        let corrupted = |reason: String| {
            SigilError::VaultCorrupted(format!("record {}: {}", self.address, reason))
        };

        let stored = decode(&self.address).map_err(|e| corrupted(e.to_string()))?;
        if stored.prefix_length() != self.prefix_length {
            return Err(corrupted("prefix length disagrees with address".into()));
        }

        let secret = parse_private_key_hex(&self.private_key).map_err(|e| corrupted(e.to_string()))?;
        let keypair = keypair_from_secret(&secret).map_err(|e| corrupted(e.to_string()))?;
        let derived = encode(&keypair.public, self.prefix_length).map_err(|e| corrupted(e.to_string()))?;

        if derived != stored {
            return Err(corrupted("address does not match private key".into()));
        }

        Identity::restore(derived, keypair, self.name.clone(), self.node, self.created_at)
            .map_err(|e| corrupted(e.to_string()))
    }
}

/// Checks that an identity's key pair derives its address.
///
/// # Errors
/// Returns `IdentityKeyMismatch` if the public key or the address is not the
/// one the secret derives, or `InvalidPrivateKeyValue` for an unusable scalar.
pub fn verify_identity(identity: &Identity) -> Result<()> {
    let keypair = keypair_from_secret(&identity.keypair().secret)?;
    let derived = encode(&keypair.public, identity.prefix_length())?;

    if keypair.public != identity.keypair().public || &derived != identity.address() {
        return Err(SigilError::IdentityKeyMismatch(
            identity.address().encoded().to_string(),
        ));
    }
    Ok(())
}

impl std::fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("prefix_length", &self.prefix_length)
            .field("node", &self.node)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
