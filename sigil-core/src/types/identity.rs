//! Identity types for SIGIL.
//!
//! - [`OriginNode`]: The node an identity was created for
//! - [`Identity`]: Address + key pair + descriptive metadata, as stored in the vault

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Address, KeyPair};
use crate::constants::{NODE_BITCOIN_AUTHENTICATOR, NODE_LOCALHOST};
use crate::error::{Result, SigilError};

// ═══════════════════════════════════════════════════════════════════════════════
// ORIGIN NODE
// ═══════════════════════════════════════════════════════════════════════════════

/// The network node an identity is registered with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginNode {
    /// The public relay at `bitcoinauthenticator.org`
    #[default]
    #[serde(rename = "bitcoinauthenticator.org")]
    BitcoinAuthenticator,
    /// A node on this machine
    #[serde(rename = "localhost")]
    Localhost,
}

impl OriginNode {
    /// All known nodes, default first.
    pub const ALL: [OriginNode; 2] = [OriginNode::BitcoinAuthenticator, OriginNode::Localhost];

    /// Returns the host name of the node.
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginNode::BitcoinAuthenticator => NODE_BITCOIN_AUTHENTICATOR,
            OriginNode::Localhost => NODE_LOCALHOST,
        }
    }
}

impl FromStr for OriginNode {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|node| node.as_str() == normalized)
            .ok_or_else(|| SigilError::UnknownOriginNode(s.to_string()))
    }
}

impl std::fmt::Display for OriginNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// A minted identity.
///
/// The key pair is the only copy of the secret; deleting the identity from
/// the vault destroys it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    address: Address,
    keypair: KeyPair,
    display_name: String,
    origin_node: OriginNode,
    created_at: u64,
}

impl Identity {
    /// Creates a new identity stamped with the current time.
    ///
    /// # Errors
    /// Returns `InvalidDisplayName` if the name is empty after trimming.
    pub fn new(
        address: Address,
        keypair: KeyPair,
        display_name: impl Into<String>,
        origin_node: OriginNode,
    ) -> Result<Self> {
        Self::restore(
            address,
            keypair,
            display_name,
            origin_node,
            chrono::Utc::now().timestamp() as u64,
        )
    }

    /// Rebuilds an identity with a known creation time (used when loading).
    pub fn restore(
        address: Address,
        keypair: KeyPair,
        display_name: impl Into<String>,
        origin_node: OriginNode,
        created_at: u64,
    ) -> Result<Self> {
        let display_name = validate_display_name(display_name.into())?;
        Ok(Self {
            address,
            keypair,
            display_name,
            origin_node,
            created_at,
        })
    }

    /// Returns the address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the key pair.
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the origin node.
    pub fn origin_node(&self) -> OriginNode {
        self.origin_node
    }

    /// Returns the creation time (Unix seconds).
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Returns the prefix length the address was minted with.
    pub fn prefix_length(&self) -> u8 {
        self.address.prefix_length()
    }
}

/// Trims a display name and rejects it if nothing is left.
pub fn validate_display_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SigilError::InvalidDisplayName(
            "display name cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}
