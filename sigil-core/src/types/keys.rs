//! Key types for SIGIL.
//!
//! This module defines the byte-level key structures used by identities:
//!
//! - [`PublicKey`]: SEC1 compressed secp256k1 point (33 bytes)
//! - [`SecretKey`]: secp256k1 scalar (32 bytes, zeroized on drop)
//! - [`KeyPair`]: Combined public + secret key
//!
//! Curve arithmetic lives in `sigil-crypto`; these types only carry bytes.
//! Build key pairs through `sigil_crypto::keypair` so the public point always
//! matches the scalar.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use crate::error::{Result, SigilError};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKey {
    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    /// Returns error if bytes length doesn't match `PUBLIC_KEY_SIZE`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            SigilError::InternalError(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: arr })
    }

    /// Creates a public key from a fixed-size array.
    pub fn from_array(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the public key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the hex-encoded public key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECRET KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// secp256k1 secret scalar, big-endian.
///
/// This key is sensitive and will be automatically zeroized when dropped.
/// Never expose this key in logs or error messages.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; SECRET_KEY_SIZE],
}

impl SecretKey {
    /// Creates a secret key from a fixed-size array.
    ///
    /// No range check happens here; `sigil_crypto::keypair_from_secret`
    /// rejects scalars outside `[1, n-1]`.
    pub fn from_array(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the secret key.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the secret key as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the hex-encoded secret key (64 characters).
    ///
    /// # Security
    /// The returned string is not zeroized; drop it as soon as possible.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for SecretKey {}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose secret key content
        write!(f, "SecretKey([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 key pair (public + secret).
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    /// Public key (safe to share)
    #[zeroize(skip)]
    pub public: PublicKey,
    /// Secret key (keep private, auto-zeroized)
    pub secret: SecretKey,
}

impl KeyPair {
    /// Creates a new key pair from public and secret keys.
    pub fn new(public: PublicKey, secret: SecretKey) -> Self {
        Self { public, secret }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
