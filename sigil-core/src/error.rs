//! Error types for SIGIL.
//!
//! Every failure the core can produce is a variant of [`SigilError`]. They are
//! returned to the caller, which decides how to present them; the core never
//! prints them.

use thiserror::Error;

/// Result type alias using `SigilError`.
pub type Result<T> = std::result::Result<T, SigilError>;

/// Main error type for all SIGIL operations.
#[derive(Debug, Error)]
pub enum SigilError {
    // ═══════════════════════════════════════════════════════════════════════════
    // PREFIX & KEY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Requested prefix length is outside the supported range.
    #[error("Invalid prefix length {length}: must be between 0 and {max}")]
    InvalidPrefixLength { length: u8, max: u8 },

    /// Imported private key is not valid hex or has the wrong length.
    #[error("Invalid private key encoding: {0}")]
    InvalidPrivateKeyEncoding(String),

    /// Imported private key is zero or not below the curve order.
    #[error("Invalid private key: scalar is out of range for secp256k1")]
    InvalidPrivateKeyValue,

    /// Imported key derives an address that does not satisfy the prefix.
    #[error("Key derives address {address}, which does not satisfy prefix length {prefix_length}")]
    KeyDoesNotMatchPrefix { address: String, prefix_length: u8 },

    // ═══════════════════════════════════════════════════════════════════════════
    // ADDRESS ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Address is structurally invalid (encoding, length, version).
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    /// Address checksum does not match its contents.
    #[error("Corrupt address: checksum mismatch")]
    CorruptAddress,

    // ═══════════════════════════════════════════════════════════════════════════
    // IDENTITY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Display name is empty.
    #[error("Invalid display name: {0}")]
    InvalidDisplayName(String),

    /// Identity's key pair does not derive its address.
    #[error("Identity {0} does not match its key pair")]
    IdentityKeyMismatch(String),

    /// Origin node is not one of the known nodes.
    #[error("Unknown origin node: {0}")]
    UnknownOriginNode(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VAULT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// An identity with this address is already stored.
    #[error("Duplicate address: {0}")]
    DuplicateAddress(String),

    /// No identity with this address is stored.
    #[error("Address not found: {0}")]
    NotFound(String),

    /// Vault file is truncated, inconsistent or tampered with.
    #[error("Vault corrupted: {0}")]
    VaultCorrupted(String),

    /// Vault file format version mismatch.
    #[error("Vault format version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    // ═══════════════════════════════════════════════════════════════════════════
    // NOTIFICATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The watch notifier could not accept the identity.
    #[error("Watch notification failed: {0}")]
    NotificationFailed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION & STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SigilError {
    /// Returns true if this error concerns an imported key or prefix request.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            SigilError::InvalidPrefixLength { .. }
                | SigilError::InvalidPrivateKeyEncoding(_)
                | SigilError::InvalidPrivateKeyValue
                | SigilError::KeyDoesNotMatchPrefix { .. }
                | SigilError::IdentityKeyMismatch(_)
        )
    }

    /// Returns true if this error comes from decoding an address.
    pub fn is_address_error(&self) -> bool {
        matches!(
            self,
            SigilError::MalformedAddress(_) | SigilError::CorruptAddress
        )
    }

    /// Returns true if this error comes from the vault.
    pub fn is_vault_error(&self) -> bool {
        matches!(
            self,
            SigilError::DuplicateAddress(_)
                | SigilError::NotFound(_)
                | SigilError::VaultCorrupted(_)
                | SigilError::VersionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SigilError::InvalidPrefixLength { length: 42, max: 20 };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_error_classification() {
        assert!(SigilError::InvalidPrivateKeyValue.is_key_error());
        assert!(SigilError::IdentityKeyMismatch("x".into()).is_key_error());
        assert!(SigilError::CorruptAddress.is_address_error());
        assert!(SigilError::NotFound("x".into()).is_vault_error());

        assert!(!SigilError::CorruptAddress.is_key_error());
        assert!(!SigilError::DuplicateAddress("x".into()).is_address_error());
        assert!(!SigilError::InvalidPrivateKeyValue.is_vault_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let sigil_result: Result<serde_json::Value> = json_result.map_err(SigilError::from);
        assert!(matches!(sigil_result, Err(SigilError::JsonError(_))));
    }
}
