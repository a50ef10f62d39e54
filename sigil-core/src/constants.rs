//! Protocol constants for SIGIL.
//!
//! Address layout, prefix bounds and the domain separators that keep every
//! SHAKE256 use in the protocol apart.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a secp256k1 secret scalar in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of a SEC1 compressed secp256k1 public point in bytes.
pub const PUBLIC_KEY_SIZE: usize = 33;

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Current address version byte.
/// Increment when making breaking changes to the address layout.
pub const ADDRESS_VERSION: u8 = 1;

/// Size of the address payload (truncated hash of the public point).
pub const ADDRESS_PAYLOAD_SIZE: usize = 20;

/// Size of the address checksum.
pub const ADDRESS_CHECKSUM_SIZE: usize = 4;

/// Size of a packed address.
/// version (1) + prefix_length (1) + payload (20) + checksum (4) = 26 bytes
pub const ADDRESS_SIZE: usize = 1 + 1 + ADDRESS_PAYLOAD_SIZE + ADDRESS_CHECKSUM_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// PREFIX POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Smallest accepted prefix length (no constraint).
pub const MIN_PREFIX_LENGTH: u8 = 0;

/// Largest accepted prefix length, in bits of the payload.
///
/// Mining needs about `2^prefix_length` key generations on average.
pub const MAX_PREFIX_LENGTH: u8 = 20;

/// Prefix length used when the caller does not pick one.
pub const DEFAULT_PREFIX_LENGTH: u8 = 8;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN SEPARATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain separator for the address payload hash.
pub const DOMAIN_ADDRESS_PAYLOAD: &[u8] = b"SIGIL_ADDRESS_PAYLOAD_V1";

/// Domain separator for the address checksum.
pub const DOMAIN_ADDRESS_CHECKSUM: &[u8] = b"SIGIL_ADDRESS_CHECKSUM_V1";

// ═══════════════════════════════════════════════════════════════════════════════
// ORIGIN NODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Host name of the public relay node.
pub const NODE_BITCOIN_AUTHENTICATOR: &str = "bitcoinauthenticator.org";

/// Host name of a node running on this machine.
pub const NODE_LOCALHOST: &str = "localhost";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_size() {
        assert_eq!(ADDRESS_SIZE, 26);
    }

    #[test]
    fn test_prefix_bounds() {
        assert!(MIN_PREFIX_LENGTH <= DEFAULT_PREFIX_LENGTH);
        assert!(DEFAULT_PREFIX_LENGTH <= MAX_PREFIX_LENGTH);
        // The prefix is read from the payload, so it can never exceed it
        assert!((MAX_PREFIX_LENGTH as usize) <= ADDRESS_PAYLOAD_SIZE * 8);
    }

    #[test]
    fn test_domain_separators_unique() {
        assert_ne!(DOMAIN_ADDRESS_PAYLOAD, DOMAIN_ADDRESS_CHECKSUM);
    }
}
