//! Address encoding and decoding.
//!
//! ## Derivation
//!
//! ```text
//! payload  = SHAKE256(DOMAIN_ADDRESS_PAYLOAD  || compressed_pk, 20)
//! checksum = SHAKE256(DOMAIN_ADDRESS_CHECKSUM || version || prefix_length || payload, 4)
//! address  = base58(version || prefix_length || payload || checksum)
//! ```
//!
//! ## Prefix rule
//!
//! An address satisfies its prefix when the first `prefix_length` bits of
//! the payload are zero. The miner, import validation and decoding all use
//! [`matches_prefix`], so a mined address keeps matching after a round trip
//! through its string form.

use subtle::ConstantTimeEq;

use sigil_core::constants::{
    ADDRESS_CHECKSUM_SIZE, ADDRESS_PAYLOAD_SIZE, ADDRESS_SIZE, ADDRESS_VERSION,
    DOMAIN_ADDRESS_CHECKSUM, DOMAIN_ADDRESS_PAYLOAD, MAX_PREFIX_LENGTH, MIN_PREFIX_LENGTH,
};
use sigil_core::error::{Result, SigilError};
use sigil_core::types::{Address, PublicKey};

use crate::hash::shake256_array;

/// Checks that a prefix length is within the supported range.
pub fn check_prefix_length(prefix_length: u8) -> Result<()> {
    if !(MIN_PREFIX_LENGTH..=MAX_PREFIX_LENGTH).contains(&prefix_length) {
        return Err(SigilError::InvalidPrefixLength {
            length: prefix_length,
            max: MAX_PREFIX_LENGTH,
        });
    }
    Ok(())
}

/// Hashes a public key into the address payload.
pub fn address_payload(public: &PublicKey) -> [u8; ADDRESS_PAYLOAD_SIZE] {
    shake256_array(DOMAIN_ADDRESS_PAYLOAD, &[public.as_bytes()])
}

/// Computes the checksum over the version, prefix length and payload.
pub fn address_checksum(
    version: u8,
    prefix_length: u8,
    payload: &[u8; ADDRESS_PAYLOAD_SIZE],
) -> [u8; ADDRESS_CHECKSUM_SIZE] {
    shake256_array(
        DOMAIN_ADDRESS_CHECKSUM,
        &[&[version, prefix_length][..], &payload[..]],
    )
}

/// Derives the address of a public key for the given prefix length.
///
/// The result is not required to satisfy its prefix; use [`matches_prefix`].
///
/// # Errors
/// Returns `InvalidPrefixLength` if the prefix length is out of range.
pub fn encode(public: &PublicKey, prefix_length: u8) -> Result<Address> {
    check_prefix_length(prefix_length)?;

    let payload = address_payload(public);
    let checksum = address_checksum(ADDRESS_VERSION, prefix_length, &payload);

    Ok(Address::from_parts(ADDRESS_VERSION, prefix_length, payload, checksum))
}

/// Parses an address from its Base58 string form.
///
/// # Errors
/// - `MalformedAddress` for invalid characters, wrong length, an unsupported
///   version or an out-of-range prefix length
/// - `CorruptAddress` if the checksum does not match
pub fn decode(encoded: &str) -> Result<Address> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(SigilError::MalformedAddress("empty address".into()));
    }

    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| SigilError::MalformedAddress(e.to_string()))?;

    decode_bytes(&bytes)
}

/// Parses an address from its packed binary form.
///
/// Same checks as [`decode`]. The checksum is verified before the version and
/// prefix fields are interpreted, so any corrupted field reports
/// `CorruptAddress`.
pub fn decode_bytes(bytes: &[u8]) -> Result<Address> {
    if bytes.len() != ADDRESS_SIZE {
        return Err(SigilError::MalformedAddress(format!(
            "expected {} bytes, got {}",
            ADDRESS_SIZE,
            bytes.len()
        )));
    }

    let version = bytes[0];
    let prefix_length = bytes[1];
    let mut payload = [0u8; ADDRESS_PAYLOAD_SIZE];
    payload.copy_from_slice(&bytes[2..2 + ADDRESS_PAYLOAD_SIZE]);
    let mut checksum = [0u8; ADDRESS_CHECKSUM_SIZE];
    checksum.copy_from_slice(&bytes[2 + ADDRESS_PAYLOAD_SIZE..]);

    let expected = address_checksum(version, prefix_length, &payload);
    if !bool::from(expected[..].ct_eq(&checksum[..])) {
        return Err(SigilError::CorruptAddress);
    }

    if version != ADDRESS_VERSION {
        return Err(SigilError::MalformedAddress(format!(
            "unsupported version {}",
            version
        )));
    }

    check_prefix_length(prefix_length)
        .map_err(|e| SigilError::MalformedAddress(e.to_string()))?;

    Ok(Address::from_parts(version, prefix_length, payload, checksum))
}

/// Returns true if the leading `prefix_length` bits of the payload are zero.
pub fn matches_prefix(address: &Address) -> bool {
    u32::from(address.prefix_length()) <= address.leading_zero_bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::{generate_keypair, generate_keypair_with};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use test_case::test_case;

    fn sample_public(seed: u64) -> PublicKey {
        generate_keypair_with(&mut ChaCha20Rng::seed_from_u64(seed)).public
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let public = sample_public(1);
        for prefix_length in [0, 1, 7, 8, 13, MAX_PREFIX_LENGTH] {
            let address = encode(&public, prefix_length).unwrap();
            let decoded = decode(address.encoded()).unwrap();

            assert_eq!(decoded.payload(), &address_payload(&public));
            assert_eq!(decoded.prefix_length(), prefix_length);
            assert_eq!(decoded, address);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let public = sample_public(2);
        assert_eq!(encode(&public, 5).unwrap(), encode(&public, 5).unwrap());
    }

    #[test]
    fn test_prefix_length_changes_address() {
        let public = sample_public(3);
        let a = encode(&public, 0).unwrap();
        let b = encode(&public, 1).unwrap();
        assert_eq!(a.payload(), b.payload());
        assert_ne!(a.encoded(), b.encoded());
    }

    #[test]
    fn test_encode_rejects_prefix_out_of_range() {
        let public = sample_public(4);
        let result = encode(&public, MAX_PREFIX_LENGTH + 1);
        assert!(matches!(
            result,
            Err(SigilError::InvalidPrefixLength { length, .. }) if length == MAX_PREFIX_LENGTH + 1
        ));
    }

    #[test]
    fn test_single_bit_flip_is_corrupt() {
        let address = encode(&sample_public(5), 6).unwrap();
        let original = address.to_bytes();

        // Every bit of version, prefix length and payload
        for byte in 0..2 + ADDRESS_PAYLOAD_SIZE {
            for bit in 0..8 {
                let mut bytes = original;
                bytes[byte] ^= 1 << bit;
                let flipped = bs58::encode(bytes).into_string();
                assert!(
                    matches!(decode(&flipped), Err(SigilError::CorruptAddress)),
                    "flip of byte {} bit {} was not detected",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_checksum_flip_is_corrupt() {
        let mut bytes = encode(&sample_public(6), 0).unwrap().to_bytes();
        bytes[ADDRESS_SIZE - 1] ^= 0x01;
        assert!(matches!(decode_bytes(&bytes), Err(SigilError::CorruptAddress)));
    }

    #[test_case("" ; "empty")]
    #[test_case("0OIl" ; "characters outside the alphabet")]
    #[test_case("3mJr7AoUXx2Wqd" ; "too short")]
    fn test_decode_malformed(input: &str) {
        assert!(matches!(decode(input), Err(SigilError::MalformedAddress(_))));
    }

    #[test]
    fn test_decode_wrong_length() {
        let mut bytes = encode(&sample_public(7), 0).unwrap().to_bytes().to_vec();
        bytes.push(0);
        let encoded = bs58::encode(bytes).into_string();
        assert!(matches!(decode(&encoded), Err(SigilError::MalformedAddress(_))));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let payload = [0x10u8; ADDRESS_PAYLOAD_SIZE];
        let checksum = address_checksum(ADDRESS_VERSION + 1, 0, &payload);
        let address = Address::from_parts(ADDRESS_VERSION + 1, 0, payload, checksum);

        assert!(matches!(
            decode(address.encoded()),
            Err(SigilError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_decode_out_of_range_prefix_with_valid_checksum() {
        let payload = [0u8; ADDRESS_PAYLOAD_SIZE];
        let prefix = MAX_PREFIX_LENGTH + 1;
        let checksum = address_checksum(ADDRESS_VERSION, prefix, &payload);
        let address = Address::from_parts(ADDRESS_VERSION, prefix, payload, checksum);

        assert!(matches!(
            decode(address.encoded()),
            Err(SigilError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let address = encode(&sample_public(8), 2).unwrap();
        let padded = format!("  {}\n", address.encoded());
        assert_eq!(decode(&padded).unwrap(), address);
    }

    #[test]
    fn test_matches_prefix_zero_always_true() {
        for _ in 0..16 {
            let address = encode(&generate_keypair().public, 0).unwrap();
            assert!(matches_prefix(&address));
        }
    }

    #[test]
    fn test_matches_prefix_uses_payload_bits() {
        let address = encode(&sample_public(9), 0).unwrap();
        let zeros = address.leading_zero_bits();

        let exact = encode(&sample_public(9), zeros.min(MAX_PREFIX_LENGTH as u32) as u8).unwrap();
        assert!(matches_prefix(&exact));

        if zeros < MAX_PREFIX_LENGTH as u32 {
            let too_long = encode(&sample_public(9), zeros as u8 + 1).unwrap();
            assert!(!matches_prefix(&too_long));
        }
    }

    #[test]
    fn test_matches_prefix_survives_roundtrip() {
        let public = sample_public(10);
        let address = encode(&public, 0).unwrap();
        let decoded = decode(address.encoded()).unwrap();
        assert_eq!(matches_prefix(&address), matches_prefix(&decoded));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_any_key(seed in any::<u64>(), prefix_length in 0u8..=MAX_PREFIX_LENGTH) {
            let public = sample_public(seed);
            let address = encode(&public, prefix_length).unwrap();
            let decoded = decode(address.encoded()).unwrap();

            prop_assert_eq!(decoded.payload(), &address_payload(&public));
            prop_assert_eq!(decoded.prefix_length(), prefix_length);
            prop_assert_eq!(matches_prefix(&decoded), matches_prefix(&address));
        }

        #[test]
        fn prop_decode_never_panics(input in "[1-9A-HJ-NP-Za-km-z]{0,48}") {
            let _ = decode(&input);
        }
    }
}
