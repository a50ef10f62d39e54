//! Hashing utilities with domain separation.
//!
//! Every SHAKE256 use in SIGIL is prefixed with a unique domain separator:
//!
//! ```text
//! output = SHAKE256(len(domain) || domain || input, output_length)
//! ```
//!
//! so the address payload and the address checksum can never collide even
//! when fed the same bytes.

use sha3::{Shake256, digest::{Update, ExtendableOutput, XofReader}};

/// Computes SHAKE256 hash with domain separation.
///
/// # Arguments
///
/// * `domain` - Domain separator bytes (unique per use case)
/// * `input` - Input data to hash
/// * `output_len` - Desired output length in bytes
pub fn shake256(domain: &[u8], input: &[u8], output_len: usize) -> Vec<u8> {
    let mut output = vec![0u8; output_len];
    shake256_into(domain, &[input], &mut output);
    output
}

/// Computes SHAKE256 over several input parts into a fixed-size array.
///
/// Parts are absorbed back to back without length framing; callers pass
/// fixed-width fields only.
pub fn shake256_array<const N: usize>(domain: &[u8], parts: &[&[u8]]) -> [u8; N] {
    let mut output = [0u8; N];
    shake256_into(domain, parts, &mut output);
    output
}

fn shake256_into(domain: &[u8], parts: &[&[u8]], output: &mut [u8]) {
    let mut hasher = Shake256::default();

    // Domain separation: prepend domain with length prefix
    hasher.update(&(domain.len() as u32).to_le_bytes());
    hasher.update(domain);

    for part in parts {
        hasher.update(part);
    }

    let mut reader = hasher.finalize_xof();
    reader.read(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::constants::{DOMAIN_ADDRESS_CHECKSUM, DOMAIN_ADDRESS_PAYLOAD};

    #[test]
    fn test_shake256_variable_output() {
        let short = shake256(b"domain", b"input", 16);
        let long = shake256(b"domain", b"input", 64);

        assert_eq!(short.len(), 16);
        assert_eq!(long.len(), 64);
        assert_eq!(&short[..], &long[..16]);
    }

    #[test]
    fn test_shake256_domain_separation() {
        let a = shake256(DOMAIN_ADDRESS_PAYLOAD, b"input", 32);
        let b = shake256(DOMAIN_ADDRESS_CHECKSUM, b"input", 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shake256_deterministic() {
        assert_eq!(shake256(b"d", b"x", 32), shake256(b"d", b"x", 32));
    }

    #[test]
    fn test_array_matches_concatenated_input() {
        let parts: [u8; 20] = shake256_array(b"domain", &[b"ab", b"cd"]);
        let whole = shake256(b"domain", b"abcd", 20);
        assert_eq!(&parts[..], &whole[..]);
    }
}
