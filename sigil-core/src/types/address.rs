//! Address type for SIGIL.
//!
//! An [`Address`] is the externally visible name of an identity. Building and
//! parsing addresses (hashing, checksums) is done by `sigil_crypto::codec`;
//! this type only holds the decoded fields and renders them.

use crate::constants::{ADDRESS_CHECKSUM_SIZE, ADDRESS_PAYLOAD_SIZE, ADDRESS_SIZE};

/// A decoded SIGIL address.
///
/// # Structure
/// - `version`: address layout version
/// - `prefix_length`: number of leading payload bits required to be zero
/// - `payload`: truncated hash of the compressed public key
/// - `checksum`: guards the three fields above against corruption
///
/// # Wire Format
/// ```text
/// version (1) || prefix_length (1) || payload (20) || checksum (4)
/// ```
/// The textual form is the Base58 encoding of those 26 bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    prefix_length: u8,
    payload: [u8; ADDRESS_PAYLOAD_SIZE],
    checksum: [u8; ADDRESS_CHECKSUM_SIZE],
    encoded: String,
}

impl Address {
    /// Assembles an address from its fields.
    ///
    /// The checksum is taken as given; use `sigil_crypto::codec::encode` to
    /// build addresses from a public key.
    pub fn from_parts(
        version: u8,
        prefix_length: u8,
        payload: [u8; ADDRESS_PAYLOAD_SIZE],
        checksum: [u8; ADDRESS_CHECKSUM_SIZE],
    ) -> Self {
        let mut bytes = Vec::with_capacity(ADDRESS_SIZE);
        bytes.push(version);
        bytes.push(prefix_length);
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&checksum);
        let encoded = bs58::encode(&bytes).into_string();

        Self {
            version,
            prefix_length,
            payload,
            checksum,
            encoded,
        }
    }

    /// Returns the version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the prefix length in bits.
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Returns the payload hash.
    pub fn payload(&self) -> &[u8; ADDRESS_PAYLOAD_SIZE] {
        &self.payload
    }

    /// Returns the checksum bytes.
    pub fn checksum(&self) -> &[u8; ADDRESS_CHECKSUM_SIZE] {
        &self.checksum
    }

    /// Returns the Base58 string form.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Serializes to the packed binary format.
    pub fn to_bytes(&self) -> [u8; ADDRESS_SIZE] {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[0] = self.version;
        bytes[1] = self.prefix_length;
        bytes[2..2 + ADDRESS_PAYLOAD_SIZE].copy_from_slice(&self.payload);
        bytes[2 + ADDRESS_PAYLOAD_SIZE..].copy_from_slice(&self.checksum);
        bytes
    }

    /// Counts the leading zero bits of the payload.
    pub fn leading_zero_bits(&self) -> u32 {
        let mut count = 0;
        for byte in self.payload.iter() {
            if *byte == 0 {
                count += 8;
            } else {
                count += byte.leading_zeros();
                break;
            }
        }
        count
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.encoded)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn payload_with(first: &[u8]) -> [u8; ADDRESS_PAYLOAD_SIZE] {
        let mut payload = [0xFFu8; ADDRESS_PAYLOAD_SIZE];
        payload[..first.len()].copy_from_slice(first);
        payload
    }

    #[test]
    fn test_to_bytes_layout() {
        let addr = Address::from_parts(1, 12, [0xAA; ADDRESS_PAYLOAD_SIZE], [1, 2, 3, 4]);
        let bytes = addr.to_bytes();

        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 12);
        assert_eq!(&bytes[2..22], &[0xAA; ADDRESS_PAYLOAD_SIZE]);
        assert_eq!(&bytes[22..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_encoded_is_base58_of_bytes() {
        let addr = Address::from_parts(1, 0, [0x42; ADDRESS_PAYLOAD_SIZE], [9, 9, 9, 9]);
        let decoded = bs58::decode(addr.encoded()).into_vec().unwrap();
        assert_eq!(decoded, addr.to_bytes().to_vec());
        assert_eq!(addr.to_string(), addr.encoded());
    }

    #[test_case(&[0x80], 0 ; "top bit set")]
    #[test_case(&[0x0F], 4 ; "one zero nibble")]
    #[test_case(&[0x00, 0x01], 15 ; "fifteen bits")]
    #[test_case(&[0x00, 0x00, 0x40], 17 ; "seventeen bits")]
    fn test_leading_zero_bits(first: &[u8], expected: u32) {
        let addr = Address::from_parts(1, 0, payload_with(first), [0; ADDRESS_CHECKSUM_SIZE]);
        assert_eq!(addr.leading_zero_bits(), expected);
    }

    #[test]
    fn test_leading_zero_bits_all_zero() {
        let addr = Address::from_parts(1, 0, [0; ADDRESS_PAYLOAD_SIZE], [0; ADDRESS_CHECKSUM_SIZE]);
        assert_eq!(addr.leading_zero_bits(), (ADDRESS_PAYLOAD_SIZE * 8) as u32);
    }
}
