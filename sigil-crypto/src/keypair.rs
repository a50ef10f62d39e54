//! secp256k1 key pairs.
//!
//! Wraps `k256` so the rest of SIGIL only handles the byte-level types from
//! `sigil-core`. Every [`KeyPair`] built here has a public point derived from
//! its scalar; nothing else in the workspace constructs one from parts.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use sigil_core::constants::{PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use sigil_core::error::{Result, SigilError};
use sigil_core::types::{KeyPair, PublicKey, SecretKey};

/// Generates a fresh key pair from the thread-local CSPRNG.
pub fn generate_keypair() -> KeyPair {
    generate_keypair_with(&mut rand::thread_rng())
}

/// Generates a key pair from the given random source.
///
/// Pass a seeded generator to get reproducible keys in tests.
pub fn generate_keypair_with<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    let secret = k256::SecretKey::random(rng);
    to_keypair(&secret)
}

/// Reconstructs a key pair from a raw 32-byte scalar.
///
/// # Errors
/// Returns `InvalidPrivateKeyValue` if the scalar is zero or not below the
/// curve order.
pub fn keypair_from_secret(secret: &SecretKey) -> Result<KeyPair> {
    let inner = k256::SecretKey::from_slice(secret.as_bytes())
        .map_err(|_| SigilError::InvalidPrivateKeyValue)?;
    Ok(to_keypair(&inner))
}

/// Parses a hex-encoded private key into a 32-byte secret.
///
/// Accepts an optional `0x` prefix and surrounding whitespace. Big-integer
/// style encodings are normalized: a 33-byte value with a leading zero sign
/// byte is trimmed, and values shorter than 32 bytes are left-padded.
///
/// # Errors
/// Returns `InvalidPrivateKeyEncoding` for empty input, non-hex characters,
/// odd length, or more than 32 significant bytes. Range is not checked here.
pub fn parse_private_key_hex(input: &str) -> Result<SecretKey> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(SigilError::InvalidPrivateKeyEncoding("empty key".into()));
    }

    let bytes = Zeroizing::new(
        hex::decode(digits).map_err(|e| SigilError::InvalidPrivateKeyEncoding(e.to_string()))?,
    );

    let significant: &[u8] = match bytes.len() {
        n if n == SECRET_KEY_SIZE + 1 && bytes[0] == 0 => &bytes[1..],
        n if n <= SECRET_KEY_SIZE => &bytes[..],
        n => {
            return Err(SigilError::InvalidPrivateKeyEncoding(format!(
                "expected at most {} bytes, got {}",
                SECRET_KEY_SIZE, n
            )))
        }
    };

    let mut arr = [0u8; SECRET_KEY_SIZE];
    arr[SECRET_KEY_SIZE - significant.len()..].copy_from_slice(significant);
    let secret = SecretKey::from_array(arr);
    zeroize::Zeroize::zeroize(&mut arr);
    Ok(secret)
}

/// Converts a raw byte slice into a secret, requiring exactly 32 bytes.
pub fn secret_from_bytes(bytes: &[u8]) -> Result<SecretKey> {
    let arr: [u8; SECRET_KEY_SIZE] = bytes.try_into().map_err(|_| {
        SigilError::InvalidPrivateKeyEncoding(format!(
            "expected {} bytes, got {}",
            SECRET_KEY_SIZE,
            bytes.len()
        ))
    })?;
    Ok(SecretKey::from_array(arr))
}

fn to_keypair(secret: &k256::SecretKey) -> KeyPair {
    let point = secret.public_key().to_encoded_point(true);
    let mut public = [0u8; PUBLIC_KEY_SIZE];
    public.copy_from_slice(point.as_bytes());

    let mut scalar = [0u8; SECRET_KEY_SIZE];
    scalar.copy_from_slice(&secret.to_bytes());
    let keypair = KeyPair::new(PublicKey::from_array(public), SecretKey::from_array(scalar));
    zeroize::Zeroize::zeroize(&mut scalar);
    keypair
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use test_case::test_case;

    /// secp256k1 group order n.
    const CURVE_ORDER_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn test_generate_keypair_is_compressed() {
        let kp = generate_keypair();
        let prefix = kp.public.as_bytes()[0];
        assert!(prefix == 0x02 || prefix == 0x03);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_keypair_with(&mut ChaCha20Rng::seed_from_u64(42));
        let b = generate_keypair_with(&mut ChaCha20Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_public_point_reproducible_from_secret() {
        let kp = generate_keypair();
        let rebuilt = keypair_from_secret(&kp.secret).unwrap();
        assert_eq!(kp.public, rebuilt.public);
    }

    #[test]
    fn test_known_vector_secret_one() {
        // 1 * G
        let mut arr = [0u8; SECRET_KEY_SIZE];
        arr[31] = 1;
        let kp = keypair_from_secret(&SecretKey::from_array(arr)).unwrap();
        assert_eq!(
            kp.public.to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_zero_scalar_rejected() {
        let result = keypair_from_secret(&SecretKey::from_array([0u8; SECRET_KEY_SIZE]));
        assert!(matches!(result, Err(SigilError::InvalidPrivateKeyValue)));
    }

    #[test]
    fn test_curve_order_rejected() {
        let secret = parse_private_key_hex(CURVE_ORDER_HEX).unwrap();
        assert!(matches!(
            keypair_from_secret(&secret),
            Err(SigilError::InvalidPrivateKeyValue)
        ));
    }

    #[test]
    fn test_parse_hex_roundtrip() {
        let kp = generate_keypair();
        let parsed = parse_private_key_hex(&kp.secret.to_hex()).unwrap();
        assert_eq!(parsed, kp.secret);
    }

    #[test]
    fn test_parse_hex_sign_padded() {
        let kp = generate_keypair();
        let padded = format!("00{}", kp.secret.to_hex());
        assert_eq!(parse_private_key_hex(&padded).unwrap(), kp.secret);
    }

    #[test]
    fn test_parse_hex_short_value_left_padded() {
        let secret = parse_private_key_hex("0x01").unwrap();
        let mut expected = [0u8; SECRET_KEY_SIZE];
        expected[31] = 1;
        assert_eq!(secret.as_array(), &expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("0x" ; "bare prefix")]
    #[test_case("zz" ; "not hex")]
    #[test_case("abc" ; "odd length")]
    #[test_case("01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff" ; "33 bytes without sign byte")]
    fn test_parse_hex_rejects(input: &str) {
        assert!(matches!(
            parse_private_key_hex(input),
            Err(SigilError::InvalidPrivateKeyEncoding(_))
        ));
    }

    #[test]
    fn test_secret_from_bytes_length() {
        assert!(secret_from_bytes(&[1u8; 32]).is_ok());
        assert!(matches!(
            secret_from_bytes(&[1u8; 31]),
            Err(SigilError::InvalidPrivateKeyEncoding(_))
        ));
    }
}
