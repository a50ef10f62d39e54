//! Prefix mining.
//!
//! [`mine`] draws random key pairs until the derived address satisfies the
//! requested prefix length. The expected number of attempts is
//! `2^prefix_length`; there is no upper bound, so the loop polls a
//! [`MiningControl`] at every iteration and stops when it is cancelled.
//!
//! [`validate`] is the import path: it derives the address of a given secret
//! and rejects it if the prefix does not hold. It never searches.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use rand::{CryptoRng, RngCore};

use sigil_core::error::{Result, SigilError};
use sigil_core::types::{Address, KeyPair, SecretKey};

use crate::codec::{check_prefix_length, encode, matches_prefix};
use crate::keypair::{generate_keypair_with, keypair_from_secret, parse_private_key_hex, secret_from_bytes};

/// A key pair together with the address it derives.
#[derive(Clone, Debug)]
pub struct MinedAddress {
    /// The key pair (secret is zeroized on drop)
    pub keypair: KeyPair,
    /// Address satisfying the requested prefix
    pub address: Address,
    /// Number of key pairs tried, including the winning one
    pub attempts: u64,
}

/// Result of a mining run.
#[derive(Debug)]
pub enum MiningOutcome {
    /// A matching key pair was found.
    Found(MinedAddress),
    /// The search was cancelled before a match was found.
    Cancelled {
        /// Key pairs tried before cancellation
        attempts: u64,
    },
}

impl MiningOutcome {
    /// Returns the mined address, if any.
    pub fn found(self) -> Option<MinedAddress> {
        match self {
            MiningOutcome::Found(mined) => Some(mined),
            MiningOutcome::Cancelled { .. } => None,
        }
    }
}

/// Shared cancellation flag and attempt counter for a mining run.
///
/// Clones share state, so one clone can be handed to the worker and another
/// kept by the caller.
#[derive(Clone, Debug, Default)]
pub struct MiningControl {
    cancelled: Arc<AtomicBool>,
    attempts: Arc<AtomicU64>,
}

impl MiningControl {
    /// Creates a fresh control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The miner stops before its next attempt.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the number of key pairs tried so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

/// Expected number of attempts to satisfy a prefix length.
pub fn expected_attempts(prefix_length: u8) -> u64 {
    1u64 << prefix_length.min(63)
}

/// Mines with the thread-local CSPRNG.
///
/// # Errors
/// Returns `InvalidPrefixLength` before any work if the prefix is out of range.
pub fn mine(prefix_length: u8, control: &MiningControl) -> Result<MiningOutcome> {
    mine_with_rng(&mut rand::thread_rng(), prefix_length, control)
}

/// Mines with the given random source.
///
/// With a seeded generator the result is reproducible.
pub fn mine_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    prefix_length: u8,
    control: &MiningControl,
) -> Result<MiningOutcome> {
    check_prefix_length(prefix_length)?;

    let mut attempts = 0u64;
    loop {
        if control.is_cancelled() {
            return Ok(MiningOutcome::Cancelled { attempts });
        }

        let keypair = generate_keypair_with(rng);
        let address = encode(&keypair.public, prefix_length)?;
        attempts += 1;
        control.attempts.store(attempts, Ordering::Relaxed);

        if matches_prefix(&address) {
            return Ok(MiningOutcome::Found(MinedAddress {
                keypair,
                address,
                attempts,
            }));
        }
    }
}

/// Derives the address of a raw 32-byte secret and checks its prefix.
///
/// # Errors
/// - `InvalidPrefixLength` if the prefix is out of range
/// - `InvalidPrivateKeyEncoding` if the secret is not 32 bytes
/// - `InvalidPrivateKeyValue` if the scalar is out of range
/// - `KeyDoesNotMatchPrefix` if the derived address fails the prefix
pub fn validate(secret: &[u8], prefix_length: u8) -> Result<MinedAddress> {
    check_prefix_length(prefix_length)?;
    let secret = secret_from_bytes(secret)?;
    validate_secret(&secret, prefix_length)
}

/// Same as [`validate`], taking a hex-encoded secret.
pub fn validate_hex(secret_hex: &str, prefix_length: u8) -> Result<MinedAddress> {
    check_prefix_length(prefix_length)?;
    let secret = parse_private_key_hex(secret_hex)?;
    validate_secret(&secret, prefix_length)
}

/// Same as [`validate`], taking an already parsed secret.
pub fn validate_secret(secret: &SecretKey, prefix_length: u8) -> Result<MinedAddress> {
    check_prefix_length(prefix_length)?;
    let keypair = keypair_from_secret(secret)?;
    let address = encode(&keypair.public, prefix_length)?;

    if !matches_prefix(&address) {
        return Err(SigilError::KeyDoesNotMatchPrefix {
            address: address.encoded().to_string(),
            prefix_length,
        });
    }

    Ok(MinedAddress {
        keypair,
        address,
        attempts: 1,
    })
}
