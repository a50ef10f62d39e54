//! # SIGIL Cryptography
//!
//! Cryptographic primitives for SIGIL identities.
//!
//! This crate provides:
//!
//! - **Hash**: SHAKE256 with domain separation
//! - **Key pairs**: secp256k1 generation and import from raw secrets
//! - **Codec**: Address encoding, decoding and prefix matching
//! - **Miner**: Randomized search for prefix-satisfying key pairs
//!
//! ## Example
//!
//! ```rust
//! use sigil_crypto::{codec, miner::{mine, MiningControl, MiningOutcome}};
//!
//! let control = MiningControl::new();
//! if let MiningOutcome::Found(mined) = mine(4, &control).unwrap() {
//!     assert!(codec::matches_prefix(&mined.address));
//!     let decoded = codec::decode(mined.address.encoded()).unwrap();
//!     assert_eq!(decoded, mined.address);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod hash;
pub mod keypair;
pub mod codec;
pub mod miner;

// Re-export main functions at crate root
pub use hash::shake256;
pub use keypair::{
    generate_keypair, generate_keypair_with, keypair_from_secret, parse_private_key_hex,
    secret_from_bytes,
};
pub use codec::{check_prefix_length, decode, encode, matches_prefix};
pub use miner::{
    expected_attempts, mine, mine_with_rng, validate, validate_hex, validate_secret, MinedAddress,
    MiningControl, MiningOutcome,
};
