//! Domain types for SIGIL.
//!
//! - [`KeyPair`]: secp256k1 public/secret key pair
//! - [`Address`]: Prefix-constrained, checksummed identity name
//! - [`Identity`]: Address + key pair + metadata, the unit the vault stores
//! - [`OriginNode`]: The node an identity was created for

mod keys;
mod address;
mod identity;

pub use keys::*;
pub use address::*;
pub use identity::*;
