//! # SIGIL Core
//!
//! Core types, errors, and traits for SIGIL prefix-constrained identities.
//!
//! This crate provides the foundational building blocks used by all other SIGIL crates:
//!
//! - **Types**: Key pairs, addresses, identities and origin nodes
//! - **Errors**: The caller-visible error taxonomy
//! - **Constants**: Address layout, prefix bounds and domain separators
//! - **Traits**: The vault and watch-notifier seams
//!
//! ## Example
//!
//! ```rust
//! use sigil_core::{OriginNode, MAX_PREFIX_LENGTH};
//!
//! let node: OriginNode = "localhost".parse().unwrap();
//! assert_eq!(node.as_str(), "localhost");
//! assert!(MAX_PREFIX_LENGTH > 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, SigilError};
pub use traits::*;
pub use types::*;
