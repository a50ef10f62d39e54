//! # SIGIL Identity
//!
//! High-level identity operations: mint or import a key, store the result
//! in a vault and hand it to the network watcher.
//!
//! ## Overview
//!
//! 1. **Mine** (fresh key): search on a blocking worker for a key pair whose
//!    address has the requested number of leading zero bits
//! 2. **Validate** (imported key): derive the address of a supplied secret and
//!    reject it if the prefix does not hold
//! 3. **Store**: add the identity to the vault; duplicates are refused
//! 4. **Notify**: pass the new address to a [`WatchNotifier`](sigil_core::WatchNotifier)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sigil_identity::{Creation, IdentityRequest, IdentityService};
//! use sigil_vault::MemoryVault;
//!
//! let service = IdentityService::new(Arc::new(MemoryVault::new()));
//! let pending = service.start(IdentityRequest::generate("alice", 8))?;
//!
//! match pending.complete().await? {
//!     Creation::Created(identity) => println!("{}", identity.address()),
//!     Creation::Cancelled { attempts } => println!("gave up after {}", attempts),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod mining;
pub mod notifier;
pub mod service;

pub use mining::MiningTask;
pub use notifier::{ChannelNotifier, NoopNotifier, WatchRequest};
pub use service::{Creation, IdentityRequest, IdentityService, KeySource, PendingIdentity};
