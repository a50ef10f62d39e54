//! CLI configuration: defaults, overridden by `.env` and the environment.

use std::path::PathBuf;

use sigil_core::error::{Result, SigilError};
use sigil_core::types::OriginNode;

/// Environment variable naming the vault file.
pub const ENV_VAULT_PATH: &str = "SIGIL_VAULT_PATH";
/// Environment variable naming the default origin node.
pub const ENV_DEFAULT_NODE: &str = "SIGIL_DEFAULT_NODE";
/// Environment variable sizing the watch notification queue.
pub const ENV_NOTIFY_CAPACITY: &str = "SIGIL_NOTIFY_CAPACITY";

const DEFAULT_NOTIFY_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub vault_path: PathBuf,
    pub default_node: OriginNode,
    pub notify_capacity: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            default_node: OriginNode::default(),
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

impl CliConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let vault_path = get(ENV_VAULT_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.vault_path);

        let default_node = match get(ENV_DEFAULT_NODE) {
            Some(v) => v.parse()?,
            None => defaults.default_node,
        };

        let notify_capacity = match get(ENV_NOTIFY_CAPACITY) {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(SigilError::ConfigError(format!(
                        "{} must be a positive integer, got {:?}",
                        ENV_NOTIFY_CAPACITY, v
                    )))
                }
            },
            None => defaults.notify_capacity,
        };

        Ok(Self {
            vault_path,
            default_node,
            notify_capacity,
        })
    }
}

fn default_vault_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sigil")
        .join("vault.bin")
}
