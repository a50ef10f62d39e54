//! File-based identity vault with persistence.
//!
//! Every mutation rewrites the whole file through a temp file and an atomic
//! rename, so the file on disk is always either the previous or the next
//! complete state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use sigil_core::error::{Result, SigilError};
use sigil_core::traits::IdentityVault;
use sigil_core::types::Identity;

use crate::{IdentityRecord, MemoryVault};

/// File-based identity vault.
///
/// Holds the decoded identities in a [`MemoryVault`] and writes the full
/// set to disk before each mutation becomes visible.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "SGVT"
/// version (1 byte): 1
/// count (8 bytes): number of records, little endian
/// records (variable): JSON array of IdentityRecord
/// ```
///
/// Writes go to `<file name>.tmp` next to the vault, are synced, renamed
/// over the vault, and the directory is synced.
///
/// The file contains unencrypted private keys. On Unix it is created with
/// mode `0600`.
pub struct FileVault {
    /// Path to the vault file
    path: PathBuf,
    /// Decoded contents
    memory: MemoryVault,
}

/// File format magic bytes
const MAGIC: &[u8; 4] = b"SGVT";
/// Current file format version
const VERSION: u8 = 1;
/// Magic + version + count
const HEADER_LEN: usize = 13;

impl FileVault {
    /// Opens the vault at the given path.
    ///
    /// If the file exists it is loaded and verified. Otherwise the vault
    /// starts empty and the file is created on the first mutation. A
    /// leftover temp file from an interrupted write is discarded.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let vault = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryVault::new(),
        };

        let temp_path = vault.temp_path();
        if fs::try_exists(&temp_path).await? {
            warn!(path = ?temp_path, "Discarding incomplete vault write");
            fs::remove_file(&temp_path).await?;
        }

        if fs::try_exists(&vault.path).await? {
            vault.load().await?;
        }

        Ok(vault)
    }

    /// Loads and verifies identities from the file.
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<()> {
        let contents = Zeroizing::new(fs::read(&self.path).await.map_err(|e| {
            SigilError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to open vault file: {}", e),
            ))
        })?);

        if contents.len() < HEADER_LEN {
            return Err(SigilError::VaultCorrupted("file too short".into()));
        }

        if &contents[0..4] != MAGIC {
            return Err(SigilError::VaultCorrupted("invalid magic bytes".into()));
        }

        let version = contents[4];
        if version != VERSION {
            return Err(SigilError::VersionMismatch {
                expected: VERSION,
                actual: version,
            });
        }

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&contents[5..HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes);
        info!(count, "Loading identities from file");

        let records: Vec<IdentityRecord> = serde_json::from_slice(&contents[HEADER_LEN..])
            .map_err(|e| SigilError::VaultCorrupted(format!("unreadable records: {}", e)))?;

        if records.len() as u64 != count {
            return Err(SigilError::VaultCorrupted(format!(
                "header declares {} records, found {}",
                count,
                records.len()
            )));
        }

        let identities = records
            .iter()
            .map(IdentityRecord::to_identity)
            .collect::<Result<Vec<_>>>()?;

        self.memory.import(identities).await.map_err(|e| match e {
            SigilError::DuplicateAddress(address) => {
                SigilError::VaultCorrupted(format!("duplicate address {}", address))
            }
            other => other,
        })?;

        debug!("Vault loaded successfully");
        Ok(())
    }

    /// Writes the given identities to the file.
    #[instrument(skip(self, identities), fields(count = identities.len()))]
    async fn save(&self, identities: &[Identity]) -> Result<()> {
        let records: Vec<IdentityRecord> =
            identities.iter().map(IdentityRecord::from_identity).collect();
        let serialized = Zeroizing::new(serde_json::to_vec(&records)?);

        let mut contents = Zeroizing::new(Vec::with_capacity(HEADER_LEN + serialized.len()));
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&(records.len() as u64).to_le_bytes());
        contents.extend_from_slice(&serialized);

        // Write atomically (write to temp, then rename)
        let temp_path = self.temp_path();
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        sync_parent_dir(&self.path).await?;

        debug!(path = ?self.path, "Vault saved successfully");
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of identities.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.path)
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name.
///
/// Never equal to `path`, whatever its extension.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Flushes the directory entry of `path` so a completed rename survives a crash.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(parent).await?.sync_all().await?;
    Ok(())
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

impl std::fmt::Debug for FileVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileVault")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

#[async_trait]
impl IdentityVault for FileVault {
    async fn has_any(&self) -> Result<bool> {
        Ok(!self.memory.is_empty())
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.memory.snapshot())
    }

    #[instrument(skip(self, identity), fields(address = %identity.address()))]
    async fn add(&self, identity: Identity) -> Result<()> {
        let _guard = self.memory.lock_mutations().await;
        let next = self.memory.staged_add(identity)?;
        self.save(&next).await?;
        self.memory.replace(next);
        info!("Identity added to vault");
        Ok(())
    }

    async fn find_by_address(&self, address: &str) -> Result<Identity> {
        self.memory.find_by_address(address).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, address: &str) -> Result<()> {
        let _guard = self.memory.lock_mutations().await;
        let next = self.memory.staged_delete(address)?;
        self.save(&next).await?;
        self.memory.replace(next);
        info!("Identity deleted from vault");
        Ok(())
    }
}
