// # File State Store
//
// File-based implementation of StateStore.
//
// ## File Format
//
// A single plain-text file holding one IPv4 address, no trailing structure:
//
// ```text
// 203.0.113.7
// ```
//
// ## Crash Behavior
//
// - Atomic writes: new content goes to a `.tmp` sibling named after the pid
//   and a per-process sequence number, then is renamed over the real file,
//   so readers see either the old or the new address
// - Overlapping writers never share a temp file; the last rename wins
// - Anything unreadable or malformed reads as "no prior state"; the next run
//   re-establishes the baseline

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::ip::PublicIp;
use crate::traits::state_store::StateStore;

/// Distinguishes temp files of concurrent writers within one process
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileStateStore;
/// use ddns_core::traits::StateStore;
/// use ddns_core::PublicIp;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/cloudflare-ip-updater/last_ip.txt").await?;
///
///     let ip = PublicIp::parse("1.2.3.4").ok_or("invalid")?;
///     store.save_ip(&ip).await?;
///
///     assert_eq!(store.load_last_ip().await, Some(ip));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Open a file state store, creating the parent directory if needed
    ///
    /// Directory creation is idempotent; an existing directory is left alone.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self { path })
    }

    /// Refer to a state file without touching the filesystem
    ///
    /// Used by dry runs, which only ever read the baseline.
    pub fn existing<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Temporary sibling for an atomic write, unique per writer
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_last_ip(&self) -> Option<PublicIp> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("State file does not exist: {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Error reading last IP from {}: {}", self.path.display(), e);
                return None;
            }
        };

        let ip = PublicIp::parse(content.trim());
        if ip.is_none() {
            tracing::warn!(
                "State file {} does not contain an IPv4 address, ignoring it",
                self.path.display()
            );
        }
        ip
    }

    async fn save_ip(&self, ip: &PublicIp) -> Result<(), Error> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(ip.as_str().as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )));
        }

        tracing::trace!("Saved IP {} to {}", ip, self.path.display());
        Ok(())
    }
}
