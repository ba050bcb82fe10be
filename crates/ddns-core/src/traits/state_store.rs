// # State Store Trait
//
// Defines the interface for persisting the baseline IP: the last address this
// updater believes is configured in DNS.
//
// ## Implementations
//
// - File-based: single plain-text file (`FileStateStore`)
// - In-memory: tests and dry-run mode (`MemoryStateStore`)
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::StateStore;
//
// let store = /* StateStore implementation */;
//
// if store.load_last_ip().await.is_none() {
//     store.save_ip(&current_ip).await?;
// }
// ```

use async_trait::async_trait;

use crate::ip::PublicIp;

/// Trait for state store implementations
///
/// Reads are forgiving, writes are not: a missing, unreadable or malformed
/// value reads as "no prior state", while a failed write is an error.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last persisted IP
    ///
    /// # Returns
    ///
    /// - `Some(PublicIp)`: A valid baseline exists
    /// - `None`: No baseline, unreadable storage, or content that is not an IPv4 address
    async fn load_last_ip(&self) -> Option<PublicIp>;

    /// Overwrite the persisted IP
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully written
    /// - `Err(Error)`: Storage error
    async fn save_ip(&self, ip: &PublicIp) -> Result<(), crate::Error>;
}
