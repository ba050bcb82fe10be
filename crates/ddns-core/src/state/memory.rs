// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Holds the baseline IP for the lifetime of the process only. Used by tests
// and by dry-run mode, where the baseline is seeded from the real state file
// but never written back to disk.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::ip::PublicIp;
use crate::traits::state_store::StateStore;

/// In-memory state store implementation
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::MemoryStateStore;
/// use ddns_core::traits::StateStore;
/// use ddns_core::PublicIp;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///     let ip = PublicIp::parse("1.2.3.4").ok_or("invalid")?;
///
///     store.save_ip(&ip).await?;
///     assert_eq!(store.load_last_ip().await, Some(ip));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<PublicIp>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `ip`
    pub fn with_ip(ip: Option<PublicIp>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ip)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_last_ip(&self) -> Option<PublicIp> {
        self.inner.read().await.clone()
    }

    async fn save_ip(&self, ip: &PublicIp) -> Result<(), Error> {
        *self.inner.write().await = Some(ip.clone());
        Ok(())
    }
}
