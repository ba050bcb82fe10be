//! Core DDNS engine
//!
//! The DdnsEngine runs one reconcile pass per process invocation:
//! - Discover the external IP via IpSource
//! - Compare it with the baseline held by StateStore
//! - Update the DNS record via DnsProvider when they differ
//! - Persist the new baseline after a successful update
//!
//! ## Architecture
//!
//! ```text
//!                            ┌──────────────┐
//!                            │ DdnsEngine   │
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────┐           ┌─────────────┐
//! │  IpSource   │           │ StateStore   │           │ DnsProvider │
//! │ (current)   │           │ (load/save)  │           │ (update)    │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Resolve the current external IP (fatal if unavailable)
//! 2. Load the baseline IP
//! 3. No baseline: save the current IP, no provider call
//! 4. Same IP: nothing to do
//! 5. Different IP: update the record, then save the current IP
//!
//! A failed update leaves the baseline untouched, so the next scheduled run
//! attempts the same transition again.
//!
//! ## Concurrency
//!
//! Everything is awaited in sequence. Overlapping runs are not coordinated:
//! two runs racing on the state file end with the last writer's address,
//! which the following run corrects if it is stale.

use crate::error::Result;
use crate::ip::PublicIp;
use crate::traits::{DnsProvider, IpSource, StateStore, UpdateResult};
use tracing::{debug, info};

/// Outcome of a single reconcile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No baseline existed; the current IP was saved without touching DNS
    Bootstrapped {
        current_ip: PublicIp,
    },

    /// The baseline already matches the current IP
    Unchanged {
        current_ip: PublicIp,
    },

    /// The record was updated and the baseline advanced
    Updated {
        previous_ip: PublicIp,
        current_ip: PublicIp,
        /// False when the provider only logged the update (dry-run)
        applied: bool,
    },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Resolve provider identifiers and build the components
/// 2. Create with [`DdnsEngine::new()`]
/// 3. Call [`DdnsEngine::check_and_update()`] once
/// 4. Exit with a status derived from the result
pub struct DdnsEngine {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for the managed record
    provider: Box<dyn DnsProvider>,

    /// State store for the baseline IP
    state_store: Box<dyn StateStore>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider with identifiers already resolved
    /// - `state_store`: State store implementation
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
    ) -> Self {
        Self {
            ip_source,
            provider,
            state_store,
        }
    }

    /// Run one reconcile pass
    ///
    /// # Returns
    ///
    /// - `Ok(CheckOutcome)`: What happened during this pass
    /// - `Err(Error)`: IP unavailable, provider update failed, or the baseline could not be written
    pub async fn check_and_update(&self) -> Result<CheckOutcome> {
        let current_ip = self.ip_source.current().await?;

        let Some(last_ip) = self.state_store.load_last_ip().await else {
            info!("No previous IP found. Saving current IP: {}", current_ip);
            self.state_store.save_ip(&current_ip).await?;
            return Ok(CheckOutcome::Bootstrapped { current_ip });
        };

        if last_ip == current_ip {
            info!("IP unchanged ({}) - no update needed", current_ip);
            return Ok(CheckOutcome::Unchanged { current_ip });
        }

        info!("IP changed from {} to {}", last_ip, current_ip);

        match self.provider.current_content().await {
            Some(content) => debug!(
                "DNS record {} currently points to {}",
                self.provider.record_name(),
                content
            ),
            None => debug!(
                "Current content of DNS record {} is unknown",
                self.provider.record_name()
            ),
        }

        info!(
            "Updating {} DNS record {}...",
            self.provider.provider_name(),
            self.provider.record_name()
        );
        let result = self.provider.update_record(&current_ip).await?;

        // Only advance the baseline once the provider has accepted the change
        self.state_store.save_ip(&current_ip).await?;

        let applied = match result {
            UpdateResult::Updated { previous_content } => {
                info!(
                    "Update complete! {} -> {} (record previously {})",
                    self.provider.record_name(),
                    current_ip,
                    previous_content.as_deref().unwrap_or("unknown")
                );
                true
            }
            UpdateResult::DryRun => {
                info!(
                    "[DRY-RUN] Update of {} -> {} not sent",
                    self.provider.record_name(),
                    current_ip
                );
                false
            }
        };

        Ok(CheckOutcome::Updated {
            previous_ip: last_ip,
            current_ip,
            applied,
        })
    }

    /// Name of the record this engine manages
    pub fn record_name(&self) -> &str {
        self.provider.record_name()
    }
}
