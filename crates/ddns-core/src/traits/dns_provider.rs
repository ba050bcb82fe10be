// # DNS Provider Trait
//
// Defines the interface for updating the managed DNS record via a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// let provider = /* DnsProvider implementation, identifiers already resolved */;
// provider.update_record(&new_ip).await?;
// ```

use async_trait::async_trait;

use crate::ip::PublicIp;

/// Result of a DNS update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record content was replaced
    Updated {
        /// Content the record held before the update, if it was readable
        previous_content: Option<String>,
    },
    /// Dry-run mode: the update was logged, not sent
    DryRun,
}

/// Trait for DNS provider implementations
///
/// A provider instance manages exactly one record whose zone and record
/// identifiers were resolved before the instance was handed to the engine.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (the next scheduled run retries)
/// - ❌ Access the state store (owned by `DdnsEngine`)
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point the managed record at `new_ip`
    ///
    /// Record settings the caller does not know about (ttl, proxy flag) must
    /// be preserved.
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: The provider accepted the update (or dry-run)
    /// - `Err(Error)`: Non-2xx response, transport failure, or provider-reported failure
    async fn update_record(&self, new_ip: &PublicIp) -> Result<UpdateResult, crate::Error>;

    /// Current content of the managed record
    ///
    /// Diagnostic only: any failure yields `None`.
    async fn current_content(&self) -> Option<String>;

    /// Fully-qualified name of the managed record (for logging)
    fn record_name(&self) -> &str;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
