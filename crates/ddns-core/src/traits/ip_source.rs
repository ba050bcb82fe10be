// # IP Source Trait
//
// Defines the interface for discovering the host's external IPv4 address.
//
// ## Implementations
//
// - HTTP lookup services with ordered fallback: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// let source = /* IpSource implementation */;
// let current_ip = source.current().await?;
// println!("External IP: {}", current_ip);
// ```

use async_trait::async_trait;

use crate::ip::PublicIp;

/// Trait for IP source implementations
///
/// A source is asked exactly once per run. It owns its own fallback order
/// but never retries a single endpoint, never caches between runs and never
/// touches the state store or the DNS provider.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current external IP address
    ///
    /// # Returns
    ///
    /// - `Ok(PublicIp)`: The first valid address found
    /// - `Err(Error::NoIpAvailable)`: Every lookup failed
    async fn current(&self) -> Result<PublicIp, crate::Error>;
}
