//! Core traits for the DDNS updater
//!
//! - [`IpSource`]: Discover the external IP
//! - [`DnsProvider`]: Update the managed record via a provider API
//! - [`StateStore`]: Persist the baseline IP between runs

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, UpdateResult};
pub use state_store::StateStore;
