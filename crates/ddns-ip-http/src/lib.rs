// # HTTP IP Source
//
// This crate provides the HTTP-based IP source for the DDNS updater.
//
// ## Architecture
//
// Queries an ordered list of "what is my IP" services that answer with JSON.
// The first service that returns HTTP 200, a parseable body and a dotted-quad
// address wins. Anything else from a service (transport error, other status,
// bad JSON, missing or malformed address) is logged and the next service is
// tried. There are no retries within a service and the order never changes.
//
// ## Response Shapes
//
// ```text
// api.ipify.org?format=json   {"ip": "203.0.113.7"}
// ifconfig.me/all.json        {"ip_addr": "203.0.113.7", ...}
// api.myip.com                {"ip": "203.0.113.7", "country": "...", ...}
// ```

use async_trait::async_trait;
use ddns_core::config::DEFAULT_IP_SERVICES;
use ddns_core::traits::IpSource;
use ddns_core::{Error, PublicIp, Result};
use serde_json::Value;
use std::time::Duration;

/// Default HTTP timeout per lookup request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Field names carrying the address, in lookup order
const IP_FIELDS: &[&str] = &["ip", "ip_addr", "IP"];

/// HTTP-based IP source with ordered fallback
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// Lookup endpoints in priority order
    services: Vec<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source using the default lookup services
    pub fn new() -> Self {
        Self::with_services(DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect())
    }

    /// Create a source querying `services` in the given order
    pub fn with_services(services: Vec<String>) -> Self {
        Self {
            services,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Lookup endpoints in the order they are queried
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Fetch and validate the address from a single service
    async fn fetch_ip(&self, url: &str) -> Result<PublicIp> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse response: {}", e)))?;

        let candidate = extract_ip(&body)
            .ok_or_else(|| Error::http("Response has no IP field"))?;

        PublicIp::parse(candidate)
            .ok_or_else(|| Error::http(format!("Invalid IP address: {}", candidate)))
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the address string out of a lookup response
///
/// The first known field that is present decides; later fields are not
/// consulted even if the first one turns out not to be a string.
pub fn extract_ip(body: &Value) -> Option<&str> {
    IP_FIELDS
        .iter()
        .find_map(|field| body.get(*field).filter(|v| !v.is_null()))
        .and_then(Value::as_str)
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<PublicIp> {
        for url in &self.services {
            match self.fetch_ip(url).await {
                Ok(ip) => {
                    tracing::info!("Current external IP: {} (from {})", ip, url);
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!("Failed to get IP from {}: {}", url, e);
                }
            }
        }

        Err(Error::NoIpAvailable)
    }
}
