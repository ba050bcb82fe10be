// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider for the DDNS updater.
//
// ## Implementation Status
//
// - ✅ Generic authenticated request executor (`CloudflareClient::call`)
// - ✅ Zone ID lookup by domain, record ID lookup by name and type
// - ✅ Pre-configured zone/record IDs skip the lookups
// - ✅ Record updates preserve the existing ttl and proxied flag
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (the next scheduled run retries)
// - ❌ NO record creation (the record must already exist)
//
// ## Identifier Resolution
//
// `Unresolved -> Resolving -> Resolved | Fatal`, once per run. A
// `CloudflareProvider` only exists in the `Resolved` state: the single
// constructor, [`CloudflareProvider::resolve`], either returns a provider
// holding both identifiers or the fatal `ZoneNotFound` / `RecordNotFound`
// error.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Client construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Get DNS Record: GET `/zones/:zone_id/dns_records/:record_id`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{UpdaterConfig, record_fqdn};
use ddns_core::traits::{DnsProvider, UpdateResult};
use ddns_core::{Error, PublicIp, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL sent when the existing record does not report one
pub const DEFAULT_TTL: u64 = 3600;

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// A DNS record as returned by the API
///
/// Only `id` is guaranteed; everything else is optional so that partial
/// responses still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Authenticated Cloudflare API v4 client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
#[derive(Clone)]
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a client for the public Cloudflare API
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Zone:Read and Zone:DNS:Edit permissions
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, CLOUDFLARE_API_BASE)
    }

    /// Create a client against a different API base URL
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Execute an authenticated API request and parse the JSON response
    ///
    /// # Parameters
    ///
    /// - `method`: HTTP method
    /// - `path`: Path below the API base, e.g. `/zones`
    /// - `query`: Query parameters (URL-encoded by the client)
    /// - `body`: Optional JSON request body
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: Parsed body of a 2xx response (`Value::Null` if empty)
    /// - `Err(Error::ProviderApi)`: Non-2xx response, with the provider's
    ///   error messages joined by ", " or the raw body
    /// - `Err(Error::Http)`: Transport failure
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Cloudflare API request: {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::provider_api(status.as_u16(), error_message(&text)));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Look up the zone ID for `domain`
    ///
    /// The first zone in provider order wins when several match.
    pub async fn resolve_zone_id(&self, domain: &str) -> Result<String> {
        tracing::info!("Looking up Zone ID for domain: {}", domain);

        let value = self
            .call(Method::GET, "/zones", &[("name", domain)], None)
            .await?;
        let response: ApiResponse<Vec<Zone>> = serde_json::from_value(value)?;

        let zone = response
            .result
            .and_then(|zones| zones.into_iter().next())
            .ok_or_else(|| Error::zone_not_found(domain))?;

        tracing::info!("Found Zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// Look up the record ID for a fully-qualified name and type
    ///
    /// The first record in provider order wins when several match.
    pub async fn resolve_record_id(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: &str,
    ) -> Result<String> {
        tracing::info!(
            "Looking up DNS Record ID for: {} ({})",
            record_name,
            record_type
        );

        let path = format!("/zones/{}/dns_records", zone_id);
        let value = self
            .call(
                Method::GET,
                &path,
                &[("type", record_type), ("name", record_name)],
                None,
            )
            .await?;
        let response: ApiResponse<Vec<DnsRecord>> = serde_json::from_value(value)?;

        let record = response
            .result
            .and_then(|records| records.into_iter().next())
            .ok_or_else(|| Error::record_not_found(record_name, record_type))?;

        tracing::info!("Found DNS Record ID: {}", record.id);
        Ok(record.id)
    }

    /// Fetch a DNS record by ID
    pub async fn get_record(&self, zone_id: &str, record_id: &str) -> Result<DnsRecord> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);
        let value = self.call(Method::GET, &path, &[], None).await?;
        let response: ApiResponse<DnsRecord> = serde_json::from_value(value)?;

        response.result.ok_or_else(|| {
            Error::update_failed(format!("DNS record {} missing from response", record_id))
        })
    }

    /// Current content of a DNS record, `None` on any failure
    pub async fn get_record_content(&self, zone_id: &str, record_id: &str) -> Option<String> {
        match self.get_record(zone_id, record_id).await {
            Ok(record) => record.content,
            Err(e) => {
                tracing::warn!("Error getting current DNS record: {}", e);
                None
            }
        }
    }
}

/// Extract a human-readable message from an error response body
fn error_message(body: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<ApiResponse<Value>>(body)
        .map(|response| {
            response
                .errors
                .into_iter()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        body.to_string()
    } else {
        messages.join(", ")
    }
}

/// The record the provider should manage, before identifier resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    /// Zone name, e.g. "example.com"
    pub domain: String,
    /// Subdomain label, or `@` for the apex
    pub record_name: String,
    /// Record type, e.g. "A"
    pub record_type: String,
    /// Pre-configured zone ID
    pub zone_id: Option<String>,
    /// Pre-configured record ID
    pub record_id: Option<String>,
}

impl From<&UpdaterConfig> for RecordTarget {
    fn from(config: &UpdaterConfig) -> Self {
        Self {
            domain: config.domain.clone(),
            record_name: config.record_name.clone(),
            record_type: config.record_type.clone(),
            zone_id: config.zone_id.clone(),
            record_id: config.record_id.clone(),
        }
    }
}

impl RecordTarget {
    /// Fully-qualified record name
    pub fn fqdn(&self) -> String {
        record_fqdn(&self.record_name, &self.domain)
    }
}

/// Cloudflare DNS provider for a single, resolved record
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record lookup, record read)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
#[derive(Debug)]
pub struct CloudflareProvider {
    client: CloudflareClient,
    zone_id: String,
    record_id: String,
    record_fqdn: String,
    record_type: String,
    dry_run: bool,
}

impl CloudflareProvider {
    /// Resolve zone and record identifiers and build the provider
    ///
    /// Identifiers present in `target` are used as-is; missing ones are
    /// looked up. Zone resolution happens first, so a missing zone never
    /// triggers a record lookup.
    pub async fn resolve(client: CloudflareClient, target: &RecordTarget, dry_run: bool) -> Result<Self> {
        let record_fqdn = target.fqdn();

        let zone_id = match &target.zone_id {
            Some(zone_id) => {
                tracing::debug!("Using pre-configured zone ID");
                zone_id.clone()
            }
            None => client.resolve_zone_id(&target.domain).await?,
        };

        let record_id = match &target.record_id {
            Some(record_id) => {
                tracing::debug!("Using pre-configured record ID");
                record_id.clone()
            }
            None => {
                client
                    .resolve_record_id(&zone_id, &record_fqdn, &target.record_type)
                    .await?
            }
        };

        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            client,
            zone_id,
            record_id,
            record_fqdn,
            record_type: target.record_type.clone(),
            dry_run,
        })
    }

    /// Resolved zone ID
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Resolved record ID
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    fn record_path(&self) -> String {
        format!("/zones/{}/dns_records/{}", self.zone_id, self.record_id)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Update the managed record with a new IP address
    ///
    /// # API Calls
    ///
    /// ```http
    /// # Read existing record (ttl and proxied are preserved)
    /// GET /zones/:zone_id/dns_records/:record_id
    ///
    /// # Replace it (skipped in dry-run mode)
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "home.example.com",
    ///   "content": "1.2.3.4",
    ///   "ttl": 3600,
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(&self, new_ip: &PublicIp) -> Result<UpdateResult> {
        let existing = self.client.get_record(&self.zone_id, &self.record_id).await?;

        let payload = serde_json::json!({
            "type": self.record_type,
            "name": self.record_fqdn,
            "content": new_ip.as_str(),
            "ttl": existing.ttl.unwrap_or(DEFAULT_TTL),
            "proxied": existing.proxied.unwrap_or(false),
        });

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                self.record_path(),
                payload
            );
            return Ok(UpdateResult::DryRun);
        }

        let value = self
            .client
            .call(Method::PUT, &self.record_path(), &[], Some(&payload))
            .await?;
        let response: ApiResponse<Value> = serde_json::from_value(value)?;

        if !response.success {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(Error::update_failed(if messages.is_empty() {
                "provider reported success=false".to_string()
            } else {
                messages.join(", ")
            }));
        }

        tracing::info!(
            "Successfully updated DNS record {} to {}",
            self.record_fqdn,
            new_ip
        );
        Ok(UpdateResult::Updated {
            previous_content: existing.content,
        })
    }

    async fn current_content(&self) -> Option<String> {
        self.client
            .get_record_content(&self.zone_id, &self.record_id)
            .await
    }

    fn record_name(&self) -> &str {
        &self.record_fqdn
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
