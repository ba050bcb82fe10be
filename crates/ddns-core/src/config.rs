//! Configuration types for the DDNS updater
//!
//! The updater is configured from a `KEY=VALUE` file with environment
//! variables as fallback. For every key the file wins, then the environment,
//! then the built-in default. Empty values are treated as unset.
//!
//! ```text
//! # /etc/cloudflare-ip-updater/config
//! CLOUDFLARE_API_TOKEN="..."
//! DOMAIN=example.com
//! DNS_RECORD_NAME=home
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cloudflare-ip-updater/config";

/// Default location of the last-known-IP file
pub const DEFAULT_STATE_PATH: &str = "/var/lib/cloudflare-ip-updater/last_ip.txt";

/// Lookup services queried in order until one yields an address
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org?format=json",
    "https://ifconfig.me/all.json",
    "https://api.myip.com",
];

/// Record name marker for the zone apex
pub const APEX_MARKER: &str = "@";

/// Record type managed when none is configured
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// Log level used when none is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration keys understood by the updater
pub mod keys {
    pub const API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
    pub const ZONE_ID: &str = "CLOUDFLARE_ZONE_ID";
    pub const RECORD_ID: &str = "CLOUDFLARE_DNS_RECORD_ID";
    pub const DOMAIN: &str = "DOMAIN";
    pub const RECORD_NAME: &str = "DNS_RECORD_NAME";
    pub const RECORD_TYPE: &str = "DNS_RECORD_TYPE";
    pub const STATE_FILE: &str = "IP_STORAGE_FILE";
    pub const IP_SERVICES: &str = "IP_CHECK_SERVICES";
    pub const LOG_LEVEL: &str = "DDNS_LOG_LEVEL";
}

/// Immutable updater configuration, built once at process entry
#[derive(Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Domain (zone name), e.g. "example.com"
    pub domain: String,

    /// Zone ID, looked up from `domain` when absent
    pub zone_id: Option<String>,

    /// DNS record ID, looked up from name and type when absent
    pub record_id: Option<String>,

    /// Subdomain label, or `@` for the apex
    pub record_name: String,

    /// Record type, "A" unless configured otherwise
    pub record_type: String,

    /// Where the last-known IP is persisted
    pub state_path: PathBuf,

    /// Ordered list of IP lookup endpoints
    pub ip_services: Vec<String>,

    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdaterConfig")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("state_path", &self.state_path)
            .field("ip_services", &self.ip_services)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl UpdaterConfig {
    /// Build a configuration from parsed file values and an environment lookup
    ///
    /// `env` is injected so tests don't have to mutate the process environment.
    pub fn from_sources<F>(file: &HashMap<String, String>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            file.get(key)
                .cloned()
                .filter(|v| !v.is_empty())
                .or_else(|| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        };

        let ip_services = lookup(keys::IP_SERVICES)
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect());

        Self {
            api_token: lookup(keys::API_TOKEN).unwrap_or_default(),
            domain: lookup(keys::DOMAIN).unwrap_or_default(),
            zone_id: lookup(keys::ZONE_ID),
            record_id: lookup(keys::RECORD_ID),
            record_name: lookup(keys::RECORD_NAME).unwrap_or_else(|| APEX_MARKER.to_string()),
            record_type: lookup(keys::RECORD_TYPE)
                .unwrap_or_else(|| DEFAULT_RECORD_TYPE.to_string()),
            state_path: lookup(keys::STATE_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            ip_services,
            log_level: lookup(keys::LOG_LEVEL)
                .map(|l| l.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Load the configuration file (if any) and merge it with the process environment
    ///
    /// With `explicit_path` set, an unreadable file is an error. Otherwise the
    /// default path is tried and silently skipped when it does not exist.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file_values = match explicit_path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!(
                        "Configuration file not readable: {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                parse_key_values(&contents)
            }
            None => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(contents) => parse_key_values(&contents),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(
                        "No configuration file at {}, using environment only",
                        DEFAULT_CONFIG_PATH
                    );
                    HashMap::new()
                }
                Err(e) => {
                    return Err(Error::config(format!(
                        "Configuration file not readable: {}: {}",
                        DEFAULT_CONFIG_PATH, e
                    )));
                }
            },
        };

        Ok(Self::from_sources(&file_values, |key| std::env::var(key).ok()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(Error::config(format!(
                "{} must be set in {} or the environment",
                keys::API_TOKEN,
                DEFAULT_CONFIG_PATH
            )));
        }

        if self.domain.is_empty() {
            return Err(Error::config(format!(
                "{} must be set in {} or the environment",
                keys::DOMAIN,
                DEFAULT_CONFIG_PATH
            )));
        }

        if self.record_type.is_empty() {
            return Err(Error::config("DNS record type cannot be empty"));
        }

        if self.ip_services.is_empty() {
            return Err(Error::config(format!(
                "{} must list at least one lookup URL",
                keys::IP_SERVICES
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::config(format!(
                "{} '{}' is not valid. Valid levels: {}",
                keys::LOG_LEVEL,
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Fully-qualified name of the managed record
    pub fn record_fqdn(&self) -> String {
        record_fqdn(&self.record_name, &self.domain)
    }
}

/// Expand a record label into a fully-qualified name
///
/// `@` maps to the bare domain, anything else is prefixed to it.
pub fn record_fqdn(record_name: &str, domain: &str) -> String {
    if record_name == APEX_MARKER {
        domain.to_string()
    } else {
        format!("{}.{}", record_name, domain)
    }
}

/// Parse `KEY=VALUE` lines
///
/// Blank lines, `#` comments and lines without `=` are skipped. The value is
/// split on the first `=` only, trimmed, and loses one leading and one
/// trailing quote character.
pub fn parse_key_values(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        values.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
    }

    values
}

fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
