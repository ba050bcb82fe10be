//! Test doubles and common utilities for reconcile contract tests
//!
//! The doubles count calls and append to a shared call log so tests can
//! assert both how often and in which order components were used.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, StateStore, UpdateResult};
use ddns_core::PublicIp;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Ordered log of calls across all doubles
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

pub fn ip(s: &str) -> PublicIp {
    PublicIp::parse(s).expect("test IP must be valid")
}

/// An IpSource that returns a fixed address, or fails like an exhausted resolver
pub struct FixedIpSource {
    ip: Option<PublicIp>,
    log: CallLog,
}

impl FixedIpSource {
    pub fn new(ip: PublicIp, log: &CallLog) -> Self {
        Self {
            ip: Some(ip),
            log: log.clone(),
        }
    }

    pub fn unavailable(log: &CallLog) -> Self {
        Self {
            ip: None,
            log: log.clone(),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<PublicIp> {
        self.log.push("ip.current");
        self.ip.clone().ok_or(Error::NoIpAvailable)
    }
}

/// A DnsProvider that tracks calls and can be told to fail
pub struct MockDnsProvider {
    update_call_count: Arc<AtomicUsize>,
    content_call_count: Arc<AtomicUsize>,
    fail_with_status: Option<u16>,
    log: CallLog,
}

impl MockDnsProvider {
    pub fn new(log: &CallLog) -> Self {
        Self {
            update_call_count: Arc::new(AtomicUsize::new(0)),
            content_call_count: Arc::new(AtomicUsize::new(0)),
            fail_with_status: None,
            log: log.clone(),
        }
    }

    /// Make every update fail with a provider API error
    pub fn failing(log: &CallLog, status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::new(log)
        }
    }

    /// Create a provider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            update_call_count: Arc::clone(&other.update_call_count),
            content_call_count: Arc::clone(&other.content_call_count),
            fail_with_status: other.fail_with_status,
            log: other.log.clone(),
        }
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn content_call_count(&self) -> usize {
        self.content_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, _new_ip: &PublicIp) -> Result<UpdateResult> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("provider.update");

        match self.fail_with_status {
            Some(status) => Err(Error::provider_api(status, "Internal server error")),
            None => Ok(UpdateResult::Updated {
                previous_content: Some("192.0.2.1".to_string()),
            }),
        }
    }

    async fn current_content(&self) -> Option<String> {
        self.content_call_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("provider.content");
        Some("192.0.2.1".to_string())
    }

    fn record_name(&self) -> &str {
        "home.example.com"
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore that tracks calls
pub struct MockStateStore {
    save_call_count: Arc<AtomicUsize>,
    state: Arc<Mutex<Option<PublicIp>>>,
    fail_saves: bool,
    log: CallLog,
}

impl MockStateStore {
    pub fn new(initial: Option<PublicIp>, log: &CallLog) -> Self {
        Self {
            save_call_count: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(initial)),
            fail_saves: false,
            log: log.clone(),
        }
    }

    /// Make every save fail
    pub fn read_only(initial: Option<PublicIp>, log: &CallLog) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(initial, log)
        }
    }

    /// Create a store that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            save_call_count: Arc::clone(&other.save_call_count),
            state: Arc::clone(&other.state),
            fail_saves: other.fail_saves,
            log: other.log.clone(),
        }
    }

    pub fn save_call_count(&self) -> usize {
        self.save_call_count.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<PublicIp> {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn load_last_ip(&self) -> Option<PublicIp> {
        self.log.push("state.load");
        self.state.lock().unwrap().clone()
    }

    async fn save_ip(&self, ip: &PublicIp) -> Result<()> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("state.save");

        if self.fail_saves {
            return Err(Error::state_store("Permission denied"));
        }

        *self.state.lock().unwrap() = Some(ip.clone());
        Ok(())
    }
}
