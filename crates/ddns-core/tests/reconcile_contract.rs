//! Contract Test: Reconcile Pass
//!
//! Constraints verified:
//! - First run saves a baseline without touching the provider
//! - Steady state (same IP) touches neither the provider nor the store
//! - A changed IP updates the provider before the baseline is written
//! - A failed update leaves the baseline unchanged
//! - An unavailable IP aborts the pass before any state access

mod common;

use common::*;
use ddns_core::{CheckOutcome, DdnsEngine, Error};

fn engine(
    ip_source: FixedIpSource,
    provider: &MockDnsProvider,
    store: &MockStateStore,
) -> DdnsEngine {
    DdnsEngine::new(
        Box::new(ip_source),
        Box::new(MockDnsProvider::sharing_counters_with(provider)),
        Box::new(MockStateStore::sharing_counters_with(store)),
    )
}

#[tokio::test]
async fn first_run_saves_baseline_without_provider_calls() {
    let log = CallLog::default();
    let provider = MockDnsProvider::new(&log);
    let store = MockStateStore::new(None, &log);

    let engine = engine(FixedIpSource::new(ip("203.0.113.7"), &log), &provider, &store);
    let outcome = engine.check_and_update().await.expect("bootstrap succeeds");

    assert_eq!(
        outcome,
        CheckOutcome::Bootstrapped {
            current_ip: ip("203.0.113.7")
        }
    );
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(provider.content_call_count(), 0);
    assert_eq!(store.save_call_count(), 1);
    assert_eq!(store.stored(), Some(ip("203.0.113.7")));
}

#[tokio::test]
async fn unchanged_ip_is_a_no_op() {
    let log = CallLog::default();
    let provider = MockDnsProvider::new(&log);
    let store = MockStateStore::new(Some(ip("203.0.113.7")), &log);

    let engine = engine(FixedIpSource::new(ip("203.0.113.7"), &log), &provider, &store);
    let outcome = engine.check_and_update().await.expect("no-op succeeds");

    assert_eq!(
        outcome,
        CheckOutcome::Unchanged {
            current_ip: ip("203.0.113.7")
        }
    );
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(provider.content_call_count(), 0);
    assert_eq!(store.save_call_count(), 0);
    assert_eq!(log.calls(), vec!["ip.current", "state.load"]);
}

#[tokio::test]
async fn changed_ip_updates_provider_then_saves_once() {
    let log = CallLog::default();
    let provider = MockDnsProvider::new(&log);
    let store = MockStateStore::new(Some(ip("192.0.2.1")), &log);

    let engine = engine(FixedIpSource::new(ip("198.51.100.4"), &log), &provider, &store);
    let outcome = engine.check_and_update().await.expect("update succeeds");

    assert_eq!(
        outcome,
        CheckOutcome::Updated {
            previous_ip: ip("192.0.2.1"),
            current_ip: ip("198.51.100.4"),
            applied: true,
        }
    );
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.save_call_count(), 1);
    assert_eq!(store.stored(), Some(ip("198.51.100.4")));

    let calls = log.calls();
    let update_at = calls.iter().position(|c| *c == "provider.update").unwrap();
    let save_at = calls.iter().position(|c| *c == "state.save").unwrap();
    assert!(update_at < save_at, "baseline must be saved after the update: {calls:?}");
}

#[tokio::test]
async fn failed_update_leaves_baseline_unchanged() {
    let log = CallLog::default();
    let provider = MockDnsProvider::failing(&log, 500);
    let store = MockStateStore::new(Some(ip("192.0.2.1")), &log);

    let engine = engine(FixedIpSource::new(ip("198.51.100.4"), &log), &provider, &store);
    let err = engine.check_and_update().await.unwrap_err();

    assert!(matches!(err, Error::ProviderApi { status: 500, .. }));
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.save_call_count(), 0);
    assert_eq!(store.stored(), Some(ip("192.0.2.1")));
}

#[tokio::test]
async fn failed_update_is_retried_by_next_run() {
    let log = CallLog::default();
    let store = MockStateStore::new(Some(ip("192.0.2.1")), &log);

    // First run: provider down
    let failing = MockDnsProvider::failing(&log, 503);
    let first = engine(FixedIpSource::new(ip("198.51.100.4"), &log), &failing, &store);
    assert!(first.check_and_update().await.is_err());

    // Next scheduled run: provider back, same transition attempted again
    let provider = MockDnsProvider::new(&log);
    let second = engine(FixedIpSource::new(ip("198.51.100.4"), &log), &provider, &store);
    let outcome = second.check_and_update().await.expect("retry succeeds");

    assert!(matches!(outcome, CheckOutcome::Updated { .. }));
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.stored(), Some(ip("198.51.100.4")));
}

#[tokio::test]
async fn unavailable_ip_aborts_before_state_access() {
    let log = CallLog::default();
    let provider = MockDnsProvider::new(&log);
    let store = MockStateStore::new(Some(ip("192.0.2.1")), &log);

    let engine = engine(FixedIpSource::unavailable(&log), &provider, &store);
    let err = engine.check_and_update().await.unwrap_err();

    assert!(matches!(err, Error::NoIpAvailable));
    assert_eq!(log.calls(), vec!["ip.current"]);
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(store.save_call_count(), 0);
}

#[tokio::test]
async fn failed_baseline_write_after_update_is_fatal() {
    let log = CallLog::default();
    let provider = MockDnsProvider::new(&log);
    let store = MockStateStore::read_only(Some(ip("192.0.2.1")), &log);

    let engine = engine(FixedIpSource::new(ip("198.51.100.4"), &log), &provider, &store);
    let err = engine.check_and_update().await.unwrap_err();

    assert!(matches!(err, Error::StateStore(_)));
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.stored(), Some(ip("192.0.2.1")));
}
