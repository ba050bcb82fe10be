// # ddns-core
//
// Core library for the one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for discovering the external IP
// - **DnsProvider**: Trait for updating the managed DNS record
// - **StateStore**: Trait for persisting the baseline IP between runs
// - **DdnsEngine**: Reconciler that runs one IP check → DNS update pass
// - **UpdaterConfig**: Immutable configuration built at process entry
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Run-to-completion**: One pass per invocation, scheduling is external
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: The baseline only advances after a successful update

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod ip;
pub mod state;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, StateStore, UpdateResult};
pub use engine::{CheckOutcome, DdnsEngine};
pub use config::UpdaterConfig;
pub use error::{Error, Result};
pub use ip::PublicIp;
pub use state::{MemoryStateStore, FileStateStore};
