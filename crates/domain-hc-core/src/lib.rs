// # domain-hc-core
//
// Core library for the domain monitoring system.
//
// ## Architecture Overview
//
// This library provides the reconciliation core for domain monitoring:
// - **CheckApi**: Trait for the remote check service (create/delete/list/ping)
// - **StatusProbe**: Trait for probing a domain's HTTPS reachability
// - **WhoisLookup**: Trait for fetching raw WHOIS text
// - **MarkerStore**: Trait for persisted last-attempt timestamps (staleness)
// - **DomainRegistry**: The local registry file of domain-to-check mappings
// - **ReconcileEngine**: Orchestrates check cycles and bulk reconciliation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Network collaborators live behind traits;
//    the engine owns all scheduling and reconciliation decisions
// 2. **Failure Isolation**: One domain's failure never stops the run
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Durability**: Registry writes are atomic (write-then-rename)

pub mod config;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod markers;
pub mod registry;
pub mod staleness;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, HcConfig};
pub use engine::ReconcileEngine;
pub use error::{Error, Result};
pub use markers::{FileMarkerStore, MemoryMarkerStore};
pub use registry::{DomainEntry, DomainRegistry, Line};
pub use staleness::StalenessTracker;
pub use traits::{CheckApi, MarkerStore, ProbeOutcome, RemoteCheck, StatusProbe, WhoisLookup};
