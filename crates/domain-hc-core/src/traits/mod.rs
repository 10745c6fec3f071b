//! Collaborator traits consumed by the reconciliation engine
//!
//! Network integrations (check service, status probe, WHOIS) live behind
//! these traits so the engine can be exercised with test doubles and so
//! implementations stay isolated from scheduling decisions.

pub mod check_api;
pub mod marker_store;
pub mod status_probe;
pub mod whois;

pub use check_api::{CheckApi, RemoteCheck};
pub use marker_store::{MarkerStore, marker_key};
pub use status_probe::{ProbeOutcome, StatusProbe};
pub use whois::WhoisLookup;
