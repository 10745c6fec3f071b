// # Marker Store Trait
//
// Defines the interface for persisting per-domain WHOIS-attempt timestamps.
//
// ## Purpose
//
// The marker store is the memory behind the 7-day expiry cadence: absence
// of a marker means "never checked, check now", and `record_attempt`
// overwrites unconditionally so a failed lookup still counts as this
// week's attempt (prevents retry storms against rate-limited WHOIS
// servers).
//
// ## Implementations
//
// - File-based: one timestamp file per domain (survives restarts)
// - In-memory: for tests and ephemeral runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filesystem-safe encoding of a domain for marker keys
///
/// Keeps `[A-Za-z0-9.-]`, replaces everything else with `_`.
pub fn marker_key(domain: &str) -> String {
    domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Trait for marker store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// Get the last WHOIS-attempt time for a domain
    ///
    /// `Ok(None)` means the domain has never been checked.
    async fn last_attempt(&self, domain: &str) -> crate::Result<Option<DateTime<Utc>>>;

    /// Record a WHOIS attempt, overwriting any previous marker
    async fn record_attempt(&self, domain: &str, at: DateTime<Utc>) -> crate::Result<()>;

    /// Delete the marker for one domain (missing marker is not an error)
    async fn clear(&self, domain: &str) -> crate::Result<()>;

    /// Delete all markers
    async fn clear_all(&self) -> crate::Result<()>;
}
