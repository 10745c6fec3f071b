// # Check API Trait
//
// Defines the interface to the remote check service (Healthchecks.io or
// compatible). The engine consumes exactly these operations; everything
// else the service offers is out of scope.
//
// ## Contract
//
// - `create_*_check` must be idempotent per domain: the slug derived from
//   the domain carries a uniqueness constraint on the remote side, and the
//   engine additionally pre-checks the loaded registry before creating.
// - `delete_check` is best-effort; the engine logs a failure and continues
//   a bulk operation.
// - Pings are fire-and-forget; the engine never aborts a run because a
//   single ping failed.
//
// ## Trust Level
//
// Implementations perform single-shot API calls only. Retry, scheduling and
// staleness decisions are owned by `ReconcileEngine`; implementations must
// not cache state or spawn background tasks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A check as known to the remote service (referenced, never owned locally)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCheck {
    /// Opaque identifier assigned by the service
    pub uuid: String,
    /// Human-readable name (the domain, for checks this system created)
    pub name: String,
    /// Classification tags (`status` or `domain`)
    pub tags: String,
    /// Current check status as reported by the service, if available
    pub status: Option<String>,
}

/// Trait for remote check service implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait CheckApi: Send + Sync {
    /// List every check on the account
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<RemoteCheck>)`: All checks
    /// - `Err(Error::RemoteUnavailable)`: Network or auth failure — fatal
    ///   for the calling operation, since reconciliation needs the full list
    /// - `Err(Error::Schema)`: The response did not match the expected shape
    async fn list_checks(&self) -> crate::Result<Vec<RemoteCheck>>;

    /// Create a status check for a domain, returning its uuid
    ///
    /// Idempotent by slug (`<domain-slug>-status`); calling twice for the
    /// same domain must not create duplicates on the remote side.
    async fn create_status_check(&self, domain: &str) -> crate::Result<String>;

    /// Create an expiry check for a domain, returning its uuid
    ///
    /// Same idempotency contract, slug suffix `-domain`, weekly schedule.
    async fn create_expiry_check(&self, domain: &str) -> crate::Result<String>;

    /// Delete a check by uuid (best-effort; a missing check is not an error)
    async fn delete_check(&self, uuid: &str) -> crate::Result<()>;

    /// Signal success, optionally carrying a payload
    async fn ping_success(&self, uuid: &str, payload: Option<&str>) -> crate::Result<()>;

    /// Signal failure with a payload describing the outcome
    async fn ping_failure(&self, uuid: &str, payload: &str) -> crate::Result<()>;

    /// Attach a log entry to a check without changing its status
    async fn ping_log(&self, uuid: &str, payload: &str) -> crate::Result<()>;
}
