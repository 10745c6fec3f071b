// # Staleness Tracker
//
// Decides whether a domain's expiry is due for a fresh WHOIS lookup, based
// on the last-attempt marker and a fixed interval (default 7 days).
//
// The interval applies to attempts, not successes: a failed lookup still
// consumes the week. WHOIS servers rate-limit aggressively, and a domain
// whose server keeps refusing must not be hammered on every run.

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::traits::MarkerStore;

/// Attempt-based throttle over a marker store
pub struct StalenessTracker {
    store: Box<dyn MarkerStore>,
    interval: Duration,
}

impl StalenessTracker {
    pub fn new(store: Box<dyn MarkerStore>, interval_days: i64) -> Self {
        Self {
            store,
            interval: Duration::days(interval_days),
        }
    }

    /// True when the domain has no marker or its marker is older than the
    /// interval
    pub async fn is_due(&self, domain: &str, now: DateTime<Utc>) -> Result<bool> {
        match self.store.last_attempt(domain).await? {
            None => Ok(true),
            Some(at) => Ok(now - at >= self.interval),
        }
    }

    pub async fn record_attempt(&self, domain: &str, at: DateTime<Utc>) -> Result<()> {
        self.store.record_attempt(domain, at).await
    }

    pub async fn clear(&self, domain: &str) -> Result<()> {
        self.store.clear(domain).await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear_all().await
    }
}

impl std::fmt::Debug for StalenessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StalenessTracker")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
