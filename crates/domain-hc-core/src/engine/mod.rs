// # Reconcile Engine
//
// Orchestrates the monitoring run and keeps the registry, the marker
// store, and the remote check service consistent with each other.
//
// ## Operations
//
// - `check_all`: probe every registered domain, ping its status check, and
//   refresh its expiry check when the weekly cadence says so
// - `create_missing` / `create_domain`: turn bare registry lines into
//   entries backed by remote checks
// - `remove_unused` / `remove_all`: delete remote checks that the registry
//   no longer (or should no longer) reference
//
// ## Failure Policy
//
// A monitoring run degrades, it does not abort: a failed ping, probe, or
// lookup for one domain is logged and the run continues with the next.
// Only operations that cannot proceed without remote state (listing the
// account's checks) fail the whole operation.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::expiry::{days_remaining, parse_expiry};
use crate::registry::{looks_like_domain, DomainEntry, DomainRegistry};
use crate::staleness::StalenessTracker;
use crate::traits::{CheckApi, MarkerStore, ProbeOutcome, RemoteCheck, StatusProbe, WhoisLookup};

/// Sub-domains (two or more dots) get no expiry check: the registration
/// belongs to the parent domain.
pub fn expiry_eligible(domain: &str) -> bool {
    domain.matches('.').count() < 2
}

/// The reconciliation engine
pub struct ReconcileEngine {
    api: Box<dyn CheckApi>,
    probe: Box<dyn StatusProbe>,
    whois: Box<dyn WhoisLookup>,
    tracker: StalenessTracker,
}

impl ReconcileEngine {
    pub fn new(
        api: Box<dyn CheckApi>,
        probe: Box<dyn StatusProbe>,
        whois: Box<dyn WhoisLookup>,
        markers: Box<dyn MarkerStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            api,
            probe,
            whois,
            tracker: StalenessTracker::new(markers, config.expiry_interval_days),
        }
    }

    /// Run one monitoring pass over every registry entry
    pub async fn check_all(&self, registry: &DomainRegistry) {
        let mut count = 0;
        for entry in registry.entries() {
            self.check_status(entry).await;
            self.check_expiry(entry).await;
            count += 1;
        }
        info!("Checked {} domains", count);
    }

    async fn check_status(&self, entry: &DomainEntry) {
        let outcome = self.probe.probe(&entry.domain).await;
        let result = match &outcome {
            ProbeOutcome::Up { status } => {
                debug!("{} is up ({})", entry.domain, status);
                self.api.ping_success(&entry.status_check, None).await
            }
            ProbeOutcome::Down { status } => {
                warn!("{} is down ({})", entry.domain, status);
                self.api
                    .ping_failure(&entry.status_check, &format!("status={}", status))
                    .await
            }
            ProbeOutcome::Unreachable { reason } => {
                warn!("{} is unreachable: {}", entry.domain, reason);
                self.api
                    .ping_failure(&entry.status_check, &format!("status={}", outcome.status_field()))
                    .await
            }
        };
        if let Err(e) = result {
            warn!("Status ping for {} failed: {}", entry.domain, e);
        }
    }

    async fn check_expiry(&self, entry: &DomainEntry) {
        let Some(expiry_check) = &entry.expiry_check else {
            return;
        };

        let now = Utc::now();
        let due = match self.tracker.is_due(&entry.domain, now).await {
            Ok(due) => due,
            Err(e) => {
                warn!("Marker lookup for {} failed, assuming due: {}", entry.domain, e);
                true
            }
        };
        if !due {
            debug!("Expiry for {} checked recently, skipping", entry.domain);
            return;
        }

        let lookup = self.whois.lookup(&entry.domain).await;

        // The attempt counts whether or not the lookup succeeded
        if let Err(e) = self.tracker.record_attempt(&entry.domain, now).await {
            warn!("Failed to record expiry attempt for {}: {}", entry.domain, e);
        }

        let parsed = match &lookup {
            Ok(raw) => parse_expiry(raw),
            Err(e) => {
                error!("WHOIS lookup for {} failed: {}", entry.domain, e);
                None
            }
        };

        let result = match parsed {
            Some(info) => {
                let days = days_remaining(info.expires_at, now);
                if days <= 0 {
                    error!("{} registration expired {} days ago", entry.domain, -days);
                    self.api
                        .ping_failure(expiry_check, &format!("status=expired&days_left={}", days))
                        .await
                } else {
                    info!("{} expires in {} days", entry.domain, days);
                    let payload = format!(
                        "status=ok&days_left={}&expiry_date={}",
                        days,
                        info.expires_at.format("%Y-%m-%d")
                    );
                    self.api.ping_success(expiry_check, Some(&payload)).await
                }
            }
            None => {
                error!("No expiry date found for {}", entry.domain);
                self.api.ping_log(expiry_check, "expiry_date=not found").await
            }
        };
        if let Err(e) = result {
            warn!("Expiry ping for {} failed: {}", entry.domain, e);
        }
    }

    /// Create checks for every bare domain line, returning how many domains
    /// were resolved
    ///
    /// A failure for one domain is logged and the rest still proceed; the
    /// registry is saved once at the end when anything changed.
    pub async fn create_missing(&self, registry: &mut DomainRegistry) -> Result<usize> {
        let mut resolved = 0;
        for domain in registry.pending() {
            if registry.find(&domain).is_some() {
                warn!("{} already registered, skipping duplicate line", domain);
                continue;
            }
            match self.create_checks(&domain).await {
                Ok(entry) => {
                    registry.resolve_pending(&domain, entry);
                    resolved += 1;
                }
                Err(e) => {
                    error!("Failed to create checks for {}: {}", domain, e);
                }
            }
        }

        if resolved > 0 {
            registry.save().await?;
        }
        info!("Created checks for {} domains", resolved);
        Ok(resolved)
    }

    /// Register a single domain, creating its checks and appending it
    ///
    /// Returns false when the domain is already registered. A token that
    /// would not reload as a domain line is rejected before any remote call.
    pub async fn create_domain(&self, registry: &mut DomainRegistry, domain: &str) -> Result<bool> {
        if !looks_like_domain(domain) {
            return Err(Error::registry(format!(
                "'{}' is not a valid domain name",
                domain
            )));
        }
        if registry.find(domain).is_some() {
            info!("{} is already registered", domain);
            return Ok(false);
        }
        let entry = self.create_checks(domain).await?;
        registry.resolve_pending(domain, entry);
        registry.save().await?;
        Ok(true)
    }

    async fn create_checks(&self, domain: &str) -> Result<DomainEntry> {
        let status_check = self.api.create_status_check(domain).await?;
        let expiry_check = if expiry_eligible(domain) {
            Some(self.api.create_expiry_check(domain).await?)
        } else {
            debug!("{} is a sub-domain, no expiry check", domain);
            None
        };
        info!("Created checks for {}", domain);
        Ok(DomainEntry {
            domain: domain.to_string(),
            status_check,
            expiry_check,
        })
    }

    /// Delete remote checks the registry no longer references
    ///
    /// Listing is fatal (nothing can be reconciled without it); individual
    /// deletions are best-effort. Returns the number of checks deleted.
    pub async fn remove_unused(&self, registry: &DomainRegistry) -> Result<usize> {
        let checks = self.api.list_checks().await?;

        let referenced: std::collections::HashSet<&str> = registry
            .entries()
            .flat_map(|entry| {
                std::iter::once(entry.status_check.as_str()).chain(entry.expiry_check.as_deref())
            })
            .collect();

        let mut deleted = 0;
        for check in &checks {
            if referenced.contains(check.uuid.as_str()) {
                continue;
            }
            match self.api.delete_check(&check.uuid).await {
                Ok(()) => {
                    info!("Deleted unused check {} ({})", check.name, check.uuid);
                    deleted += 1;
                }
                Err(e) => {
                    warn!("Failed to delete check {}: {}", check.uuid, e);
                }
            }
        }
        info!("Deleted {} unused checks", deleted);
        Ok(deleted)
    }

    /// Delete every remote check and drop all registry entries
    ///
    /// Comments and blank lines in the registry file survive. Returns the
    /// number of checks deleted.
    pub async fn remove_all(&self, registry: &mut DomainRegistry) -> Result<usize> {
        let checks = self.api.list_checks().await?;

        let mut deleted = 0;
        for check in &checks {
            match self.api.delete_check(&check.uuid).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!("Failed to delete check {}: {}", check.uuid, e);
                }
            }
        }

        registry.clear_entries();
        registry.save().await?;
        info!("Deleted {} checks and cleared the registry", deleted);
        Ok(deleted)
    }

    /// List every check on the account
    pub async fn list_checks(&self) -> Result<Vec<RemoteCheck>> {
        self.api.list_checks().await
    }

    /// Clear expiry markers, for one domain or all of them
    pub async fn clear_markers(&self, domain: Option<&str>) -> Result<()> {
        match domain {
            Some(domain) => {
                self.tracker.clear(domain).await?;
                info!("Cleared expiry marker for {}", domain);
            }
            None => {
                self.tracker.clear_all().await?;
                info!("Cleared all expiry markers");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReconcileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
