// Shared mock implementations for engine contract tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_hc_core::traits::{CheckApi, MarkerStore, ProbeOutcome, RemoteCheck, StatusProbe, WhoisLookup};
use domain_hc_core::{Error, MemoryMarkerStore, Result};

/// Check API mock that records every call and returns deterministic uuids
#[derive(Clone, Default)]
pub struct RecordingCheckApi {
    pub checks: Arc<Mutex<Vec<RemoteCheck>>>,
    pub created: Arc<Mutex<Vec<(String, String)>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
    pub success_pings: Arc<Mutex<Vec<(String, Option<String>)>>>,
    pub failure_pings: Arc<Mutex<Vec<(String, String)>>>,
    pub log_pings: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_creates: Arc<Mutex<Vec<String>>>,
    pub fail_list: Arc<Mutex<bool>>,
}

impl RecordingCheckApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checks(checks: Vec<RemoteCheck>) -> Self {
        let api = Self::new();
        *api.checks.lock().unwrap() = checks;
        api
    }

    pub fn check(uuid: &str, name: &str, tags: &str) -> RemoteCheck {
        RemoteCheck {
            uuid: uuid.to_string(),
            name: name.to_string(),
            tags: tags.to_string(),
            status: Some("up".to_string()),
        }
    }
}

#[async_trait]
impl CheckApi for RecordingCheckApi {
    async fn list_checks(&self) -> Result<Vec<RemoteCheck>> {
        if *self.fail_list.lock().unwrap() {
            return Err(Error::remote("list failed"));
        }
        Ok(self.checks.lock().unwrap().clone())
    }

    async fn create_status_check(&self, domain: &str) -> Result<String> {
        if self.fail_creates.lock().unwrap().contains(&domain.to_string()) {
            return Err(Error::remote(format!("create failed for {}", domain)));
        }
        self.created
            .lock()
            .unwrap()
            .push((domain.to_string(), "status".to_string()));
        Ok(format!("{}-status-uuid", domain))
    }

    async fn create_expiry_check(&self, domain: &str) -> Result<String> {
        if self.fail_creates.lock().unwrap().contains(&domain.to_string()) {
            return Err(Error::remote(format!("create failed for {}", domain)));
        }
        self.created
            .lock()
            .unwrap()
            .push((domain.to_string(), "expiry".to_string()));
        Ok(format!("{}-expiry-uuid", domain))
    }

    async fn delete_check(&self, uuid: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(uuid.to_string());
        Ok(())
    }

    async fn ping_success(&self, uuid: &str, payload: Option<&str>) -> Result<()> {
        self.success_pings
            .lock()
            .unwrap()
            .push((uuid.to_string(), payload.map(str::to_string)));
        Ok(())
    }

    async fn ping_failure(&self, uuid: &str, payload: &str) -> Result<()> {
        self.failure_pings
            .lock()
            .unwrap()
            .push((uuid.to_string(), payload.to_string()));
        Ok(())
    }

    async fn ping_log(&self, uuid: &str, payload: &str) -> Result<()> {
        self.log_pings
            .lock()
            .unwrap()
            .push((uuid.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Probe mock with per-domain outcomes; unknown domains are up with 200
#[derive(Clone, Default)]
pub struct MockProbe {
    outcomes: Arc<Mutex<HashMap<String, ProbeOutcome>>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, domain: &str, outcome: ProbeOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(domain.to_string(), outcome);
    }
}

#[async_trait]
impl StatusProbe for MockProbe {
    async fn probe(&self, domain: &str) -> ProbeOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or(ProbeOutcome::Up { status: 200 })
    }
}

/// WHOIS mock returning fixed text or an error
#[derive(Clone)]
pub enum MockWhois {
    Text(String),
    Fail,
}

#[async_trait]
impl WhoisLookup for MockWhois {
    async fn lookup(&self, domain: &str) -> Result<String> {
        match self {
            MockWhois::Text(raw) => Ok(raw.clone()),
            MockWhois::Fail => Err(Error::lookup(format!("lookup failed for {}", domain))),
        }
    }
}

/// Marker store wrapper counting `record_attempt` calls
#[derive(Clone, Default)]
pub struct CountingMarkerStore {
    inner: MemoryMarkerStore,
    pub records: Arc<AtomicUsize>,
}

impl CountingMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarkerStore for CountingMarkerStore {
    async fn last_attempt(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        self.inner.last_attempt(domain).await
    }

    async fn record_attempt(&self, domain: &str, at: DateTime<Utc>) -> Result<()> {
        self.records.fetch_add(1, Ordering::SeqCst);
        self.inner.record_attempt(domain, at).await
    }

    async fn clear(&self, domain: &str) -> Result<()> {
        self.inner.clear(domain).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.inner.clear_all().await
    }
}
