//! Configuration types for the domain monitoring system
//!
//! Configuration is loaded once at the boundary (the CLI reads the process
//! environment) and passed into the engine and collaborators as an explicit
//! struct. Core logic never reads the environment itself.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main domain-hc configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct HcConfig {
    /// Base URL of the management REST API (e.g. `https://healthchecks.io/api/v3/`)
    pub api_url: String,

    /// Bearer credential for all management API calls
    pub api_key: String,

    /// Base URL of the ping service (e.g. `https://hc-ping.com`)
    pub ping_url: String,

    /// Path to the domain registry file
    pub domain_file: PathBuf,

    /// Directory holding per-domain expiry markers
    pub marker_dir: PathBuf,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for HcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HcConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<REDACTED>")
            .field("ping_url", &self.ping_url)
            .field("domain_file", &self.domain_file)
            .field("marker_dir", &self.marker_dir)
            .field("engine", &self.engine)
            .finish()
    }
}

impl HcConfig {
    /// Validate the configuration
    ///
    /// Called before any network work; a failure here aborts the run.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }

        for (name, url) in [("API_URL", &self.api_url), ("BASE_URL", &self.ping_url)] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.domain_file.as_os_str().is_empty() {
            return Err(crate::Error::config("Domain file path cannot be empty"));
        }

        if self.marker_dir.as_os_str().is_empty() {
            return Err(crate::Error::config("Marker directory cannot be empty"));
        }

        self.engine.validate()
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Timeout for the per-domain HTTPS status probe (in seconds)
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,

    /// Timeout for a single WHOIS query (in seconds)
    #[serde(default = "default_whois_timeout_secs")]
    pub whois_timeout_secs: u64,

    /// Minimum interval between WHOIS attempts for the same domain (in days)
    ///
    /// WHOIS servers rate-limit aggressively; this cadence is a courtesy
    /// policy independent of the status-check cadence.
    #[serde(default = "default_expiry_interval_days")]
    pub expiry_interval_days: i64,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.status_timeout_secs == 0 {
            return Err(crate::Error::config("Status probe timeout must be > 0"));
        }
        if self.whois_timeout_secs == 0 {
            return Err(crate::Error::config("WHOIS timeout must be > 0"));
        }
        if self.expiry_interval_days <= 0 {
            return Err(crate::Error::config("Expiry check interval must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_timeout_secs: default_status_timeout_secs(),
            whois_timeout_secs: default_whois_timeout_secs(),
            expiry_interval_days: default_expiry_interval_days(),
        }
    }
}

fn default_status_timeout_secs() -> u64 {
    10
}

fn default_whois_timeout_secs() -> u64 {
    30
}

fn default_expiry_interval_days() -> i64 {
    7
}
