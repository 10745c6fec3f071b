// # Healthchecks Provider
//
// `CheckApi` implementation for Healthchecks.io and API-compatible
// self-hosted instances.
//
// ## Endpoints
//
// - Management API (`api_url`, authenticated with `X-Api-Key`):
//   `GET/POST checks/` and `DELETE checks/<uuid>`
// - Ping API (`ping_url`, unauthenticated, uuid is the credential):
//   `<uuid>` for success, `<uuid>/fail` for failure, `<uuid>/log` for logs
//
// ## Idempotent Creation
//
// Every created check carries a slug derived from the domain plus a kind
// suffix, and the request lists `slug` in `unique`. The service then
// returns the existing check instead of creating a duplicate, so re-running
// creation is safe.

use std::time::Duration;

use async_trait::async_trait;
use domain_hc_core::traits::{CheckApi, RemoteCheck};
use domain_hc_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Which of the two checks per domain is being addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Status,
    Expiry,
}

impl CheckKind {
    fn tag(self) -> &'static str {
        match self {
            CheckKind::Status => "status",
            CheckKind::Expiry => "domain",
        }
    }

    fn slug_suffix(self) -> &'static str {
        match self {
            CheckKind::Status => "-status",
            CheckKind::Expiry => "-domain",
        }
    }
}

/// Slug for a domain's check: lowercase, runs of non-alphanumerics
/// collapsed to single hyphens, kind suffix appended
fn slug(domain: &str, kind: CheckKind) -> String {
    let mut out = String::with_capacity(domain.len() + 8);
    let mut last_hyphen = false;
    for c in domain.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen && !out.is_empty() {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out.push_str(kind.slug_suffix());
    out
}

#[derive(Debug, Serialize)]
struct CreateCheckRequest<'a> {
    name: &'a str,
    slug: String,
    tags: &'a str,
    unique: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tz: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    grace: u64,
}

#[derive(Debug, Deserialize)]
struct ApiCheck {
    name: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    ping_url: Option<String>,
    #[serde(default)]
    update_url: Option<String>,
}

impl ApiCheck {
    /// The uuid, either from the field (read-write API keys) or from the
    /// last path segment of the ping or update url
    fn uuid(&self) -> Result<String> {
        if let Some(uuid) = &self.uuid {
            return Ok(uuid.clone());
        }
        for url in [&self.ping_url, &self.update_url].into_iter().flatten() {
            if let Some(segment) = url.trim_end_matches('/').rsplit('/').next() {
                if !segment.is_empty() {
                    return Ok(segment.to_string());
                }
            }
        }
        Err(Error::schema(format!(
            "Check '{}' has no uuid, ping_url or update_url",
            self.name
        )))
    }
}

#[derive(Debug, Deserialize)]
struct ChecksResponse {
    checks: Vec<ApiCheck>,
}

/// Healthchecks.io client
pub struct HealthchecksClient {
    api_url: String,
    api_key: String,
    ping_url: String,
    client: reqwest::Client,
}

impl HealthchecksClient {
    /// # Arguments
    ///
    /// - `api_url`: Management API base, e.g. `https://healthchecks.io/api/v3`
    /// - `api_key`: Project API key (sent as `X-Api-Key`)
    /// - `ping_url`: Ping base, e.g. `https://hc-ping.com`
    pub fn new(api_url: &str, api_key: &str, ping_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            ping_url: ping_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn map_status(&self, context: &str, status: reqwest::StatusCode) -> Error {
        match status.as_u16() {
            401 | 403 => Error::remote(format!(
                "{}: authentication rejected ({}), check the API key",
                context, status
            )),
            code => Error::remote(format!("{}: unexpected response status {}", context, code)),
        }
    }

    async fn create_check(&self, domain: &str, kind: CheckKind) -> Result<String> {
        let request = match kind {
            CheckKind::Status => CreateCheckRequest {
                name: domain,
                slug: slug(domain, kind),
                tags: kind.tag(),
                unique: ["slug"],
                // Expect a ping every five minutes
                schedule: Some("*/5 * * * *"),
                tz: Some("UTC"),
                timeout: None,
                grace: 3600,
            },
            CheckKind::Expiry => CreateCheckRequest {
                name: domain,
                slug: slug(domain, kind),
                tags: kind.tag(),
                unique: ["slug"],
                schedule: None,
                tz: None,
                // Expect a ping every week, one day of grace
                timeout: Some(604_800),
                grace: 86_400,
            },
        };

        let response = self
            .client
            .post(format!("{}/checks/", self.api_url))
            .header("X-Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Failed to create check for {}: {}", domain, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_status(&format!("Creating check for {}", domain), status));
        }

        let check: ApiCheck = response
            .json()
            .await
            .map_err(|e| Error::schema(format!("Invalid create-check response: {}", e)))?;
        let uuid = check.uuid()?;
        debug!("Check {} for {} is {}", kind.tag(), domain, uuid);
        Ok(uuid)
    }

    async fn ping(&self, uuid: &str, suffix: &str, payload: Option<&str>) -> Result<()> {
        let url = format!("{}/{}{}", self.ping_url, uuid, suffix);

        let response = match payload {
            // Bare success pings carry no body; everything else POSTs a
            // payload the service stores with the ping
            None if suffix.is_empty() => self.client.get(&url).send().await,
            _ => {
                self.client
                    .post(&url)
                    .body(payload.unwrap_or_default().to_string())
                    .send()
                    .await
            }
        }
        .map_err(|e| Error::remote(format!("Ping to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_status(&format!("Pinging {}", url), status));
        }
        Ok(())
    }
}

// The key never appears in logs
impl std::fmt::Debug for HealthchecksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthchecksClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"<REDACTED>")
            .field("ping_url", &self.ping_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CheckApi for HealthchecksClient {
    async fn list_checks(&self) -> Result<Vec<RemoteCheck>> {
        let response = self
            .client
            .get(format!("{}/checks/", self.api_url))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Failed to list checks: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_status("Listing checks", status));
        }

        let body: ChecksResponse = response
            .json()
            .await
            .map_err(|e| Error::schema(format!("Invalid checks response: {}", e)))?;

        body.checks
            .into_iter()
            .map(|check| {
                Ok(RemoteCheck {
                    uuid: check.uuid()?,
                    name: check.name.clone(),
                    tags: check.tags.clone(),
                    status: check.status.clone(),
                })
            })
            .collect()
    }

    async fn create_status_check(&self, domain: &str) -> Result<String> {
        self.create_check(domain, CheckKind::Status).await
    }

    async fn create_expiry_check(&self, domain: &str) -> Result<String> {
        self.create_check(domain, CheckKind::Expiry).await
    }

    async fn delete_check(&self, uuid: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/checks/{}", self.api_url, uuid))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Failed to delete check {}: {}", uuid, e)))?;

        let status = response.status();
        if status.as_u16() == 404 {
            warn!("Check {} was already gone", uuid);
            return Ok(());
        }
        if !status.is_success() {
            return Err(self.map_status(&format!("Deleting check {}", uuid), status));
        }
        Ok(())
    }

    async fn ping_success(&self, uuid: &str, payload: Option<&str>) -> Result<()> {
        self.ping(uuid, "", payload).await
    }

    async fn ping_failure(&self, uuid: &str, payload: &str) -> Result<()> {
        self.ping(uuid, "/fail", Some(payload)).await
    }

    async fn ping_log(&self, uuid: &str, payload: &str) -> Result<()> {
        self.ping(uuid, "/log", Some(payload)).await
    }
}
