// # HTTP Status Probe
//
// `StatusProbe` implementation that issues `GET https://<domain>` and
// classifies the response.
//
// Only 2xx counts as up. Redirects are not followed and not treated as up
// either: a domain whose root suddenly redirects elsewhere is a signal
// worth alerting on, and following it would hide expired-domain parking
// redirects.

use std::time::Duration;

use async_trait::async_trait;
use domain_hc_core::traits::{ProbeOutcome, StatusProbe};
use domain_hc_core::{Error, Result};
use tracing::debug;

const USER_AGENT: &str = concat!("domain-hc/", env!("CARGO_PKG_VERSION"));

/// Probe over HTTPS
#[derive(Debug, Clone)]
pub struct HttpStatusProbe {
    client: reqwest::Client,
}

impl HttpStatusProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::other(format!("Failed to build probe client: {}", e)))?;
        Ok(Self { client })
    }

    /// Probe an explicit URL (tests use this to hit a local server)
    pub async fn probe_url(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("{} answered {}", url, status);
                if status.is_success() {
                    ProbeOutcome::Up {
                        status: status.as_u16(),
                    }
                } else {
                    ProbeOutcome::Down {
                        status: status.as_u16(),
                    }
                }
            }
            Err(e) => ProbeOutcome::Unreachable {
                reason: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl StatusProbe for HttpStatusProbe {
    async fn probe(&self, domain: &str) -> ProbeOutcome {
        self.probe_url(&format!("https://{}", domain)).await
    }
}
