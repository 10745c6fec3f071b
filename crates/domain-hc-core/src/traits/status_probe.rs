// # Status Probe Trait
//
// Defines the interface for probing a domain's web reachability.
//
// A probe must never fail: a transport error (timeout, DNS failure,
// connection refused) is a classification, not an error, and renders as
// the sentinel status `000` when reported to the check service.

use async_trait::async_trait;

/// Classified result of a reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// HTTP response with a 2xx status code
    Up { status: u16 },
    /// HTTP response with any other status code
    Down { status: u16 },
    /// No HTTP response at all (timeout, DNS failure, connection refused)
    Unreachable { reason: String },
}

impl ProbeOutcome {
    /// Render the status for ping payloads; `000` is the no-response sentinel
    pub fn status_field(&self) -> String {
        match self {
            ProbeOutcome::Up { status } | ProbeOutcome::Down { status } => status.to_string(),
            ProbeOutcome::Unreachable { .. } => "000".to_string(),
        }
    }
}

/// Trait for status probe implementations
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Probe `https://<domain>` and classify the outcome
    ///
    /// Infallible by contract: every failure mode maps to a variant.
    async fn probe(&self, domain: &str) -> ProbeOutcome;
}
