// # WHOIS Lookup Trait
//
// Fetches raw WHOIS text for a domain. Parsing of the text (expiry date,
// registrar) is owned by `crate::expiry`; implementations only do network.

use async_trait::async_trait;

/// Trait for WHOIS lookup implementations
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    /// Fetch the raw WHOIS response for a registrable domain
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Raw response text
    /// - `Err(Error::Lookup)`: Server unreachable, timed out, or refused
    async fn lookup(&self, domain: &str) -> crate::Result<String>;
}
