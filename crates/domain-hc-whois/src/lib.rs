// # WHOIS Lookup
//
// `WhoisLookup` implementation over raw TCP port 43.
//
// ## Referral Chain
//
// Every lookup starts at the IANA root (`whois.iana.org`), which answers
// with a `refer:` line naming the TLD registry. Registry responses in turn
// often name the sponsoring registrar's server (`Registrar WHOIS Server:`),
// whose answer usually carries the richest expiry data. The chain is
// bounded by a depth limit and a visited set against referral loops.
//
// The returned text is the LAST response in the chain; parsing it is the
// caller's concern.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use domain_hc_core::traits::WhoisLookup;
use domain_hc_core::{Error, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

const WHOIS_PORT: u16 = 43;
const IANA_SERVER: &str = "whois.iana.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;
const MAX_REFERRAL_DEPTH: u8 = 3;

/// WHOIS client speaking the plain query protocol
#[derive(Debug, Clone)]
pub struct WhoisTcpLookup {
    timeout: Duration,
}

impl Default for WhoisTcpLookup {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl WhoisTcpLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn lookup_with_referrals(&self, domain: &str) -> Result<String> {
        let mut server = IANA_SERVER.to_string();
        let mut visited: HashSet<String> = HashSet::new();
        let mut response = String::new();

        for depth in 0..=MAX_REFERRAL_DEPTH {
            if !visited.insert(server.to_lowercase()) {
                warn!("Circular WHOIS referral at {}, stopping", server);
                break;
            }

            debug!("Querying WHOIS server {} (depth {})", server, depth);
            response = self.query_server(&server, domain).await?;

            match extract_referral(&response) {
                Some(referral) if !visited.contains(&referral.to_lowercase()) => {
                    debug!("Following referral to {}", referral);
                    server = referral;
                }
                _ => break,
            }
        }

        Ok(response)
    }

    async fn query_server(&self, server: &str, query: &str) -> Result<String> {
        let addr = format!("{}:{}", server, WHOIS_PORT);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::lookup(format!("Connection to {} timed out", server)))?
            .map_err(|e| Error::lookup(format!("Failed to connect to {}: {}", server, e)))?;

        let query_bytes = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_bytes.as_bytes()))
            .await
            .map_err(|_| Error::lookup(format!("Write to {} timed out", server)))?
            .map_err(|e| Error::lookup(format!("Failed to send query to {}: {}", server, e)))?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(Error::lookup(format!(
                            "Response from {} exceeds {} bytes",
                            server, MAX_RESPONSE_SIZE
                        )));
                    }
                }
                Ok(Err(e)) => {
                    return Err(Error::lookup(format!("Read error from {}: {}", server, e)));
                }
                Err(_) => {
                    // Some servers never close the connection; partial data
                    // is still usable
                    if !response.is_empty() {
                        break;
                    }
                    return Err(Error::lookup(format!("Read from {} timed out", server)));
                }
            }
        }

        // UTF-8 with a Latin-1 fallback; WHOIS predates both
        Ok(String::from_utf8(response.clone())
            .unwrap_or_else(|_| response.iter().map(|&c| c as char).collect()))
    }
}

#[async_trait]
impl WhoisLookup for WhoisTcpLookup {
    async fn lookup(&self, domain: &str) -> Result<String> {
        let domain = normalize_domain(domain)?;
        self.lookup_with_referrals(&domain).await
    }
}

fn normalize_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().to_lowercase();

    let domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(&domain);
    let domain = domain.split('/').next().unwrap_or(domain);
    let domain = domain.strip_prefix("www.").unwrap_or(domain);

    if domain.is_empty() || !domain.contains('.') {
        return Err(Error::lookup(format!("Invalid domain '{}'", domain)));
    }
    let valid = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(Error::lookup(format!("Invalid domain '{}'", domain)));
    }

    Ok(domain.to_string())
}

fn extract_referral(response: &str) -> Option<String> {
    // `[ \t]*` and not `\s*`: an empty field must not swallow the newline
    // and capture the following line
    let patterns = [
        r"(?i)^\s*refer:[ \t]*(.+)$",
        r"(?i)Registrar WHOIS Server:[ \t]*(.+)",
        r"(?i)Whois Server:[ \t]*(.+)",
        r"(?i)ReferralServer:[ \t]*whois://(.+)",
    ];

    for pattern in &patterns {
        let re = regex::RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .ok()?;
        if let Some(caps) = re.captures(response) {
            let server = caps.get(1)?.as_str().trim().to_lowercase();
            // Some registrars leave the field present but empty
            if !server.is_empty() && server.contains('.') {
                return Some(server);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com").unwrap(), "example.com");
        assert_eq!(normalize_domain("EXAMPLE.COM").unwrap(), "example.com");
        assert_eq!(
            normalize_domain("https://www.example.com/path").unwrap(),
            "example.com"
        );
        assert!(normalize_domain("invalid").is_err());
        assert!(normalize_domain("bad domain.com").is_err());
    }

    #[test]
    fn test_extract_iana_referral() {
        let response = "domain:       EXAMPLE.COM\nrefer:        whois.verisign-grs.com\n";
        assert_eq!(
            extract_referral(response),
            Some("whois.verisign-grs.com".to_string())
        );
    }

    #[test]
    fn test_extract_registrar_referral() {
        let response = "Domain Name: EXAMPLE.COM\nRegistrar WHOIS Server: whois.registrar.example\n";
        assert_eq!(
            extract_referral(response),
            Some("whois.registrar.example".to_string())
        );
    }

    #[test]
    fn test_empty_referral_field_is_ignored() {
        let response = "Registrar WHOIS Server:\nRegistrar: Example Inc.\n";
        assert_eq!(extract_referral(response), None);
    }

    #[test]
    fn test_no_referral() {
        assert_eq!(extract_referral("Registrar: Example Inc.\n"), None);
    }
}
