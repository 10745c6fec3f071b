// # WHOIS Expiry Parsing
//
// Extracts the registration expiry date (and, opportunistically, the
// registrar name) from raw WHOIS text.
//
// WHOIS output is not standardized. Registries label the expiry date a
// dozen different ways and format the value a dozen more, so parsing is a
// pass over known label patterns followed by a pass over known date
// formats. An unrecognized response yields `None`, never an error: the
// caller reports "not found" rather than failing the run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Expiry details extracted from a WHOIS response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryInfo {
    /// Registration expiry, normalized to UTC
    pub expires_at: DateTime<Utc>,
    /// Sponsoring registrar, when the response names one
    pub registrar: Option<String>,
}

const EXPIRY_LABELS: &[&str] = &[
    r"(?im)^\s*Registry Expiry Date:[ \t]*(.+)$",
    r"(?im)^\s*Registrar Registration Expiration Date:[ \t]*(.+)$",
    r"(?im)^\s*Expiration Date:[ \t]*(.+)$",
    r"(?im)^\s*Expiry Date:[ \t]*(.+)$",
    r"(?im)^\s*Expires On:[ \t]*(.+)$",
    r"(?im)^\s*Expires:[ \t]*(.+)$",
    r"(?im)^\s*Expire Date:[ \t]*(.+)$",
    r"(?im)^\s*paid-till:[ \t]*(.+)$",
    r"(?im)^\s*Renewal date:[ \t]*(.+)$",
];

const REGISTRAR_LABELS: &[&str] = &[
    r"(?im)^\s*Registrar:[ \t]*(.+)$",
    r"(?im)^\s*Registrar Name:[ \t]*(.+)$",
    r"(?im)^\s*Sponsoring Registrar:[ \t]*(.+)$",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y%m%d",
];

fn compiled(patterns: &'static [&'static str], cell: &'static OnceLock<Vec<Regex>>) -> &'static [Regex] {
    cell.get_or_init(|| {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("label pattern is valid"))
            .collect()
    })
}

fn extract_field(raw: &str, patterns: &'static [&'static str], cell: &'static OnceLock<Vec<Regex>>) -> Option<String> {
    for re in compiled(patterns, cell) {
        if let Some(caps) = re.captures(raw) {
            let value = caps.get(1)?.as_str().trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse a WHOIS response into expiry details
///
/// Returns `None` when no recognized expiry label is present or the value
/// does not parse as a date.
pub fn parse_expiry(raw: &str) -> Option<ExpiryInfo> {
    static EXPIRY_RE: OnceLock<Vec<Regex>> = OnceLock::new();
    static REGISTRAR_RE: OnceLock<Vec<Regex>> = OnceLock::new();

    let value = extract_field(raw, EXPIRY_LABELS, &EXPIRY_RE)?;
    let expires_at = parse_date(&value)?;
    let registrar = extract_field(raw, REGISTRAR_LABELS, &REGISTRAR_RE);

    Some(ExpiryInfo {
        expires_at,
        registrar,
    })
}

/// Parse one date value in any of the known WHOIS formats
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    // Some registries hand out UNIX timestamps
    if value.chars().all(|c| c.is_ascii_digit()) && value.len() >= 9 && value.len() <= 11 {
        if let Ok(secs) = value.parse::<i64>() {
            if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                return Some(dt);
            }
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    // Full RFC 3339 with offset, e.g. `2030-01-15T00:00:00+00:00`
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

/// Whole days until expiry, negative once past
pub fn days_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_days()
}
