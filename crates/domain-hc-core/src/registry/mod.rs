// # Domain Registry
//
// Line-oriented registry file mapping each monitored domain to its remote
// check identifiers.
//
// ## File Format
//
// ```text
// # comment line, preserved verbatim
// example.com s:a1b2c3 e:d4e5f6
// sub.example.com s:a7b8c9
// newdomain.org
// ```
//
// - `s:` status check id, required once created; `e:` expiry check id,
//   optional (absent for sub-domains)
// - A bare domain token is a pending entry: `create` fills in its ids
// - Comments and blank lines are preserved byte-for-byte on write-back
// - Any other line logs a warning, is ignored by operations, and is still
//   preserved on write-back — a malformed line never blocks monitoring of
//   the well-formed ones
//
// ## Durability
//
// `save()` writes to a temporary file and atomically renames it over the
// registry file, so a crash mid-write never leaves a truncated registry.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// A registered domain and its remote check identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    /// Fully-qualified domain name; primary key, unique within the registry
    pub domain: String,
    /// Identifier of the status check (pinged every run)
    pub status_check: String,
    /// Identifier of the expiry check (absent for sub-domains)
    pub expiry_check: Option<String>,
}

impl DomainEntry {
    fn to_line(&self) -> String {
        match &self.expiry_check {
            Some(expiry) => format!("{} s:{} e:{}", self.domain, self.status_check, expiry),
            None => format!("{} s:{}", self.domain, self.status_check),
        }
    }
}

/// One line of the registry file, in original order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Comment, blank, or unparseable line — preserved verbatim
    Raw(String),
    /// A bare domain awaiting check creation
    Pending(String),
    /// A well-formed registry entry
    Entry(DomainEntry),
}

/// The domain registry file, held in memory for the duration of one operation
///
/// The registry exclusively owns the parsed line sequence; the engine
/// borrows it per operation and persists mutations back via [`save`].
///
/// [`save`]: DomainRegistry::save
#[derive(Debug)]
pub struct DomainRegistry {
    path: PathBuf,
    lines: Vec<Line>,
    /// Whether the loaded file ended with a newline; reproduced on save so
    /// the round-trip stays byte-for-byte
    trailing_newline: bool,
}

impl DomainRegistry {
    /// Load the registry from a file
    ///
    /// A missing file yields an empty registry with a warning (first run).
    /// Malformed lines are warned about and kept as raw text.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Registry file {} not found, starting empty", path.display());
                String::new()
            }
            Err(e) => {
                return Err(Error::registry(format!(
                    "Failed to read registry file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| Self::parse_line(idx + 1, line))
            .collect();
        let trailing_newline = content.is_empty() || content.ends_with('\n');

        Ok(Self {
            path,
            lines,
            trailing_newline,
        })
    }

    /// Create an empty registry bound to a path (used by tests and first runs)
    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: Vec::new(),
            trailing_newline: true,
        }
    }

    fn parse_line(line_num: usize, line: &str) -> Line {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Line::Raw(line.to_string());
        }

        let mut tokens = trimmed.split_whitespace();
        let domain = tokens.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = tokens.collect();

        if rest.is_empty() {
            if looks_like_domain(&domain) {
                return Line::Pending(domain);
            }
            tracing::warn!("Skipping invalid registry line {}: '{}'", line_num, trimmed);
            return Line::Raw(line.to_string());
        }

        let mut status_check = None;
        let mut expiry_check = None;
        for token in &rest {
            if let Some(id) = token.strip_prefix("s:") {
                status_check = Some(id.to_string());
            } else if let Some(id) = token.strip_prefix("e:") {
                expiry_check = Some(id.to_string());
            }
        }

        // An entry is well-formed only with a non-empty status id
        match status_check {
            Some(id) if !id.is_empty() && looks_like_domain(&domain) => Line::Entry(DomainEntry {
                domain,
                status_check: id,
                expiry_check: expiry_check.filter(|e| !e.is_empty()),
            }),
            _ => {
                tracing::warn!("Skipping invalid registry line {}: '{}'", line_num, trimmed);
                Line::Raw(line.to_string())
            }
        }
    }

    /// Write all lines back in original order, atomically
    ///
    /// Writes to `<path>.tmp`, flushes, then renames over the registry file.
    pub async fn save(&self) -> Result<()> {
        let mut buf = String::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                buf.push('\n');
            }
            match line {
                Line::Raw(raw) => buf.push_str(raw),
                Line::Pending(domain) => buf.push_str(domain),
                Line::Entry(entry) => buf.push_str(&entry.to_line()),
            }
        }
        if self.trailing_newline && !self.lines.is_empty() {
            buf.push('\n');
        }

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::registry(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(buf.as_bytes()).await.map_err(|e| {
                Error::registry(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.flush().await.map_err(|e| {
                Error::registry(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::registry(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("Registry written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    /// The path this registry was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All lines in original order
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Well-formed entries, in registry order
    pub fn entries(&self) -> impl Iterator<Item = &DomainEntry> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    /// Bare domains awaiting check creation, in registry order
    pub fn pending(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Pending(domain) => Some(domain.clone()),
                _ => None,
            })
            .collect()
    }

    /// Find an entry by exact domain match
    pub fn find(&self, domain: &str) -> Option<&DomainEntry> {
        self.entries().find(|entry| entry.domain == domain)
    }

    /// Append a new entry at the end of the file
    pub fn append(&mut self, entry: DomainEntry) {
        self.lines.push(Line::Entry(entry));
    }

    /// Replace the pending line for `domain` with its entry, preserving order
    ///
    /// Falls back to appending when no pending line exists.
    pub fn resolve_pending(&mut self, domain: &str, entry: DomainEntry) {
        for line in &mut self.lines {
            if matches!(line, Line::Pending(d) if d == domain) {
                *line = Line::Entry(entry);
                return;
            }
        }
        self.append(entry);
    }

    /// Remove the entry (or pending line) for a domain
    ///
    /// Returns true when something was removed.
    pub fn remove(&mut self, domain: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| match line {
            Line::Entry(entry) => entry.domain != domain,
            Line::Pending(d) => d != domain,
            Line::Raw(_) => true,
        });
        self.lines.len() != before
    }

    /// Drop all entries and pending domains, keeping comments and blanks
    pub fn clear_entries(&mut self) {
        self.lines.retain(|line| matches!(line, Line::Raw(_)));
    }

    /// Number of well-formed entries
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// True when the registry holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape check shared by the parser and by operations that accept a domain
/// from outside the file (a token with a dot and only `[A-Za-z0-9.-]`)
pub fn looks_like_domain(token: &str) -> bool {
    token.contains('.')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}
