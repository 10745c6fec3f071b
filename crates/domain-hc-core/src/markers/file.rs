// # File Marker Store
//
// Persists per-domain WHOIS-attempt timestamps as individual files under a
// marker directory.
//
// ## Layout
//
// ```text
// <marker_dir>/expiry_check_<key>
// ```
//
// where `<key>` is the filesystem-safe encoding of the domain and the file
// content is an RFC 3339 timestamp. Using the file content rather than the
// file's mtime keeps the marker meaningful across copies and backups.
//
// Unreadable or unparseable marker content is treated as "never checked"
// with a warning, so a corrupted marker triggers a fresh lookup instead of
// wedging the cadence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::error::{Error, Result};
use crate::traits::{marker_key, MarkerStore};

const MARKER_PREFIX: &str = "expiry_check_";

/// File-backed marker store
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    dir: PathBuf,
}

impl FileMarkerStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn marker_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{}{}", MARKER_PREFIX, marker_key(domain)))
    }
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn last_attempt(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        let path = self.marker_path(domain);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::marker_store(format!(
                    "Failed to read marker {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        match DateTime::parse_from_rfc3339(content.trim()) {
            Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparseable marker {} ('{}'): {}",
                    path.display(),
                    content.trim(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn record_attempt(&self, domain: &str, at: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::marker_store(format!(
                "Failed to create marker directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.marker_path(domain);
        fs::write(&path, at.to_rfc3339()).await.map_err(|e| {
            Error::marker_store(format!("Failed to write marker {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    async fn clear(&self, domain: &str) -> Result<()> {
        let path = self.marker_path(domain);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::marker_store(format!(
                "Failed to remove marker {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(Error::marker_store(format!(
                    "Failed to read marker directory {}: {}",
                    self.dir.display(),
                    e
                )));
            }
        };

        while let Some(item) = dir.next_entry().await.map_err(|e| {
            Error::marker_store(format!(
                "Failed to iterate marker directory {}: {}",
                self.dir.display(),
                e
            ))
        })? {
            let name = item.file_name();
            if name.to_string_lossy().starts_with(MARKER_PREFIX) {
                if let Err(e) = fs::remove_file(item.path()).await {
                    tracing::warn!("Failed to remove marker {}: {}", item.path().display(), e);
                }
            }
        }
        Ok(())
    }
}
