//! Freshness records
//!
//! Every cached blob has a sidecar `<blob>.info` JSON file holding the time of
//! its last successful refresh:
//!
//! ```json
//! {"lastUpdateTimestamp": 1700000000000}
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

/// Suffix appended to a blob path to get its sidecar
pub const INFO_SUFFIX: &str = ".info";

/// Errors that can occur while reading or writing a record
#[derive(Debug, Error)]
pub enum RecordError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Sidecar contents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreshnessRecord {
    /// Last refresh, Unix epoch milliseconds
    #[serde(rename = "lastUpdateTimestamp")]
    pub last_update_timestamp: i64,
}

impl FreshnessRecord {
    pub fn now() -> Self {
        Self {
            last_update_timestamp: now_millis(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        write_json(path, self)
    }

    /// Whether the record is younger than `ttl`
    pub fn is_within(&self, ttl: Duration) -> bool {
        is_within_ttl(self.last_update_timestamp, ttl)
    }
}

/// Answers whether cached blobs are still fresh
#[derive(Debug, Clone, Copy)]
pub struct FreshnessTracker {
    ttl: Duration,
}

impl FreshnessTracker {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sidecar path of a blob
    pub fn info_path(blob: &Path) -> PathBuf {
        let mut path = blob.as_os_str().to_owned();
        path.push(INFO_SUFFIX);
        PathBuf::from(path)
    }

    /// Whether the blob at `blob` was refreshed within the TTL
    ///
    /// A missing blob is stale and loses its sidecar. A missing or unreadable
    /// sidecar is replaced by a record stamped now, and the blob is reported
    /// stale this time.
    pub fn is_fresh(&self, blob: &Path) -> bool {
        let info = Self::info_path(blob);

        if !blob.exists() {
            if info.exists() {
                let _ = remove_path(&info);
            }
            return false;
        }

        match FreshnessRecord::load(&info) {
            Ok(record) => record.is_within(self.ttl),
            Err(_) => {
                match FreshnessRecord::now().save(&info) {
                    Ok(()) => info!("{} is created.", info.display()),
                    Err(e) => warn!("Failed to write {}: {}", info.display(), e),
                }
                false
            }
        }
    }

    /// Stamp the blob as refreshed now
    pub fn mark_refreshed(&self, blob: &Path) {
        self.mark_refreshed_at(blob, now_millis());
    }

    /// Stamp the blob with an explicit refresh time
    pub fn mark_refreshed_at(&self, blob: &Path, timestamp_millis: i64) {
        let info = Self::info_path(blob);
        let record = FreshnessRecord {
            last_update_timestamp: timestamp_millis,
        };
        if let Err(e) = record.save(&info) {
            warn!("Failed to write {}: {}", info.display(), e);
        }
    }

    /// Read the sidecar of a blob, if any
    pub fn record(&self, blob: &Path) -> Option<FreshnessRecord> {
        FreshnessRecord::load(&Self::info_path(blob)).ok()
    }
}

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Whether a timestamp (epoch millis) lies within `ttl` of now
pub fn is_within_ttl(timestamp_millis: i64, ttl: Duration) -> bool {
    let age = i128::from(now_millis()) - i128::from(timestamp_millis);
    age < i128::try_from(ttl.as_millis()).unwrap_or(i128::MAX)
}

/// Write a JSON record, replacing a directory squatting on the path
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RecordError> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
