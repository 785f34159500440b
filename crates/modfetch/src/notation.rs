//! Version notations
//!
//! Symbolic versions (`latest`, `latestRelease`, `latestTag`) are resolved
//! to concrete strings against the GitHub API. Results are cached under
//! `<cache_root>/versions/<key>.json` with the same TTL as artifacts:
//!
//! ```json
//! {"lastUpdateTimestamp": 1700000000000, "version": "v146"}
//! ```
//!
//! Resolution never fails. A build must be able to proceed offline, so any
//! error is logged and replaced by the track's hardcoded fallback.

use crate::cache::{is_within_ttl, now_millis, write_json};
use crate::config::FetchConfig;
use crate::distribution::{DEFAULT_ARC_VERSION, DEFAULT_MINDUSTRY_VERSION};
use crate::github::{GitHubClient, ResolutionError};
use crate::http::{HttpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback when the latest commit cannot be determined
pub const SNAPSHOT_VERSION: &str = "-SNAPSHOT";

/// Length commit hashes are shortened to
pub const SHORT_SHA_LEN: usize = 10;

/// A symbolic version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionNotation {
    /// Most recent commit on the track's branch
    Latest,
    /// Most recent published release
    LatestRelease,
    /// Most recent tag
    LatestTag,
}

impl fmt::Display for VersionNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionNotation::Latest => "latest",
            VersionNotation::LatestRelease => "latestRelease",
            VersionNotation::LatestTag => "latestTag",
        };
        f.write_str(s)
    }
}

impl FromStr for VersionNotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(VersionNotation::Latest),
            "latestRelease" | "latest-release" => Ok(VersionNotation::LatestRelease),
            "latestTag" | "latest-tag" => Ok(VersionNotation::LatestTag),
            other => Err(format!("Unknown version notation: {}", other)),
        }
    }
}

/// A repository versions are drawn from, with its fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTrack {
    /// `owner/name`
    pub repo: String,
    /// Branch `Latest` reads the head commit of
    pub branch: String,
    /// Fallback for `LatestRelease` and `LatestTag`
    pub default_version: String,
    /// Fallback for `Latest`
    pub commit_fallback: String,
}

impl VersionTrack {
    pub fn new(repo: &str, branch: &str, default_version: &str) -> Self {
        Self {
            repo: repo.to_string(),
            branch: branch.to_string(),
            default_version: default_version.to_string(),
            commit_fallback: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Anuken/Arc
    pub fn arc() -> Self {
        Self::new("Anuken/Arc", "master", DEFAULT_ARC_VERSION)
    }

    /// Anuken/Mindustry official releases
    pub fn mindustry() -> Self {
        Self::new("Anuken/Mindustry", "master", DEFAULT_MINDUSTRY_VERSION)
    }

    /// Anuken/MindustryJitpack mirror
    pub fn mindustry_mirror() -> Self {
        Self::new("Anuken/MindustryJitpack", "main", DEFAULT_MINDUSTRY_VERSION)
    }

    /// Fallback used when `notation` cannot be resolved
    pub fn fallback(&self, notation: VersionNotation) -> &str {
        match notation {
            VersionNotation::Latest => &self.commit_fallback,
            VersionNotation::LatestRelease | VersionNotation::LatestTag => &self.default_version,
        }
    }
}

/// Persisted resolution result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionRecord {
    #[serde(rename = "lastUpdateTimestamp")]
    pub last_update_timestamp: i64,
    pub version: String,
}

/// Resolves version notations with caching and fallback
#[derive(Clone)]
pub struct NotationResolver {
    client: GitHubClient,
    versions_dir: PathBuf,
    ttl: Duration,
}

impl NotationResolver {
    /// Create a resolver over an explicit transport
    pub fn new(config: &FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: GitHubClient::new(transport, &config.api_base),
            versions_dir: config.cache_root.join("versions"),
            ttl: config.ttl(),
        }
    }

    /// Create a resolver that talks to the network
    pub fn from_config(config: &FetchConfig) -> Result<Self, crate::http::HttpError> {
        Ok(Self::new(config, Arc::new(HttpTransport::new(config)?)))
    }

    /// Path of the record stored under `cache_key`
    pub fn record_path(&self, cache_key: &str) -> PathBuf {
        self.versions_dir.join(format!("{}.json", sanitize_key(cache_key)))
    }

    /// Resolve `notation` on `track`, caching under `cache_key`
    ///
    /// A fresh record under `cache_key` is returned without network access.
    /// Lookup failures are logged and answered with the track's fallback,
    /// which is not recorded.
    ///
    /// # Arguments
    /// * `notation` - Symbolic version to resolve
    /// * `cache_key` - Name of the record, e.g. `arc-tag`
    /// * `track` - Repository, branch and fallbacks
    ///
    /// # Returns
    /// The concrete version, or the fallback
    ///
    /// # Example
    /// ```no_run
    /// # use modfetch::{FetchConfig, NotationResolver, VersionNotation, VersionTrack};
    /// let resolver = NotationResolver::from_config(&FetchConfig::default()).unwrap();
    /// let version =
    ///     resolver.resolve_notation(VersionNotation::LatestTag, "arc-tag", &VersionTrack::arc());
    /// println!("Arc {}", version);
    /// ```
    pub fn resolve_notation(
        &self,
        notation: VersionNotation,
        cache_key: &str,
        track: &VersionTrack,
    ) -> String {
        let record_path = self.record_path(cache_key);

        if let Some(record) = load_record(&record_path) {
            if is_within_ttl(record.last_update_timestamp, self.ttl) {
                debug!("Using cached {} of {}: {}", notation, track.repo, record.version);
                return record.version;
            }
        }

        match self.query(notation, track) {
            Ok(version) => {
                let record = VersionRecord {
                    last_update_timestamp: now_millis(),
                    version: version.clone(),
                };
                if let Err(e) = write_json(&record_path, &record) {
                    warn!("Failed to write {}: {}", record_path.display(), e);
                }
                version
            }
            Err(e) => {
                let fallback = track.fallback(notation);
                warn!(
                    "Can't fetch the exact {} version of {}, so use {} instead: {}",
                    notation, track.repo, fallback, e
                );
                fallback.to_string()
            }
        }
    }

    fn query(&self, notation: VersionNotation, track: &VersionTrack) -> Result<String, ResolutionError> {
        match notation {
            VersionNotation::Latest => {
                let commit = self.client.get_commit(&track.repo, &track.branch)?;
                Ok(short_sha(&commit.sha).to_string())
            }
            VersionNotation::LatestRelease => {
                let release = self.client.latest_release(&track.repo)?;
                Ok(release.tag_name)
            }
            VersionNotation::LatestTag => {
                let tags = self.client.list_tags(&track.repo)?;
                tags.into_iter()
                    .next()
                    .map(|t| t.name)
                    .ok_or_else(|| ResolutionError::MalformedResponse {
                        url: format!("{}/repos/{}/tags", self.client.api_base(), track.repo),
                        reason: "tag list is empty".to_string(),
                    })
            }
        }
    }
}

fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

fn load_record(path: &Path) -> Option<VersionRecord> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
