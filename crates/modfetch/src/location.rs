//! Artifact locations
//!
//! A [`Location`] says where an artifact logically comes from. Everything in
//! this module is pure: identities, local file names and cache paths are
//! computed without touching the network or the disk. Turning a location into
//! a download URL is the job of [`SourceResolver`](crate::SourceResolver).
//!
//! ## Notation
//!
//! ```text
//! path:./libs/MyMod.jar           -> Local
//! https://example.com/mod.zip     -> DirectUrl
//! github:Owner/Repo               -> HostedUntyped
//! github:Owner/Repo#branch        -> HostedSourceRef
//! github:Owner/Repo@tag           -> HostedPackageRef
//! jar:Owner/Repo                  -> HostedPackageRef (latest release)
//! ```

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Extension given to plain source archives and direct downloads
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Extension given to packaged releases
pub const PACKAGE_EXTENSION: &str = ".jar";

/// Errors that can occur while parsing a location notation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    /// Notation is empty
    #[error("Empty location")]
    Empty,

    /// Repository slug is not `owner/name`
    #[error("Invalid repository slug: {0}")]
    InvalidRepo(String),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Cache partition a location belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Not cached
    Local,
    /// `<cache_root>/url/`
    Url,
    /// `<cache_root>/github/`
    GitHub,
}

impl SourceKind {
    /// Directory name under the cache root, if the kind is cached at all
    pub fn dir_name(self) -> Option<&'static str> {
        match self {
            SourceKind::Local => None,
            SourceKind::Url => Some("url"),
            SourceKind::GitHub => Some("github"),
        }
    }
}

/// Where an artifact comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// A file already on disk
    Local { path: PathBuf },

    /// A direct download link
    DirectUrl { url: String },

    /// A hosted repository whose artifact kind is decided by its primary language
    HostedUntyped { repo: String },

    /// Source archive of a hosted repository at a branch (default branch if `None`)
    HostedSourceRef {
        repo: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },

    /// Packaged release asset of a hosted repository (latest release if `None`)
    HostedPackageRef {
        repo: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
}

impl Location {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Location::Local { path: path.into() }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Location::DirectUrl { url: url.into() }
    }

    pub fn github(repo: impl Into<String>) -> Self {
        Location::HostedUntyped { repo: repo.into() }
    }

    pub fn github_source(repo: impl Into<String>, branch: Option<&str>) -> Self {
        Location::HostedSourceRef {
            repo: repo.into(),
            branch: branch.map(String::from),
        }
    }

    pub fn github_package(repo: impl Into<String>, tag: Option<&str>) -> Self {
        Location::HostedPackageRef {
            repo: repo.into(),
            tag: tag.map(String::from),
        }
    }

    /// Cache partition of this location
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Location::Local { .. } => SourceKind::Local,
            Location::DirectUrl { .. } => SourceKind::Url,
            Location::HostedUntyped { .. }
            | Location::HostedSourceRef { .. }
            | Location::HostedPackageRef { .. } => SourceKind::GitHub,
        }
    }

    /// Whether the location goes through the shared cache
    pub fn is_cached(&self) -> bool {
        self.source_kind() != SourceKind::Local
    }

    /// Stable cache identity of this location
    ///
    /// Only unique within the location's [`SourceKind`] partition.
    pub fn identity(&self) -> String {
        match self {
            Location::Local { path } => path.to_string_lossy().into_owned(),
            Location::DirectUrl { url } => url_digest(url),
            Location::HostedUntyped { repo } => repo_slug(repo),
            Location::HostedSourceRef { repo, branch } => {
                link_parts(&repo_slug(repo), branch.as_deref())
            }
            Location::HostedPackageRef { repo, tag } => {
                link_parts(&repo_slug(repo), tag.as_deref())
            }
        }
    }

    /// File name the artifact gets in an output directory
    pub fn local_file_name(&self) -> String {
        match self {
            Location::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Location::DirectUrl { url } => url_file_name(url),
            Location::HostedUntyped { .. } | Location::HostedSourceRef { .. } => {
                format!("{}{}", self.identity(), ARCHIVE_EXTENSION)
            }
            Location::HostedPackageRef { .. } => {
                format!("{}{}", self.identity(), PACKAGE_EXTENSION)
            }
        }
    }

    /// Path of the cached blob under `cache_root`
    ///
    /// Local locations are their own cache path.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        match self {
            Location::Local { path } => path.clone(),
            Location::DirectUrl { .. } => cache_root.join("url").join(self.identity()),
            Location::HostedUntyped { .. }
            | Location::HostedSourceRef { .. }
            | Location::HostedPackageRef { .. } => {
                cache_root.join("github").join(self.local_file_name())
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local { path } => write!(f, "path:{}", path.display()),
            Location::DirectUrl { url } => write!(f, "{}", url),
            Location::HostedUntyped { repo } => write!(f, "github:{}", repo),
            Location::HostedSourceRef { repo, branch: Some(branch) } => {
                write!(f, "github:{}#{}", repo, branch)
            }
            Location::HostedSourceRef { repo, branch: None } => write!(f, "github:{}#", repo),
            Location::HostedPackageRef { repo, tag: Some(tag) } => {
                write!(f, "github:{}@{}", repo, tag)
            }
            Location::HostedPackageRef { repo, tag: None } => write!(f, "jar:{}", repo),
        }
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LocationError::Empty);
        }

        if let Some(path) = s.strip_prefix("path:") {
            return Ok(Location::local(path));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            url::Url::parse(s).map_err(|_| LocationError::InvalidUrl(s.to_string()))?;
            return Ok(Location::url(s));
        }

        if let Some(repo) = s.strip_prefix("jar:") {
            let repo = parse_repo(repo)?;
            return Ok(Location::HostedPackageRef { repo, tag: None });
        }

        if let Some(rest) = s.strip_prefix("github:") {
            if let Some((repo, branch)) = rest.split_once('#') {
                return Ok(Location::HostedSourceRef {
                    repo: parse_repo(repo)?,
                    branch: non_blank(branch),
                });
            }
            if let Some((repo, tag)) = rest.split_once('@') {
                return Ok(Location::HostedPackageRef {
                    repo: parse_repo(repo)?,
                    tag: non_blank(tag),
                });
            }
            return Ok(Location::HostedUntyped {
                repo: parse_repo(rest)?,
            });
        }

        Ok(Location::local(s))
    }
}

/// `Owner/Repo` -> `Owner-Repo`
pub fn repo_slug(repo: &str) -> String {
    repo.replace('/', "-")
}

/// Lowercase hex SHA-1 of a URL string
pub fn url_digest(url: &str) -> String {
    hex::encode(Sha1::digest(url.as_bytes()))
}

/// Join a slug with an optional, non-blank ref
fn link_parts(slug: &str, reference: Option<&str>) -> String {
    match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => format!("{}-{}", slug, reference),
        None => slug.to_string(),
    }
}

/// Last path segment of a URL, forced to an archive name
fn url_file_name(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.ends_with(ARCHIVE_EXTENSION) {
        last.to_string()
    } else {
        format!("{}{}", last, ARCHIVE_EXTENSION)
    }
}

fn parse_repo(repo: &str) -> Result<String, LocationError> {
    let repo = repo.trim().trim_end_matches('/');
    match repo.split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok(repo.to_string())
        }
        _ => Err(LocationError::InvalidRepo(repo.to_string())),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
