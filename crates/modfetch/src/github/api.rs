//! GitHub API types
//!
//! The subset of the GitHub REST responses the resolvers read. Unknown
//! fields are ignored.

use serde::{Deserialize, Serialize};

/// Repository metadata
///
/// Response from GET /repos/{owner}/{repo}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Default branch name
    pub default_branch: String,

    /// Primary language, `null` for repositories without code
    #[serde(default)]
    pub language: Option<String>,
}

/// A published release
///
/// Element of GET /repos/{owner}/{repo}/releases, or GET .../releases/latest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Tag the release was cut from
    pub tag_name: String,

    /// API URL of this release
    #[serde(default)]
    pub url: String,

    /// Attached binaries
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A binary attached to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name
    pub name: String,

    /// Direct download URL
    pub browser_download_url: String,
}

/// Element of GET /repos/{owner}/{repo}/tags, most recent first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Response from GET /repos/{owner}/{repo}/commits/{ref}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
}
