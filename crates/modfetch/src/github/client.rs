//! GitHub API client
//!
//! Typed, unauthenticated reads of the GitHub REST API over a [`Transport`].

use super::api::{Commit, Release, RepoMetadata, Tag};
use crate::http::{HttpError, Transport};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while resolving against the platform API
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Repository does not exist or is private
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    /// Repository has no published release
    #[error("No release published for {0}")]
    NoRelease(String),

    /// No release carries the requested tag
    #[error("Tag<{tag}> of {repo} not found")]
    TagNotFound { repo: String, tag: String },

    /// Release carries no usable binary
    #[error("No package asset found in release {tag} of {repo}")]
    NoAssetFound { repo: String, tag: String },

    /// Response body did not have the expected shape
    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    /// Transport failure, including rate limiting
    #[error("Request failed: {0}")]
    Http(#[from] HttpError),
}

/// Client for the repository, release, tag and commit endpoints
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    api_base: String,
}

impl GitHubClient {
    pub fn new(transport: Arc<dyn Transport>, api_base: &str) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// GET /repos/{repo}
    pub fn get_repo(&self, repo: &str) -> Result<RepoMetadata, ResolutionError> {
        let url = format!("{}/repos/{}", self.api_base, repo);
        self.get_json(&url).map_err(|e| match e {
            ResolutionError::Http(ref http) if http.is_not_found() => {
                ResolutionError::RepositoryNotFound(repo.to_string())
            }
            other => other,
        })
    }

    /// GET /repos/{repo}/releases
    pub fn list_releases(&self, repo: &str) -> Result<Vec<Release>, ResolutionError> {
        let url = format!("{}/repos/{}/releases", self.api_base, repo);
        self.get_json(&url).map_err(|e| match e {
            ResolutionError::Http(ref http) if http.is_not_found() => {
                ResolutionError::RepositoryNotFound(repo.to_string())
            }
            other => other,
        })
    }

    /// GET /repos/{repo}/releases/latest
    pub fn latest_release(&self, repo: &str) -> Result<Release, ResolutionError> {
        let url = self.latest_release_url(repo);
        self.get_json(&url).map_err(|e| match e {
            ResolutionError::Http(ref http) if http.is_not_found() => {
                ResolutionError::NoRelease(repo.to_string())
            }
            other => other,
        })
    }

    /// GET an absolute release URL, as listed in a release's `url` field
    pub fn get_release(&self, release_url: &str) -> Result<Release, ResolutionError> {
        self.get_json(release_url)
    }

    /// GET /repos/{repo}/tags
    pub fn list_tags(&self, repo: &str) -> Result<Vec<Tag>, ResolutionError> {
        let url = format!("{}/repos/{}/tags", self.api_base, repo);
        self.get_json(&url)
    }

    /// GET /repos/{repo}/commits/{reference}
    pub fn get_commit(&self, repo: &str, reference: &str) -> Result<Commit, ResolutionError> {
        let url = format!("{}/repos/{}/commits/{}", self.api_base, repo, reference);
        self.get_json(&url)
    }

    pub fn latest_release_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base, repo)
    }

    /// Archive of a branch
    pub fn zipball_url(&self, repo: &str, branch: &str) -> String {
        format!("{}/repos/{}/zipball/{}", self.api_base, repo, branch)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ResolutionError> {
        let text = self.transport.get_text(url)?;
        serde_json::from_str(&text).map_err(|e| ResolutionError::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
