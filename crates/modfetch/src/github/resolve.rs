//! Download source resolution
//!
//! Turns a [`Location`] into the URL its bytes are fetched from. Hosted
//! locations may need several API reads to get there.

use super::api::{Release, ReleaseAsset};
use super::client::{GitHubClient, ResolutionError};
use crate::location::{Location, PACKAGE_EXTENSION};
use tracing::debug;

/// Primary languages whose repositories publish packaged builds
pub const JVM_LANGUAGES: &[&str] = &["Java", "Kotlin", "Groovy", "Scala", "Clojure"];

/// Name prefix of pre-processed (dexed) package assets
pub const OPTIMIZED_ASSET_PREFIX: &str = "dexed";

/// Resolves locations to download URLs
#[derive(Clone)]
pub struct SourceResolver {
    client: GitHubClient,
}

impl SourceResolver {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Compute the URL to download `location` from
    ///
    /// Local locations resolve to their own path and direct URLs to
    /// themselves, without network access.
    ///
    /// # Arguments
    /// * `location` - Location to resolve
    ///
    /// # Returns
    /// The download URL (or local path), or why none could be determined
    pub fn resolve_download_source(&self, location: &Location) -> Result<String, ResolutionError> {
        let source = match location {
            Location::Local { path } => path.to_string_lossy().into_owned(),
            Location::DirectUrl { url } => url.clone(),
            Location::HostedUntyped { repo } => {
                let metadata = self.client.get_repo(repo)?;
                if is_jvm_language(metadata.language.as_deref()) {
                    let release = self.client.latest_release(repo)?;
                    self.package_asset_url(repo, &release)?
                } else {
                    self.client.zipball_url(repo, &metadata.default_branch)
                }
            }
            Location::HostedSourceRef { repo, branch } => {
                let branch = match branch.as_deref().map(str::trim) {
                    Some(branch) if !branch.is_empty() => branch.to_string(),
                    _ => self.client.get_repo(repo)?.default_branch,
                };
                self.client.zipball_url(repo, &branch)
            }
            Location::HostedPackageRef { repo, tag: None } => {
                let release = self.client.latest_release(repo)?;
                self.package_asset_url(repo, &release)?
            }
            Location::HostedPackageRef { repo, tag: Some(tag) } => {
                let releases = self.client.list_releases(repo)?;
                let listed = releases
                    .iter()
                    .find(|r| &r.tag_name == tag)
                    .ok_or_else(|| ResolutionError::TagNotFound {
                        repo: repo.clone(),
                        tag: tag.clone(),
                    })?;
                let release = self.client.get_release(&listed.url)?;
                self.package_asset_url(repo, &release)?
            }
        };

        debug!("Resolved {} to {}", location, source);
        Ok(source)
    }

    fn package_asset_url(&self, repo: &str, release: &Release) -> Result<String, ResolutionError> {
        select_package_asset(&release.assets)
            .map(|asset| asset.browser_download_url.clone())
            .ok_or_else(|| ResolutionError::NoAssetFound {
                repo: repo.to_string(),
                tag: release.tag_name.clone(),
            })
    }
}

/// Whether a repository language marks a packaged build
pub fn is_jvm_language(language: Option<&str>) -> bool {
    language.map_or(false, |lang| JVM_LANGUAGES.contains(&lang))
}

/// Pick the package asset of a release
///
/// An optimized (`dexed*.jar`) asset wins over any plain `.jar`; among equals
/// the first listed wins.
pub fn select_package_asset(assets: &[ReleaseAsset]) -> Option<&ReleaseAsset> {
    assets
        .iter()
        .find(|a| a.name.starts_with(OPTIMIZED_ASSET_PREFIX) && a.name.ends_with(PACKAGE_EXTENSION))
        .or_else(|| assets.iter().find(|a| a.name.ends_with(PACKAGE_EXTENSION)))
}
