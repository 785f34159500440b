//! GitHub source resolution
//!
//! Resolves hosted repository locations against the GitHub REST API.
//!
//! ## Resolution per location
//!
//! - `HostedUntyped`: reads the repository's primary language. JVM languages
//!   resolve to the latest release's package asset, everything else to a
//!   zipball of the default branch.
//! - `HostedSourceRef`: zipball of the given branch, or the default branch.
//! - `HostedPackageRef`: package asset of the latest release, or of the
//!   release whose tag matches exactly.

mod api;
mod client;
mod resolve;

pub use api::{Commit, Release, ReleaseAsset, RepoMetadata, Tag};
pub use client::{GitHubClient, ResolutionError};
pub use resolve::{
    is_jvm_language, select_package_asset, SourceResolver, JVM_LANGUAGES, OPTIMIZED_ASSET_PREFIX,
};
