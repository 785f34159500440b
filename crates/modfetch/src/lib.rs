//! Modfetch Library
//!
//! Acquires game distributions and mod packages for local development and
//! testing, including:
//! - Artifact locations (local path, direct URL, hosted repository)
//! - Download source resolution against the GitHub API
//! - A machine-wide shared cache with per-entry freshness records
//! - Fetch orchestration into build output directories
//! - Symbolic version notations (`latest`, `latestRelease`, `latestTag`)

pub mod cache;
pub mod config;
pub mod distribution;
pub mod fetch;
pub mod github;
pub mod http;
pub mod location;
pub mod notation;

pub use cache::{CacheError, FreshnessRecord, FreshnessTracker, SharedCache};
pub use config::{ConfigError, FetchConfig};
pub use distribution::GameSide;
pub use fetch::{FetchError, FetchOptions, FetchOutcome, Fetcher};
pub use github::{GitHubClient, ResolutionError, SourceResolver};
pub use http::{Body, HttpError, HttpTransport, Transport};
pub use location::{Location, LocationError, SourceKind};
pub use notation::{NotationResolver, VersionNotation, VersionRecord, VersionTrack};
