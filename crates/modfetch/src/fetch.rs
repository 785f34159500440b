//! Fetch orchestration
//!
//! [`Fetcher::ensure_available`] makes sure an output file holds the artifact
//! of a [`Location`], taking the cheapest path that is still correct:
//!
//! 1. the output already exists → nothing to do;
//! 2. the shared cache holds a fresh copy → copy it;
//! 3. otherwise resolve the download source, stream it into the cache, stamp
//!    the entry fresh and copy it.
//!
//! Local locations bypass the cache and are copied straight to the output.

use crate::cache::{write_atomic, CacheError, FreshnessTracker, SharedCache};
use crate::config::FetchConfig;
use crate::github::{GitHubClient, ResolutionError, SourceResolver};
use crate::http::{HttpError, HttpTransport, Transport};
use crate::location::Location;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while acquiring an artifact
#[derive(Debug, Error)]
pub enum FetchError {
    /// Download source could not be resolved
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Download failed before any byte was cached
    #[error("Download failed: {0}")]
    Network(#[from] HttpError),

    /// Cache write failed; no partial entry was left behind
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// IO error on the output side
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Local artifact does not exist
    #[error("Local artifact not found: {}", .0.display())]
    LocalNotFound(PathBuf),
}

/// Per-request switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Re-acquire even if the output already exists
    pub overwrite: bool,

    /// Keep other files in the output directory
    pub keep_others: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            keep_others: true,
        }
    }
}

/// Which path `ensure_available` took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Output already existed
    UpToDate,
    /// Copied from a fresh cache entry
    FromCache,
    /// Downloaded into the cache, then copied
    Downloaded,
    /// Copied from a local path
    CopiedLocal,
}

/// Acquires artifacts through the shared cache
#[derive(Clone)]
pub struct Fetcher {
    cache: SharedCache,
    freshness: FreshnessTracker,
    resolver: SourceResolver,
}

impl Fetcher {
    /// Create a fetcher over an explicit transport
    pub fn new(config: &FetchConfig, transport: Arc<dyn Transport>) -> Result<Self, FetchError> {
        let cache = SharedCache::open(&config.cache_root)?;
        let client = GitHubClient::new(transport, &config.api_base);

        Ok(Self {
            cache,
            freshness: FreshnessTracker::new(config.ttl()),
            resolver: SourceResolver::new(client),
        })
    }

    /// Create a fetcher that talks to the network
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn freshness(&self) -> &FreshnessTracker {
        &self.freshness
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Guarantee that `output` holds the artifact of `location`
    ///
    /// An existing output is trusted unless `overwrite` is set. Hosted and URL
    /// locations are served from a fresh cache entry when there is one, and
    /// downloaded into the cache otherwise.
    ///
    /// # Arguments
    /// * `location` - Where the artifact comes from
    /// * `output` - File to materialize the artifact at
    /// * `options` - Overwrite and sibling-cleanup switches
    ///
    /// # Returns
    /// Which path was taken to produce the output
    ///
    /// # Example
    /// ```no_run
    /// # use modfetch::{FetchConfig, FetchOptions, Fetcher, Location};
    /// # use std::path::Path;
    /// let fetcher = Fetcher::from_config(&FetchConfig::default()).unwrap();
    /// let location: Location = "jar:Anuken/Mindustry".parse().unwrap();
    /// let outcome = fetcher
    ///     .ensure_available(&location, Path::new("run/Mindustry.jar"), &FetchOptions::default())
    ///     .unwrap();
    /// println!("{:?}", outcome);
    /// ```
    pub fn ensure_available(
        &self,
        location: &Location,
        output: &Path,
        options: &FetchOptions,
    ) -> Result<FetchOutcome, FetchError> {
        if output.exists() && !options.overwrite {
            info!(
                "{} has been already downloaded at {}, so skip it.",
                location,
                output.display()
            );
            return Ok(FetchOutcome::UpToDate);
        }

        if !options.keep_others {
            let mut keep = vec![output.to_path_buf()];
            if let Location::Local { path } = location {
                keep.push(path.clone());
            }
            remove_files_except(output_dir(output), &keep)?;
        }

        match location {
            Location::Local { path } => {
                if !path.is_file() {
                    return Err(FetchError::LocalNotFound(path.clone()));
                }
                if !same_file(path, output) {
                    copy_file(path, output)?;
                    info!("Copied {} to {}.", path.display(), output.display());
                }
                Ok(FetchOutcome::CopiedLocal)
            }
            Location::DirectUrl { .. }
            | Location::HostedUntyped { .. }
            | Location::HostedSourceRef { .. }
            | Location::HostedPackageRef { .. } => self.fetch_through_cache(location, output),
        }
    }

    /// Materialize every location into `out_dir` under its local file name
    ///
    /// Returns the output paths in input order. With `keep_others` unset,
    /// files in `out_dir` that belong to none of the locations are removed
    /// first. Local sources inside `out_dir` are never removed.
    ///
    /// # Arguments
    /// * `locations` - Artifacts to materialize
    /// * `out_dir` - Directory receiving every artifact
    /// * `options` - Applied to the whole set
    pub fn ensure_all(
        &self,
        locations: &[Location],
        out_dir: &Path,
        options: &FetchOptions,
    ) -> Result<Vec<PathBuf>, FetchError> {
        fs::create_dir_all(out_dir)?;

        let outputs: Vec<PathBuf> = locations
            .iter()
            .map(|l| out_dir.join(l.local_file_name()))
            .collect();

        if !options.keep_others {
            let mut keep = outputs.clone();
            keep.extend(locations.iter().filter_map(|l| match l {
                Location::Local { path } => Some(path.clone()),
                _ => None,
            }));
            remove_files_except(out_dir, &keep)?;
        }

        let each = FetchOptions {
            keep_others: true,
            ..*options
        };
        for (location, output) in locations.iter().zip(&outputs) {
            self.ensure_available(location, output, &each)?;
        }

        Ok(outputs)
    }

    fn fetch_through_cache(
        &self,
        location: &Location,
        output: &Path,
    ) -> Result<FetchOutcome, FetchError> {
        let blob = self.cache.entry_path(location);

        let outcome = if blob.is_file() && self.freshness.is_fresh(&blob) {
            debug!("Cache hit for {} at {}", location, blob.display());
            FetchOutcome::FromCache
        } else {
            let source = self.resolver.resolve_download_source(location)?;
            info!("Downloading {} from {}...", location, source);
            let body = self.resolver.client().transport().open(&source)?;
            self.cache.put(location, body)?;
            self.freshness.mark_refreshed(&blob);
            info!("Downloaded {} at {}.", location.local_file_name(), blob.display());
            FetchOutcome::Downloaded
        };

        copy_file(&blob, output)?;
        info!("Copied {} from cache {} to {}.", location, blob.display(), output.display());
        Ok(outcome)
    }
}

fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    let source = fs::File::open(from)?;
    write_atomic(to, source)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Directory an output file lives in; `.` for a bare file name
fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Remove regular files in `dir` that are not one of `keep`
fn remove_files_except(dir: &Path, keep: &[PathBuf]) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && !keep.iter().any(|k| same_file(k, &path)) {
            debug!("Removing stale output {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
