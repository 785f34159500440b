//! Shared artifact cache
//!
//! A persistent byte-store rooted outside any build directory, reused by
//! every invocation on the machine. Entries are addressed by
//! [`Location`] identity and partitioned by source kind.
//!
//! Directory structure:
//! ```text
//! ~/.modfetch/cache/
//! ├── github/
//! │   ├── Org-Game.jar
//! │   ├── Org-Game.jar.info      # freshness record
//! │   └── Org-Mod-0.8.zip
//! ├── url/
//! │   └── <sha1-of-url>
//! └── versions/
//!     └── arc-tag.json           # resolved version notations
//! ```

mod freshness;

pub use freshness::{
    is_within_ttl, now_millis, FreshnessRecord, FreshnessTracker, RecordError, INFO_SUFFIX,
};
pub(crate) use freshness::write_json;

use crate::location::Location;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Location does not go through the cache
    #[error("Location is not cacheable: {0}")]
    NotCacheable(String),
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistent cache of downloaded artifacts
#[derive(Debug, Clone)]
pub struct SharedCache {
    /// Root cache directory (~/.modfetch/cache/)
    root: PathBuf,
}

impl SharedCache {
    /// Open the cache rooted at `root`, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Get the cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the blob of `location` lives at, whether or not it exists
    pub fn entry_path(&self, location: &Location) -> PathBuf {
        location.cache_path(&self.root)
    }

    /// Cached blob of `location`, if present
    pub fn get(&self, location: &Location) -> Option<PathBuf> {
        let path = self.entry_path(location);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Stream `source` into the entry of `location`
    ///
    /// The bytes land in a temporary file next to the entry, which is renamed
    /// over the entry only once complete. On failure the temporary file is
    /// removed and the error returned unchanged.
    ///
    /// # Arguments
    /// * `location` - Entry to publish; local locations are rejected
    /// * `source` - Artifact bytes
    ///
    /// # Returns
    /// Path of the published blob
    ///
    /// # Example
    /// ```no_run
    /// # use modfetch::{Location, SharedCache};
    /// let cache = SharedCache::open("/tmp/modfetch-cache").unwrap();
    /// let location = Location::url("https://example.com/pack.zip");
    /// let blob = cache.put(&location, &b"zip bytes"[..]).unwrap();
    /// assert_eq!(cache.get(&location), Some(blob));
    /// ```
    pub fn put<R: Read>(&self, location: &Location, source: R) -> Result<PathBuf, CacheError> {
        if !location.is_cached() {
            return Err(CacheError::NotCacheable(location.to_string()));
        }
        let path = self.entry_path(location);
        write_atomic(&path, source)?;
        Ok(path)
    }

    /// Delete the entry of `location` and its freshness record
    pub fn remove(&self, location: &Location) -> Result<bool, CacheError> {
        if !location.is_cached() {
            return Err(CacheError::NotCacheable(location.to_string()));
        }
        let path = self.entry_path(location);
        let info = FreshnessTracker::info_path(&path);
        if info.exists() {
            fs::remove_file(&info)?;
        }
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// Clear the entire cache
    ///
    /// **Warning:** This deletes every cached artifact and version record.
    pub fn clear(&self) -> Result<(), CacheError> {
        if !self.root.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }

        Ok(())
    }
}

/// Write `source` to `dest` via a sibling temporary file and a rename
pub(crate) fn write_atomic<R: Read>(dest: &Path, mut source: R) -> io::Result<u64> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let tmp_path = tmp_path_for(dest);
    let result: io::Result<u64> = (|| {
        let mut tmp_file = fs::File::create(&tmp_path)?;
        let written = io::copy(&mut source, &mut tmp_file)?;
        tmp_file.flush()?;
        tmp_file.sync_all()?;
        drop(tmp_file);
        replace_file(&tmp_path, dest)?;
        Ok(written)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn tmp_path_for(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dest.with_file_name(format!(".{}.{}-{}.tmp", name, std::process::id(), seq))
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.is_dir() {
        fs::remove_dir_all(to)?;
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(b'x');
            self.remaining -= n;
            Ok(n)
        }
    }

    fn files_in(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_put_and_get() {
        let temp = TempDir::new().unwrap();
        let cache = SharedCache::open(temp.path()).unwrap();
        let location = Location::github_package("Org/Game", None);

        assert!(cache.get(&location).is_none());

        let path = cache.put(&location, &b"game bytes"[..]).unwrap();
        assert_eq!(path, temp.path().join("github").join("Org-Game.jar"));
        assert_eq!(cache.get(&location), Some(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), b"game bytes");
        assert_eq!(files_in(&temp.path().join("github")), vec!["Org-Game.jar"]);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let temp = TempDir::new().unwrap();
        let cache = SharedCache::open(temp.path()).unwrap();
        let location = Location::url("https://example.com/pack.zip");

        cache.put(&location, &b"old"[..]).unwrap();
        let path = cache.put(&location, &b"new"[..]).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"new");
    }

    #[test]
    fn test_failed_put_leaves_no_blob() {
        let temp = TempDir::new().unwrap();
        let cache = SharedCache::open(temp.path()).unwrap();
        let location = Location::github("Org/Mod");

        let result = cache.put(&location, FailingReader { remaining: 10_000 });
        match result {
            Err(CacheError::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(cache.get(&location).is_none());
        assert!(files_in(&temp.path().join("github")).is_empty());
    }

    #[test]
    fn test_local_not_cacheable() {
        let temp = TempDir::new().unwrap();
        let cache = SharedCache::open(temp.path()).unwrap();
        let result = cache.put(&Location::local("/tmp/a.jar"), &b""[..]);
        assert!(matches!(result, Err(CacheError::NotCacheable(_))));
    }

    #[test]
    fn test_remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache = SharedCache::open(temp.path().join("cache")).unwrap();
        let mod_loc = Location::github("Org/Mod");
        let url_loc = Location::url("https://example.com/a.zip");

        cache.put(&mod_loc, &b"mod"[..]).unwrap();
        cache.put(&url_loc, &b"url"[..]).unwrap();

        assert!(cache.remove(&mod_loc).unwrap());
        assert!(!cache.remove(&mod_loc).unwrap());

        cache.clear().unwrap();
        assert!(cache.get(&url_loc).is_none());
        assert!(files_in(cache.root()).is_empty());
    }
}
