//! Revision snapshots of saved resources

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use fmu_fs::{FmuPath, NormalizedPath, checksum, io};

use crate::Result;
use crate::models::MIN_CACHE_REVISIONS;

/// Keeps the last N saved versions of each cached resource under `cache/`.
///
/// Snapshots are named `<UTC timestamp>-<checksum prefix>.json`, so a
/// lexical sort of one resource's directory is also a chronological one.
#[derive(Debug)]
pub struct CacheManager {
    cache_dir: NormalizedPath,
    max_revisions: AtomicUsize,
}

impl CacheManager {
    pub const MIN_REVISIONS: usize = MIN_CACHE_REVISIONS as usize;

    pub fn new(fmu_path: &NormalizedPath, max_revisions: usize) -> Self {
        Self {
            cache_dir: fmu_path.join(FmuPath::CacheDir),
            max_revisions: AtomicUsize::new(max_revisions.max(Self::MIN_REVISIONS)),
        }
    }

    pub fn max_revisions(&self) -> usize {
        self.max_revisions.load(Ordering::Relaxed)
    }

    /// Set the retention limit, clamped to [`Self::MIN_REVISIONS`]. Returns the stored value.
    pub fn set_max_revisions(&self, value: usize) -> usize {
        let clamped = value.max(Self::MIN_REVISIONS);
        self.max_revisions.store(clamped, Ordering::Relaxed);
        clamped
    }

    fn resource_dir(&self, relative_path: &str) -> NormalizedPath {
        let relative = NormalizedPath::new(relative_path);
        let stem = relative.file_stem().unwrap_or(relative_path);
        self.cache_dir.join(stem)
    }

    /// Snapshot `content` as the newest revision of `relative_path`.
    pub fn store_revision(
        &self,
        relative_path: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<NormalizedPath> {
        let name = format!(
            "{}-{}.json",
            now.format("%Y%m%dT%H%M%S%.6fZ"),
            checksum::short_checksum(content, 8)
        );
        let path = self.resource_dir(relative_path).join(name);
        io::write_text(&path, content)?;
        self.trim(relative_path)?;
        Ok(path)
    }

    /// Revisions of `relative_path`, oldest first.
    pub fn list_revisions(&self, relative_path: &str) -> Result<Vec<NormalizedPath>> {
        let dir = self.resource_dir(relative_path);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let native = dir.to_native();
        let mut names = Vec::new();
        for entry in fs::read_dir(&native).map_err(|e| fmu_fs::Error::io(&native, e))? {
            let entry = entry.map_err(|e| fmu_fs::Error::io(&native, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names.into_iter().map(|n| dir.join(n)).collect())
    }

    pub fn latest_revision(&self, relative_path: &str) -> Result<Option<NormalizedPath>> {
        Ok(self.list_revisions(relative_path)?.pop())
    }

    fn trim(&self, relative_path: &str) -> Result<()> {
        let revisions = self.list_revisions(relative_path)?;
        let max = self.max_revisions();
        if revisions.len() <= max {
            return Ok(());
        }
        let excess = revisions.len() - max;
        for old in &revisions[..excess] {
            io::remove_file(old)?;
        }
        tracing::debug!(resource = relative_path, removed = excess, "trimmed cache");
        Ok(())
    }
}
