//! The `.fmu` directory aggregate
//!
//! [`FmuDirectory`] owns one config, changelog and mappings resource plus
//! the lock and cache collaborators, and is the entry point for diffing and
//! syncing against another directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use fmu_fs::{FmuPath, NormalizedPath, io};

use crate::actor::Actor;
use crate::models::{ConfigDocument, ProjectConfig};
use crate::resources::{
    CacheManager, ChangelogManager, ConfigManager, DEFAULT_LOCK_TIMEOUT, DirContext, LockManager,
    MappingsManager,
};
use crate::sync::{DirDiff, SyncEngine, SyncResult};
use crate::{Error, Result};

const README_CONTENT: &str = "\
This directory contains settings for an FMU project.

Files in this directory are managed by fmu-settings. Do not edit them by hand:
changes made outside the tool are not recorded in logs/changelog.json and may
be overwritten by the next sync.
";

/// Runtime options for opening a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryOptions {
    /// How long an acquired write lock stays live
    pub lock_timeout: Duration,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// An opened `.fmu` directory.
#[derive(Debug)]
pub struct FmuDirectory {
    base_path: PathBuf,
    path: PathBuf,
    ctx: Arc<DirContext>,
    config: ConfigManager,
    changelog: Arc<ChangelogManager>,
    mappings: MappingsManager,
}

impl FmuDirectory {
    /// Create `.fmu` under `base_path` with a README and a default config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if `.fmu` is already present.
    pub fn init(base_path: impl AsRef<Path>, actor: Actor) -> Result<Self> {
        Self::init_with(base_path, actor, DirectoryOptions::default())
    }

    pub fn init_with(
        base_path: impl AsRef<Path>,
        actor: Actor,
        options: DirectoryOptions,
    ) -> Result<Self> {
        let base_path = create_fmu_dir(base_path.as_ref())?;
        let dir = Self::open_with(&base_path, actor, options)?;
        io::write_text(&dir.ctx.file(FmuPath::Readme.as_str()), README_CONTENT)?;
        let config = ProjectConfig::new(dir.actor().user.clone(), dir.actor().now());
        dir.config.save(&config)?;
        tracing::info!(path = %dir.path.display(), "initialized .fmu directory");
        Ok(dir)
    }

    pub fn open(base_path: impl AsRef<Path>, actor: Actor) -> Result<Self> {
        Self::open_with(base_path, actor, DirectoryOptions::default())
    }

    /// Open the `.fmu` directory directly under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryNotFound`] if there is no `.fmu` entry and
    /// [`Error::NotADirectory`] if it is a file.
    pub fn open_with(
        base_path: impl AsRef<Path>,
        actor: Actor,
        options: DirectoryOptions,
    ) -> Result<Self> {
        let OpenedDir {
            base_path,
            path,
            ctx,
        } = OpenedDir::open(base_path.as_ref(), actor, options)?;
        let changelog = Arc::new(ChangelogManager::changelog(Arc::clone(&ctx)));
        let dir = Self {
            config: ConfigManager::new(Arc::clone(&ctx), Arc::clone(&changelog)),
            mappings: MappingsManager::new(Arc::clone(&ctx), Arc::clone(&changelog)),
            changelog,
            ctx,
            base_path,
            path,
        };
        dir.sync_runtime_variables()?;
        Ok(dir)
    }

    /// The `.fmu` directory at or above `start`, skipping `$HOME/.fmu`.
    pub fn find_fmu_directory(start: impl AsRef<Path>) -> Option<PathBuf> {
        let home = dirs::home_dir();
        let mut visited = HashSet::new();
        let mut current = resolve(start.as_ref());

        while visited.insert(current.clone()) {
            let candidate = current.join(FmuPath::FmuDir);
            if candidate.is_dir() && home.as_deref() != Some(current.as_path()) {
                return Some(candidate);
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }
        None
    }

    /// Open the nearest `.fmu` directory at or above `start`.
    pub fn find_nearest(start: impl AsRef<Path>, actor: Actor) -> Result<Self> {
        let start = start.as_ref();
        let found = Self::find_fmu_directory(start).ok_or_else(|| Error::DirectoryNotFound {
            path: start.to_path_buf(),
        })?;
        match found.parent() {
            Some(base) => Self::open(base, actor),
            None => Self::open(&found, actor),
        }
    }

    /// Directory containing `.fmu`.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The `.fmu` directory itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn actor(&self) -> &Actor {
        &self.ctx.actor
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn changelog(&self) -> &ChangelogManager {
        &self.changelog
    }

    pub fn mappings(&self) -> &MappingsManager {
        &self.mappings
    }

    pub fn lock(&self) -> &LockManager {
        &self.ctx.lock
    }

    pub fn cache(&self) -> &CacheManager {
        &self.ctx.cache
    }

    pub fn cache_max_revisions(&self) -> usize {
        self.ctx.cache.max_revisions()
    }

    /// Set the cache retention limit (minimum 5) and persist it to config.
    pub fn set_cache_max_revisions(&self, value: usize) -> Result<()> {
        let clamped = self.ctx.cache.set_max_revisions(value);
        self.set_config_value("cache_max_revisions", Value::from(clamped))
    }

    /// Mirror persisted config fields into runtime state.
    pub fn sync_runtime_variables(&self) -> Result<()> {
        apply_runtime_config(&self.ctx, &self.config)
    }

    pub fn get_config_value(&self, key: &str) -> Result<Option<Value>> {
        self.config.get(key)
    }

    pub fn set_config_value(&self, key: &str, value: Value) -> Result<()> {
        tracing::info!(key, path = %self.path.display(), "setting config value");
        self.config.set(key, value)?;
        Ok(())
    }

    pub fn update_config(&self, updates: Vec<(String, Value)>) -> Result<ProjectConfig> {
        self.config.update(updates)
    }

    pub fn get_file_path(&self, relative_path: &str) -> PathBuf {
        self.ctx.file(relative_path).to_native()
    }

    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.ctx.file(relative_path).exists()
    }

    pub fn read_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        self.ctx.read_file(relative_path)
    }

    pub fn read_text_file(&self, relative_path: &str) -> Result<String> {
        self.ctx.read_text_file(relative_path)
    }

    /// Write bytes inside `.fmu`, creating parent directories.
    pub fn write_file(&self, relative_path: &str, data: &[u8]) -> Result<()> {
        self.ctx.write_file(relative_path, data)
    }

    pub fn write_text_file(&self, relative_path: &str, content: &str) -> Result<()> {
        self.ctx.write_file(relative_path, content.as_bytes())
    }

    /// Files (not directories) in `.fmu` or one of its subdirectories.
    pub fn list_files(&self, subdirectory: Option<&str>) -> Result<Vec<PathBuf>> {
        self.ctx.list_files(subdirectory)
    }

    pub fn ensure_directory(&self, relative_path: &str) -> Result<PathBuf> {
        self.ctx.ensure_directory(relative_path)
    }

    /// Recreate whatever is missing of the directory, README and config.
    ///
    /// A missing config is restored from the newest cache revision when one
    /// exists, otherwise reset to defaults.
    pub fn restore(&self) -> Result<()> {
        restore_layout(&self.ctx, README_CONTENT, &self.config)
    }

    /// What syncing `incoming` into this directory would change.
    pub fn get_dir_diff(&self, incoming: &FmuDirectory) -> Result<DirDiff> {
        SyncEngine::new(self, incoming).diff()
    }

    /// Merge `incoming` into this directory.
    pub fn sync_dir(&self, incoming: &FmuDirectory) -> Result<SyncResult> {
        SyncEngine::new(self, incoming).sync()
    }
}

/// A checked `.fmu` entry and the context its managers share.
pub(crate) struct OpenedDir {
    pub base_path: PathBuf,
    pub path: PathBuf,
    pub ctx: Arc<DirContext>,
}

impl OpenedDir {
    pub(crate) fn open(base_path: &Path, actor: Actor, options: DirectoryOptions) -> Result<Self> {
        let base_path = resolve(base_path);
        let path = base_path.join(FmuPath::FmuDir);
        tracing::debug!(base = %base_path.display(), "opening .fmu directory");
        if !path.exists() {
            return Err(Error::DirectoryNotFound { path: base_path });
        }
        if !path.is_dir() {
            return Err(Error::NotADirectory { path: base_path });
        }

        let fmu_path = NormalizedPath::new(&path);
        let ctx = Arc::new(DirContext {
            lock: LockManager::new(&fmu_path, actor.clone(), options.lock_timeout),
            cache: CacheManager::new(&fmu_path, CacheManager::MIN_REVISIONS),
            fmu_path,
            actor,
        });
        Ok(Self {
            base_path,
            path,
            ctx,
        })
    }
}

/// Create an empty `.fmu` under `base_path` and return the resolved base.
pub(crate) fn create_fmu_dir(base_path: &Path) -> Result<PathBuf> {
    let base_path = resolve(base_path);
    let fmu_path = base_path.join(FmuPath::FmuDir);
    if fmu_path.exists() {
        return Err(Error::AlreadyExists { path: fmu_path });
    }
    fs::create_dir_all(&fmu_path).map_err(|e| fmu_fs::Error::io(&fmu_path, e))?;
    Ok(base_path)
}

pub(crate) fn apply_runtime_config<C: ConfigDocument>(
    ctx: &DirContext,
    config: &ConfigManager<C>,
) -> Result<()> {
    if config.exists() {
        let record = config.load()?;
        ctx.cache
            .set_max_revisions(record.cache_max_revisions() as usize);
    }
    Ok(())
}

pub(crate) fn restore_layout<C: ConfigDocument>(
    ctx: &DirContext,
    readme: &str,
    config: &ConfigManager<C>,
) -> Result<()> {
    let path = ctx.fmu_path.to_native();
    if !path.is_dir() {
        fs::create_dir_all(&path).map_err(|e| fmu_fs::Error::io(&path, e))?;
        tracing::info!(path = %path.display(), "recreated missing .fmu directory");
    }

    if !ctx.file(FmuPath::Readme.as_str()).exists() {
        ctx.write_file(FmuPath::Readme.as_str(), readme.as_bytes())?;
        tracing::info!("restored README");
    }

    if config.exists() {
        return Ok(());
    }
    let cached = match ctx.cache.latest_revision(FmuPath::Config.as_str())? {
        Some(revision) => serde_json::from_str::<C>(&io::read_text(&revision)?)
            .map_err(|e| {
                tracing::warn!(path = %revision, error = %e, "unusable cached config");
            })
            .ok(),
        None => None,
    };
    match cached {
        Some(record) => {
            config.save(&record)?;
            tracing::info!("restored config.json from cache");
        }
        None => {
            config.reset()?;
            tracing::info!("restored config.json from defaults");
        }
    }
    Ok(())
}

impl DirContext {
    pub(crate) fn file(&self, relative_path: &str) -> NormalizedPath {
        self.fmu_path.join(relative_path)
    }

    pub(crate) fn read_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        Ok(io::read_bytes(&self.file(relative_path))?)
    }

    pub(crate) fn read_text_file(&self, relative_path: &str) -> Result<String> {
        Ok(io::read_text(&self.file(relative_path))?)
    }

    pub(crate) fn write_file(&self, relative_path: &str, data: &[u8]) -> Result<()> {
        self.lock.ensure_can_write()?;
        let path = self.file(relative_path);
        io::write_atomic(&path, data)?;
        tracing::debug!(path = %path, bytes = data.len(), "wrote file");
        Ok(())
    }

    pub(crate) fn list_files(&self, subdirectory: Option<&str>) -> Result<Vec<PathBuf>> {
        let base = match subdirectory {
            Some(sub) => self.file(sub).to_native(),
            None => self.fmu_path.to_native(),
        };
        if !base.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&base).map_err(|e| fmu_fs::Error::io(&base, e))? {
            let path = entry.map_err(|e| fmu_fs::Error::io(&base, e))?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub(crate) fn ensure_directory(&self, relative_path: &str) -> Result<PathBuf> {
        let path = self.file(relative_path).to_native();
        fs::create_dir_all(&path).map_err(|e| fmu_fs::Error::io(&path, e))?;
        Ok(path)
    }
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
