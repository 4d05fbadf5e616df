//! The per-user `.fmu` directory
//!
//! [`UserFmuDirectory`] lives at `$HOME/.fmu` and carries settings that
//! follow a user between projects. It shares the lock, cache and changelog
//! wiring of a project directory but owns a [`UserConfig`] and no mappings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use fmu_fs::{FmuPath, io};

use crate::actor::Actor;
use crate::dir::{
    DirectoryOptions, OpenedDir, apply_runtime_config, create_fmu_dir, restore_layout,
};
use crate::models::UserConfig;
use crate::resources::{
    CacheManager, ChangelogManager, DirContext, LockManager, UserConfigManager,
};
use crate::{Error, Result};

const USER_README_CONTENT: &str = "\
This directory contains personal settings for FMU tools.

It holds user-level configuration such as API keys and recently opened
projects. Files here are managed by fmu-settings and every change is recorded
in logs/changelog.json. Do not share this directory: it may contain secrets.
";

/// An opened `$HOME/.fmu` directory.
#[derive(Debug)]
pub struct UserFmuDirectory {
    base_path: PathBuf,
    path: PathBuf,
    ctx: Arc<DirContext>,
    config: UserConfigManager,
    changelog: Arc<ChangelogManager>,
}

impl UserFmuDirectory {
    /// Create `$HOME/.fmu` with a README and a default user config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeNotFound`] if the home directory cannot be
    /// determined and [`Error::AlreadyExists`] if `.fmu` is already there.
    pub fn init(actor: Actor) -> Result<Self> {
        Self::init_at(home()?, actor, DirectoryOptions::default())
    }

    /// Create the user directory under an explicit home.
    pub fn init_at(
        home: impl AsRef<Path>,
        actor: Actor,
        options: DirectoryOptions,
    ) -> Result<Self> {
        let home = create_fmu_dir(home.as_ref())?;
        let dir = Self::open_at(&home, actor, options)?;
        io::write_text(&dir.ctx.file(FmuPath::Readme.as_str()), USER_README_CONTENT)?;
        dir.config.save(&UserConfig::new(dir.actor().now()))?;
        tracing::info!(path = %dir.path.display(), "initialized user .fmu directory");
        Ok(dir)
    }

    /// Open `$HOME/.fmu`.
    pub fn open(actor: Actor) -> Result<Self> {
        Self::open_at(home()?, actor, DirectoryOptions::default())
    }

    /// Open the user directory under an explicit home.
    pub fn open_at(
        home: impl AsRef<Path>,
        actor: Actor,
        options: DirectoryOptions,
    ) -> Result<Self> {
        let OpenedDir {
            base_path,
            path,
            ctx,
        } = OpenedDir::open(home.as_ref(), actor, options)?;
        let changelog = Arc::new(ChangelogManager::changelog(Arc::clone(&ctx)));
        let dir = Self {
            config: UserConfigManager::new(Arc::clone(&ctx), Arc::clone(&changelog)),
            changelog,
            ctx,
            base_path,
            path,
        };
        dir.sync_runtime_variables()?;
        Ok(dir)
    }

    /// The home directory containing `.fmu`.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn actor(&self) -> &Actor {
        &self.ctx.actor
    }

    pub fn config(&self) -> &UserConfigManager {
        &self.config
    }

    pub fn changelog(&self) -> &ChangelogManager {
        &self.changelog
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

    pub fn sync_runtime_variables(&self) -> Result<()> {
        apply_runtime_config(&self.ctx, &self.config)
    }

    pub fn get_config_value(&self, key: &str) -> Result<Option<Value>> {
        self.config.get(key)
    }

    pub fn set_config_value(&self, key: &str, value: Value) -> Result<()> {
        tracing::info!(key, path = %self.path.display(), "setting user config value");
        self.config.set(key, value)?;
        Ok(())
    }

    pub fn update_config(&self, updates: Vec<(String, Value)>) -> Result<UserConfig> {
        self.config.update(updates)
    }

    /// Record `project` as the most recently opened project directory.
    pub fn add_recent_project(&self, project: impl AsRef<Path>) -> Result<UserConfig> {
        let recent = self
            .config
            .load()?
            .with_recent_project(project.as_ref().to_path_buf());
        self.update_config(vec![(
            "recent_project_directories".to_string(),
            serde_json::to_value(recent)?,
        )])
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

    pub fn write_file(&self, relative_path: &str, data: &[u8]) -> Result<()> {
        self.ctx.write_file(relative_path, data)
    }

    pub fn write_text_file(&self, relative_path: &str, content: &str) -> Result<()> {
        self.ctx.write_file(relative_path, content.as_bytes())
    }

    pub fn list_files(&self, subdirectory: Option<&str>) -> Result<Vec<PathBuf>> {
        self.ctx.list_files(subdirectory)
    }

    pub fn ensure_directory(&self, relative_path: &str) -> Result<PathBuf> {
        self.ctx.ensure_directory(relative_path)
    }

    /// Recreate whatever is missing of the directory, README and user config.
    pub fn restore(&self) -> Result<()> {
        restore_layout(&self.ctx, USER_README_CONTENT, &self.config)
    }
}

fn home() -> Result<PathBuf> {
    dirs::home_dir().ok_or(Error::HomeNotFound)
}
