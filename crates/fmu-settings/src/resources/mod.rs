//! File-backed resources inside a `.fmu` directory
//!
//! Each resource is one JSON document at a fixed path relative to the
//! `.fmu` root. [`ResourceManager`] provides validated load and save; the
//! specialized managers layer change logging, diffing and merging on top.

mod cache;
mod changelog;
mod config;
pub(crate) mod fields;
mod lock;
mod mappings;

pub use cache::CacheManager;
pub use changelog::{ChangelogManager, LogManager};
pub use config::{ConfigManager, UserConfigManager};
pub use lock::{DEFAULT_LOCK_TIMEOUT, LockInfo, LockManager};
pub use mappings::MappingsManager;

use std::marker::PhantomData;
use std::sync::Arc;

use fmu_fs::{FmuPath, JsonStore, NormalizedPath};

use crate::actor::Actor;
use crate::models::Document;
use crate::{Error, Result};

/// State shared by every resource manager of one directory.
#[derive(Debug)]
pub(crate) struct DirContext {
    pub fmu_path: NormalizedPath,
    pub actor: Actor,
    pub lock: LockManager,
    pub cache: CacheManager,
}

/// Validated load and save of one JSON document.
#[derive(Debug)]
pub struct ResourceManager<T> {
    ctx: Arc<DirContext>,
    relative: FmuPath,
    name: &'static str,
    cached: bool,
    store: JsonStore,
    _document: PhantomData<fn() -> T>,
}

impl<T: Document> ResourceManager<T> {
    pub(crate) fn new(ctx: Arc<DirContext>, relative: FmuPath, name: &'static str) -> Self {
        Self {
            ctx,
            relative,
            name,
            cached: false,
            store: JsonStore::new(),
            _document: PhantomData,
        }
    }

    /// Store a cache revision on every save.
    pub(crate) fn with_cache(mut self) -> Self {
        self.cached = true;
        self
    }

    /// Manager name used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Path relative to the `.fmu` directory.
    pub fn relative_path(&self) -> &'static str {
        self.relative.as_str()
    }

    pub fn path(&self) -> NormalizedPath {
        self.ctx.fmu_path.join(self.relative)
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Load, deserialize and validate the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if the file is absent,
    /// [`Error::Validation`] if the stored document breaks its own rules, or
    /// a filesystem error if it cannot be read or parsed.
    pub fn load(&self) -> Result<T> {
        let path = self.path();
        if !path.is_file() {
            return Err(Error::ResourceNotFound {
                resource: self.name.to_string(),
                path: path.to_native(),
            });
        }
        let document: T = self.store.load(&path)?;
        self.check(&document)?;
        Ok(document)
    }

    fn check(&self, document: &T) -> Result<()> {
        match document.validate() {
            Ok(()) => Ok(()),
            Err(message) => Err(Error::Validation {
                manager: self.name.to_string(),
                value: serde_json::to_string(document)?,
                message,
            }),
        }
    }

    /// Validate, lock-check and atomically write the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is invalid and
    /// [`Error::LockHeld`] if another process holds the write lock. Nothing
    /// is written in either case.
    pub fn save(&self, document: &T) -> Result<()> {
        self.check(document)?;
        self.ctx.lock.ensure_can_write()?;

        let path = self.path();
        let content = self.store.save(&path, document)?;
        tracing::debug!(resource = self.name, path = %path, "saved resource");

        if self.cached {
            self.ctx
                .cache
                .store_revision(self.relative.as_str(), &content, self.ctx.actor.now())?;
        }
        Ok(())
    }

    pub(crate) fn ctx(&self) -> &DirContext {
        &self.ctx
    }
}
