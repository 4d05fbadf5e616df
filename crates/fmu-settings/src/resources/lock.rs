//! Write lock for a `.fmu` directory
//!
//! The lock is a JSON marker file recording the owning host, process and
//! expiry. It is advisory: writers call [`LockManager::ensure_can_write`]
//! before touching any resource, and a lock past its expiry never blocks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fmu_fs::{FmuPath, JsonStore, NormalizedPath, io};

use crate::actor::Actor;
use crate::{Error, Result};

/// Default lifetime of an acquired lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Contents of the `.lock` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub hostname: String,
    pub user: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LockInfo {
    /// `hostname:pid` of the holder.
    pub fn owner(&self) -> String {
        format!("{}:{}", self.hostname, self.pid)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct LockManager {
    path: NormalizedPath,
    actor: Actor,
    timeout: chrono::Duration,
    store: JsonStore,
}

impl LockManager {
    pub fn new(fmu_path: &NormalizedPath, actor: Actor, timeout: Duration) -> Self {
        let timeout = chrono::Duration::from_std(timeout)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_LOCK_TIMEOUT.as_secs() as i64));
        Self {
            path: fmu_path.join(FmuPath::Lock),
            actor,
            timeout,
            store: JsonStore::new(),
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the current lock file, if any.
    ///
    /// An unreadable lock file is treated as absent so a crashed writer
    /// cannot wedge the directory.
    pub fn read(&self) -> Result<Option<LockInfo>> {
        if !self.exists() {
            return Ok(None);
        }
        match self.store.load::<LockInfo>(&self.path) {
            Ok(info) => Ok(Some(info)),
            Err(fmu_fs::Error::Parse { message, .. }) => {
                tracing::warn!(path = %self.path, %message, "ignoring corrupt lock file");
                Ok(None)
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_ours(&self, info: &LockInfo) -> bool {
        info.hostname == self.actor.hostname && info.pid == self.actor.pid
    }

    /// The lock held by someone else that is still live, if any.
    fn foreign_live_lock(&self) -> Result<Option<LockInfo>> {
        let now = self.actor.now();
        Ok(self
            .read()?
            .filter(|info| !self.is_ours(info) && !info.is_expired(now)))
    }

    fn held_error(&self, info: &LockInfo) -> Error {
        Error::LockHeld {
            path: self.path.to_native(),
            owner: info.owner(),
        }
    }

    /// Acquire or refresh the lock for this process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockHeld`] if another owner holds a live lock.
    pub fn acquire(&self) -> Result<LockInfo> {
        if let Some(info) = self.foreign_live_lock()? {
            return Err(self.held_error(&info));
        }
        let now = self.actor.now();
        let info = LockInfo {
            pid: self.actor.pid,
            hostname: self.actor.hostname.clone(),
            user: self.actor.user.clone(),
            acquired_at: now,
            expires_at: now + self.timeout,
        };
        self.store.save(&self.path, &info)?;
        tracing::debug!(path = %self.path, owner = %info.owner(), "acquired lock");
        Ok(info)
    }

    /// Release our lock. Releasing an absent or expired lock is a no-op.
    pub fn release(&self) -> Result<()> {
        if let Some(info) = self.foreign_live_lock()? {
            return Err(self.held_error(&info));
        }
        if self.exists() {
            io::remove_file(&self.path)?;
            tracing::debug!(path = %self.path, "released lock");
        }
        Ok(())
    }

    /// True if this process holds a live lock.
    pub fn is_acquired(&self) -> Result<bool> {
        let now = self.actor.now();
        Ok(self
            .read()?
            .is_some_and(|info| self.is_ours(&info) && !info.is_expired(now)))
    }

    /// Fail if another owner holds a live lock.
    pub fn ensure_can_write(&self) -> Result<()> {
        match self.foreign_live_lock()? {
            Some(info) => Err(self.held_error(&info)),
            None => Ok(()),
        }
    }
}
