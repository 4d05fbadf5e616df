//! Settings directories for FMU projects
//!
//! A `.fmu` directory holds a small set of JSON resources next to a project,
//! much like `.git`:
//!
//! - **config** (`config.json`): the project configuration record
//! - **changelog** (`logs/changelog.json`): an append-only record of every change
//! - **mappings** (`mappings.json`): identifier mappings between data systems
//!
//! plus a write lock and a cache of prior revisions. Two copies of a
//! directory can be compared with [`FmuDirectory::get_dir_diff`] and
//! reconciled with [`FmuDirectory::sync_dir`].
//!
//! Settings that follow a user rather than a project live in
//! `$HOME/.fmu`, opened with [`UserFmuDirectory`].
//!
//! # Architecture
//!
//! ```text
//!               fmu-cli
//!                  |
//!            fmu-settings
//!   dir -> sync -> resources -> models
//!                  |
//!               fmu-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fmu_settings::{Actor, FmuDirectory, Result};
//!
//! fn example() -> Result<()> {
//!     let current = FmuDirectory::open("/project", Actor::from_env())?;
//!     let incoming = FmuDirectory::open("/copy/of/project", Actor::from_env())?;
//!     let merged = current.sync_dir(&incoming)?;
//!     println!("updated {} resources", merged.len());
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod dir;
pub mod error;
pub mod models;
pub mod resources;
pub mod sync;
pub mod user_dir;

pub use actor::{Actor, Clock, FixedClock, SteppingClock, SystemClock};
pub use dir::{DirectoryOptions, FmuDirectory};
pub use error::{Error, Result};
pub use models::{
    ChangeInfo, ChangeType, ConfigDocument, Document, Filter, FilterOperator, FilterType, Log,
    LogEntry, Mappings, ProjectConfig, UserConfig,
};
pub use resources::{
    CacheManager, ChangelogManager, ConfigManager, LockInfo, LockManager, LogManager,
    MappingsManager, ResourceManager, UserConfigManager,
};
pub use sync::{
    ChangePayload, DirDiff, MergedResource, ResourceChange, ResourceKind, SyncEngine,
    SyncResource, SyncResult,
};
pub use user_dir::UserFmuDirectory;
