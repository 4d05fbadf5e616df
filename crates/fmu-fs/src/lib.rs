//! Filesystem primitives for `.fmu` settings directories
//!
//! Provides normalized paths, atomic locked writes and a JSON document store
//! used by the resource managers in `fmu-settings`.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use constants::FmuPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use store::JsonStore;
