//! JSON document loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Loads and saves serde documents as pretty-printed JSON.
///
/// All writes go through [`io::write_atomic`], so a reader never observes a
/// half-written document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStore;

impl JsonStore {
    pub fn new() -> Self {
        Self
    }

    /// Load and deserialize a document.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        serde_json::from_str(&content).map_err(|e| Error::Parse {
            path: path.to_native(),
            message: e.to_string(),
        })
    }

    /// Serialize a document to its on-disk text without writing it.
    pub fn render<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| Error::Serialize {
            path: path.to_native(),
            message: e.to_string(),
        })
    }

    /// Serialize and atomically write a document. Returns the written text.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<String> {
        let content = self.render(path, value)?;
        io::write_atomic(path, content.as_bytes())?;
        Ok(content)
    }
}
