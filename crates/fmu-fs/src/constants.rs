//! Well-known names inside a `.fmu` directory.

use std::path::Path;

/// Entries of a `.fmu` settings directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmuPath {
    /// The `.fmu` directory itself
    FmuDir,
    /// `config.json`, the configuration record
    Config,
    /// `logs/changelog.json`, the ordered change log
    Changelog,
    /// `mappings.json`, the mappings record
    Mappings,
    /// `.lock`, the write-lock marker
    Lock,
    /// `cache/`, revision snapshots
    CacheDir,
    /// `README`
    Readme,
}

impl FmuPath {
    /// Path relative to the `.fmu` directory (or the directory name for [`FmuPath::FmuDir`]).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FmuDir => ".fmu",
            Self::Config => "config.json",
            Self::Changelog => "logs/changelog.json",
            Self::Mappings => "mappings.json",
            Self::Lock => ".lock",
            Self::CacheDir => "cache",
            Self::Readme => "README",
        }
    }

    /// Final path component, as recorded in change log entries.
    pub fn file_name(&self) -> &'static str {
        let s = self.as_str();
        s.rsplit('/').next().unwrap_or(s)
    }
}

impl AsRef<Path> for FmuPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for FmuPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for FmuPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
