//! AppPaths - data directory layout
//!
//! Centralizes every file the console writes under one base directory.
//!
//! ## Directory structure
//!
//! ```text
//! {base}/
//! ├── config.json          # Saved configuration
//! ├── session.json         # Persisted admin session
//! └── logs/                # Rolling daily log files
//!     └── orgdesk.log.*
//! ```

use std::path::{Path, PathBuf};

/// Resolves the per-user data directory, e.g. `~/.local/share/orgdesk`.
///
/// Falls back to `./orgdesk-data` when the platform directory cannot be
/// determined.
pub fn default_base() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("orgdesk"))
        .unwrap_or_else(|| PathBuf::from("./orgdesk-data"))
}

/// Path manager for the console's data directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Base data directory
    base: PathBuf,
}

impl AppPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Configuration file: `{base}/config.json`
    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Persisted session file: `{base}/session.json`
    pub fn session_file(&self) -> PathBuf {
        self.base.join("session.json")
    }

    /// Log directory: `{base}/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    /// Ensures the base and log directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let paths = AppPaths::new("/data/orgdesk");

        assert_eq!(paths.base(), Path::new("/data/orgdesk"));
        assert_eq!(paths.config_file(), PathBuf::from("/data/orgdesk/config.json"));
        assert_eq!(
            paths.session_file(),
            PathBuf::from("/data/orgdesk/session.json")
        );
        assert_eq!(paths.logs_dir(), PathBuf::from("/data/orgdesk/logs"));
    }

    #[test]
    fn test_ensure_dirs_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path().join("nested/orgdesk"));

        paths.ensure_dirs().unwrap();

        assert!(paths.base().is_dir());
        assert!(paths.logs_dir().is_dir());
    }
}
