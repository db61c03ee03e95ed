//! Path management for cairn's local files.
//!
//! ```text
//! ~/.config/cairn/
//! ├── config.toml          # Gateway URL, auto-save and checkpoint settings
//! └── preferences.toml     # Persisted store preferences ([session-store])
//! ```

use cairn_core::error::{CairnError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "cairn";

pub struct CairnPaths;

impl CairnPaths {
    /// Returns the cairn configuration directory (e.g. `~/.config/cairn/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CairnError::config("Cannot find configuration directory"))
    }

    /// Path to config.toml.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path to the local preferences store.
    pub fn preferences_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("preferences.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_config_dir() {
        // Skip on hosts without a resolvable config dir
        let Ok(dir) = CairnPaths::config_dir() else {
            return;
        };
        assert!(dir.ends_with("cairn"));
        assert_eq!(CairnPaths::config_file().unwrap(), dir.join("config.toml"));
        assert_eq!(CairnPaths::preferences_file().unwrap(), dir.join("preferences.toml"));
    }
}
