//! Configuration loading.
//!
//! Reads `config.toml`, falls back to defaults when the file is absent, then
//! applies `CAIRN_API_URL` / `CAIRN_API_TOKEN` overrides and validates.

use crate::paths::CairnPaths;
use cairn_core::config::CairnConfig;
use cairn_core::error::Result;
use std::path::Path;

pub const ENV_API_URL: &str = "CAIRN_API_URL";
pub const ENV_API_TOKEN: &str = "CAIRN_API_TOKEN";

pub struct ConfigService;

impl ConfigService {
    /// Loads from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<CairnConfig> {
        let default_path;
        let path = match path {
            Some(path) => path,
            None => {
                default_path = CairnPaths::config_file()?;
                default_path.as_path()
            }
        };
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Loads from `path` using `lookup` for environment overrides.
    pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<CairnConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            tracing::debug!("[ConfigService] Loading {}", path.display());
            CairnConfig::from_toml_str(&std::fs::read_to_string(path)?)?
        } else {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            CairnConfig::default()
        };

        Self::apply_env_overrides(&mut config, lookup);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides<F>(config: &mut CairnConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            config.api.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigService::load_with_env(&temp_dir.path().join("config.toml"), no_env).unwrap();
        assert_eq!(config, CairnConfig::default());
    }

    #[test]
    fn test_file_values_and_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://file.example.com\"\n\n[auto_save]\ninterval_ms = 9000\n",
        )
        .unwrap();

        let config = ConfigService::load_with_env(&path, no_env).unwrap();
        assert_eq!(config.api.base_url, "https://file.example.com");
        assert_eq!(config.auto_save.interval_ms, 9000);

        let config = ConfigService::load_with_env(&path, |key| match key {
            ENV_API_URL => Some("https://env.example.com".to_string()),
            ENV_API_TOKEN => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api.base_url, "https://env.example.com");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_env_url_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigService::load_with_env(&temp_dir.path().join("config.toml"), |key| {
            (key == ENV_API_URL).then(|| "localhost:3000".to_string())
        })
        .unwrap_err();
        assert!(err.is_config());
    }
}
