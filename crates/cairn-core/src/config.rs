//! Configuration model.
//!
//! ```toml
//! [api]
//! base_url = "https://cairn.example.com"
//! timeout_secs = 30
//!
//! [auto_save]
//! enabled = true
//! interval_ms = 30000
//!
//! [checkpoints]
//! default_limit = 20
//! max_age_days = 30
//! ```

use crate::checkpoint::{DEFAULT_CHECKPOINT_LIMIT, DEFAULT_MAX_AGE_DAYS};
use crate::error::{CairnError, Result};
use crate::state::DEFAULT_AUTO_SAVE_INTERVAL_MS;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CheckpointsConfig {
    pub default_limit: u32,
    pub max_age_days: i64,
}

impl Default for CheckpointsConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_CHECKPOINT_LIMIT,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CairnConfig {
    pub api: ApiConfig,
    pub auto_save: AutoSaveConfig,
    pub checkpoints: CheckpointsConfig,
}

impl CairnConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(CairnError::config("api.base_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CairnError::config(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(CairnError::config("api.timeout_secs must be positive"));
        }
        if self.auto_save.interval_ms == 0 {
            return Err(CairnError::config("auto_save.interval_ms must be positive"));
        }
        if self.checkpoints.default_limit == 0 {
            return Err(CairnError::config("checkpoints.default_limit must be positive"));
        }
        if self.checkpoints.max_age_days <= 0 {
            return Err(CairnError::config("checkpoints.max_age_days must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = CairnConfig::from_toml_str("").unwrap();
        assert_eq!(config, CairnConfig::default());
        assert_eq!(config.auto_save.interval_ms, 30_000);
    }

    #[test]
    fn test_partial_sections() {
        let config = CairnConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://cairn.example.com"

            [auto_save]
            interval_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://cairn.example.com");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.auto_save.enabled);
        assert_eq!(config.auto_save.interval_ms, 1500);
    }

    #[test]
    fn test_zero_interval_is_config_error() {
        let err = CairnConfig::from_toml_str("[auto_save]\ninterval_ms = 0\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_bad_url_is_config_error() {
        let err = CairnConfig::from_toml_str("[api]\nbase_url = \"ftp://nope\"\n").unwrap_err();
        assert!(err.is_config());
    }
}
