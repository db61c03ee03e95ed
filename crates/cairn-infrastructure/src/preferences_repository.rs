//! Local persistence for store preferences.
//!
//! Only auto-save settings and the checkpoint filter are kept between runs;
//! everything else is rebuilt from the backend.

use crate::paths::CairnPaths;
use crate::storage::NamespacedTomlFile;
use async_trait::async_trait;
use cairn_core::error::{CairnError, Result};
use cairn_core::state::{PreferencesRepository, StorePreferences};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Namespace key the store preferences live under.
pub const PREFERENCES_NAMESPACE: &str = "session-store";

/// File-backed preferences under a single namespaced key.
#[derive(Debug, Clone)]
pub struct FilePreferencesRepository {
    file: NamespacedTomlFile,
}

impl FilePreferencesRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: NamespacedTomlFile::new(path),
        }
    }

    /// Uses `~/.config/cairn/preferences.toml`.
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(CairnPaths::preferences_file()?))
    }
}

#[async_trait]
impl PreferencesRepository for FilePreferencesRepository {
    async fn load(&self) -> Result<StorePreferences> {
        let file = self.file.clone();
        let stored = tokio::task::spawn_blocking(move || file.load::<StorePreferences>(PREFERENCES_NAMESPACE))
            .await
            .map_err(|e| CairnError::internal(format!("Failed to join task: {}", e)))??;

        match stored {
            Some(preferences) => {
                if let Err(e) = preferences.validate() {
                    tracing::warn!("[Preferences] Ignoring stored preferences: {}", e);
                    return Ok(StorePreferences::default());
                }
                Ok(preferences)
            }
            None => Ok(StorePreferences::default()),
        }
    }

    async fn save(&self, preferences: &StorePreferences) -> Result<()> {
        preferences.validate()?;

        let file = self.file.clone();
        let preferences = preferences.clone();
        tokio::task::spawn_blocking(move || file.store(PREFERENCES_NAMESPACE, &preferences))
            .await
            .map_err(|e| CairnError::internal(format!("Failed to join task: {}", e)))??;

        tracing::debug!("[Preferences] Saved to {}", self.file.path().display());
        Ok(())
    }
}

/// In-memory stand-in used by tests so runs never share state on disk.
#[derive(Debug, Default)]
pub struct InMemoryPreferencesRepository {
    preferences: Mutex<Option<StorePreferences>>,
}

impl InMemoryPreferencesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: StorePreferences) -> Self {
        Self {
            preferences: Mutex::new(Some(preferences)),
        }
    }

    /// Last saved value, if any.
    pub async fn stored(&self) -> Option<StorePreferences> {
        self.preferences.lock().await.clone()
    }
}

#[async_trait]
impl PreferencesRepository for InMemoryPreferencesRepository {
    async fn load(&self) -> Result<StorePreferences> {
        Ok(self.preferences.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, preferences: &StorePreferences) -> Result<()> {
        preferences.validate()?;
        *self.preferences.lock().await = Some(preferences.clone());
        Ok(())
    }
}
