//! Preferences repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::model::StorePreferences;

/// Repository for the locally persisted store preferences.
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Loads preferences, falling back to defaults when nothing is stored.
    async fn load(&self) -> Result<StorePreferences>;

    /// Saves preferences to storage.
    async fn save(&self, preferences: &StorePreferences) -> Result<()>;
}
