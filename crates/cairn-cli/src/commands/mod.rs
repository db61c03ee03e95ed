pub mod autosave;
pub mod checkpoint;
pub mod session;

use anyhow::{Context as _, Result};
use cairn_application::SessionStore;
use cairn_core::config::CairnConfig;
use cairn_core::session::RestoreSessionOptions;
use cairn_infrastructure::{ConfigService, FilePreferencesRepository, HttpPersistenceGateway};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs: loaded config and a store wired to the API.
pub struct Context {
    pub config: CairnConfig,
    pub store: Arc<SessionStore>,
}

impl Context {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = ConfigService::load(config_path).context("Failed to load configuration")?;
        let gateway = HttpPersistenceGateway::from_config(&config.api)?;
        let preferences = FilePreferencesRepository::new_default()?;
        let store = SessionStore::with_preferences(Arc::new(gateway), Arc::new(preferences)).await;

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Makes `session_id` the store's current session.
    pub async fn open_session(&self, session_id: &str) -> Result<()> {
        if !self
            .store
            .restore_session(session_id, RestoreSessionOptions::default())
            .await
        {
            anyhow::bail!("Could not restore session {}", session_id);
        }
        Ok(())
    }
}
