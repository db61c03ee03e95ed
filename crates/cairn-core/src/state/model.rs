//! Session store state models.

use crate::checkpoint::{Checkpoint, CheckpointFilter, CheckpointPriority};
use crate::error::{CairnError, Result};
use crate::session::{Session, WorkspaceState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default auto-save period: 30 seconds.
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;

/// Draft fields of the "new checkpoint" form.
///
/// Independent of the checkpoint list; reset after a successful create or an
/// explicit cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointDraft {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub priority: CheckpointPriority,
}

/// Field-wise update for the draft form. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointDraftPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<CheckpointPriority>,
}

impl CheckpointDraft {
    pub fn apply(&mut self, patch: CheckpointDraftPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// The subset of store state kept in local storage between runs.
///
/// Session, workspace and checkpoint data are never persisted locally; they
/// are always reloaded from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePreferences {
    pub auto_save_enabled: bool,
    pub auto_save_interval_ms: u64,
    #[serde(default)]
    pub checkpoint_filter: CheckpointFilter,
}

impl Default for StorePreferences {
    fn default() -> Self {
        Self {
            auto_save_enabled: true,
            auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
            checkpoint_filter: CheckpointFilter::default(),
        }
    }
}

impl StorePreferences {
    pub fn validate(&self) -> Result<()> {
        if self.auto_save_interval_ms == 0 {
            return Err(CairnError::config("Auto-save interval must be a positive number of milliseconds"));
        }
        Ok(())
    }
}

/// Everything the session store owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_session: Option<Session>,
    pub workspace_state: Option<WorkspaceState>,
    /// Workspace state changed since the last successful save or restore
    pub is_dirty: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub auto_save_enabled: bool,
    pub auto_save_interval_ms: u64,
    pub checkpoints: Vec<Checkpoint>,
    pub checkpoint_filter: CheckpointFilter,

    // ============================================================================
    // Advisory in-flight flags (for UI disablement)
    // ============================================================================
    pub is_loading_checkpoints: bool,
    pub is_creating_checkpoint: bool,
    pub is_restoring_checkpoint: bool,

    pub checkpoint_form: CheckpointDraft,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::from_preferences(StorePreferences::default())
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state seeded with previously persisted preferences.
    pub fn from_preferences(preferences: StorePreferences) -> Self {
        Self {
            current_session: None,
            workspace_state: None,
            is_dirty: false,
            last_saved: None,
            auto_save_enabled: preferences.auto_save_enabled,
            auto_save_interval_ms: preferences.auto_save_interval_ms,
            checkpoints: Vec::new(),
            checkpoint_filter: preferences.checkpoint_filter,
            is_loading_checkpoints: false,
            is_creating_checkpoint: false,
            is_restoring_checkpoint: false,
            checkpoint_form: CheckpointDraft::default(),
        }
    }

    pub fn preferences(&self) -> StorePreferences {
        StorePreferences {
            auto_save_enabled: self.auto_save_enabled,
            auto_save_interval_ms: self.auto_save_interval_ms,
            checkpoint_filter: self.checkpoint_filter.clone(),
        }
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session.as_ref().map(|s| s.id.as_str())
    }

    pub fn has_active_session(&self) -> bool {
        self.current_session.is_some() && self.workspace_state.is_some()
    }
}
