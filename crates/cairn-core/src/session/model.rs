//! Session domain model.

use super::workspace::WorkspaceState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted session as the backend reports it.
///
/// The store never edits a `Session` field by field. It is replaced wholesale
/// with whatever the backend returns from create, save and restore calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Workspace the session belongs to
    pub workspace_id: String,
    /// Human-readable session name
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Last time the backend accepted a save, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checkpoint_count: u32,
    /// Combined compressed size of all checkpoints, in bytes
    #[serde(default)]
    pub total_size: i64,
}

/// Session plus its workspace state, as returned by the restore endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session: Session,
    #[serde(default)]
    pub workspace_state: WorkspaceState,
}

/// Parameters for creating a brand new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionConfig {
    pub user_id: String,
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub workspace_state: WorkspaceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl NewSessionConfig {
    pub fn new(
        user_id: impl Into<String>,
        workspace_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            workspace_id: workspace_id.into(),
            name: name.into(),
            workspace_state: WorkspaceState::default(),
            encryption_key: None,
        }
    }

    pub fn with_workspace_state(mut self, state: WorkspaceState) -> Self {
        self.workspace_state = state;
        self
    }
}

/// Options for restoring a session by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSessionOptions {
    /// Key used to decrypt an encrypted session payload
    pub encryption_key: Option<String>,
}
