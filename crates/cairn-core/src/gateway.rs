//! Persistence gateway trait.
//!
//! Defines the interface the session store uses to reach the backend.

use crate::checkpoint::{
    Checkpoint, CheckpointFilter, CheckpointMetadataUpdate, NewCheckpoint, RestoreCheckpointOptions,
};
use crate::error::Result;
use crate::session::{NewSessionConfig, RestoreSessionOptions, Session, SessionSnapshot, WorkspaceState};
use async_trait::async_trait;

/// An abstract gateway to the checkpoint/session backend.
///
/// This trait decouples the session store from the transport (HTTP in
/// production, in-memory fakes in tests).
///
/// # Implementation Notes
///
/// Implementations should:
/// - Map non-success responses to `CairnError::Gateway` carrying the
///   backend's error message
/// - Map connection failures and timeouts to `CairnError::Transport`
/// - Apply any timeout policy themselves; the store imposes none
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Creates a checkpoint and returns the id assigned by the backend.
    async fn create_checkpoint(&self, request: &NewCheckpoint) -> Result<String>;

    /// Lists checkpoints matching the filter.
    async fn list_checkpoints(&self, filter: &CheckpointFilter) -> Result<Vec<Checkpoint>>;

    /// Restores a checkpoint, returning the session it now belongs to and its
    /// workspace state.
    async fn restore_checkpoint(
        &self,
        checkpoint_id: &str,
        options: &RestoreCheckpointOptions,
    ) -> Result<SessionSnapshot>;

    /// Deletes a checkpoint.
    async fn delete_checkpoint(&self, checkpoint_id: &str) -> Result<()>;

    /// Applies a partial metadata update and returns the backend's copy.
    async fn update_checkpoint_metadata(
        &self,
        checkpoint_id: &str,
        update: &CheckpointMetadataUpdate,
    ) -> Result<Checkpoint>;

    /// Persists the workspace state of a session.
    async fn save_session(&self, session_id: &str, workspace_state: &WorkspaceState) -> Result<Session>;

    /// Loads a session with its workspace state.
    async fn restore_session(
        &self,
        session_id: &str,
        options: &RestoreSessionOptions,
    ) -> Result<SessionSnapshot>;

    /// Creates a new session.
    async fn create_session(&self, config: &NewSessionConfig) -> Result<Session>;
}
