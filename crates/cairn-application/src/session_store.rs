//! Session state store.
//!
//! `SessionStore` owns the authoritative in-memory copy of the current
//! session, its workspace state, the dirty flag and the checkpoint list. All
//! backend traffic goes through a [`PersistenceGateway`].
//!
//! State sits behind a `std::sync::RwLock` and every mutation is a short
//! critical section. No lock is held across a gateway call, so each update is
//! atomic with respect to the others while calls themselves may interleave.

use cairn_core::OperationKind;
use cairn_core::checkpoint::{
    Checkpoint, CheckpointFilterPatch, CheckpointMetadataUpdate, CreateCheckpointOptions, NewCheckpoint,
    RestoreCheckpointOptions, sort_checkpoints, validate_checkpoint_description, validate_checkpoint_name,
    validate_checkpoint_tags, validate_metadata_update,
};
use cairn_core::error::{CairnError, Result};
use cairn_core::gateway::PersistenceGateway;
use cairn_core::session::{NewSessionConfig, RestoreSessionOptions, Session, SessionSnapshot, WorkspaceState};
use cairn_core::state::{CheckpointDraftPatch, PreferencesRepository, SessionState, StorePreferences};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::operation_guard::OperationGuard;

/// Options for [`SessionStore::save_session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Save even when nothing changed since the last save
    pub force: bool,
}

impl SaveOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// What a save attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend accepted the workspace state
    Saved,
    /// Nothing to save and not forced; no request was made
    Clean,
    /// No current session or workspace state
    NoActiveSession,
    /// Another save was already running
    InProgress,
    /// The backend call failed; state stays dirty for the next attempt
    Failed(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved | Self::Clean)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum InFlightFlag {
    Loading,
    Creating,
    Restoring,
}

impl InFlightFlag {
    fn index(self) -> usize {
        match self {
            Self::Loading => 0,
            Self::Creating => 1,
            Self::Restoring => 2,
        }
    }

    fn set(self, state: &mut SessionState, value: bool) {
        match self {
            Self::Loading => state.is_loading_checkpoints = value,
            Self::Creating => state.is_creating_checkpoint = value,
            Self::Restoring => state.is_restoring_checkpoint = value,
        }
    }
}

/// Number of running calls behind each advisory flag.
type FlagCounts = Arc<Mutex<[usize; 3]>>;

/// Raises an advisory flag and lowers it again once the last overlapping
/// holder is dropped.
///
/// Lock order is state, then counts.
struct FlagGuard {
    state: Arc<RwLock<SessionState>>,
    counts: FlagCounts,
    flag: InFlightFlag,
}

impl FlagGuard {
    fn raise(store: &SessionStore, flag: InFlightFlag) -> Self {
        let mut state = store.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut counts = store.flag_counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts[flag.index()] += 1;
        flag.set(&mut state, true);

        Self {
            state: Arc::clone(&store.state),
            counts: Arc::clone(&store.flag_counts),
            flag,
        }
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = &mut counts[self.flag.index()];
        *count = count.saturating_sub(1);
        self.flag.set(&mut state, *count > 0);
    }
}

/// The authoritative session/checkpoint state container.
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    gateway: Arc<dyn PersistenceGateway>,
    preferences: Option<Arc<dyn PreferencesRepository>>,
    guard: OperationGuard,
    flag_counts: FlagCounts,
}

impl SessionStore {
    /// Creates a store with default preferences and no local persistence.
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            gateway,
            preferences: None,
            guard: OperationGuard::new(),
            flag_counts: FlagCounts::default(),
        }
    }

    /// Creates a store seeded from, and writing back to, a preferences
    /// repository.
    ///
    /// Unreadable preferences are logged and replaced by defaults.
    pub async fn with_preferences(
        gateway: Arc<dyn PersistenceGateway>,
        repository: Arc<dyn PreferencesRepository>,
    ) -> Self {
        let preferences = match repository.load().await {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to load preferences, using defaults: {}", e);
                StorePreferences::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(SessionState::from_preferences(preferences))),
            gateway,
            preferences: Some(repository),
            guard: OperationGuard::new(),
            flag_counts: FlagCounts::default(),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    // ============================================================================
    // Observers
    // ============================================================================

    /// A copy of the whole state.
    pub fn snapshot(&self) -> SessionState {
        self.read(Clone::clone)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.read(|s| s.current_session.clone())
    }

    pub fn workspace_state(&self) -> Option<WorkspaceState> {
        self.read(|s| s.workspace_state.clone())
    }

    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        self.read(|s| s.checkpoints.clone())
    }

    pub fn is_dirty(&self) -> bool {
        self.read(|s| s.is_dirty)
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.read(|s| s.last_saved)
    }

    pub fn preferences(&self) -> StorePreferences {
        self.read(SessionState::preferences)
    }

    // ============================================================================
    // Direct setters
    // ============================================================================

    /// Replaces the current session. Does not touch the dirty flag.
    pub fn set_current_session(&self, session: Option<Session>) {
        self.write(|s| s.current_session = session);
    }

    /// Replaces the workspace state and marks the store dirty.
    pub fn set_workspace_state(&self, workspace_state: Option<WorkspaceState>) {
        self.write(|s| {
            s.workspace_state = workspace_state;
            s.is_dirty = true;
        });
    }

    /// Shallow-merges `partial` into the workspace state and marks the store
    /// dirty. Without existing workspace state nothing is merged.
    pub fn update_workspace_state(&self, partial: WorkspaceState) {
        self.write(|s| {
            if let Some(current) = s.workspace_state.as_mut() {
                current.merge(partial);
            }
            s.is_dirty = true;
        });
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.write(|s| s.is_dirty = dirty);
    }

    /// Updates auto-save settings. `interval_ms` of `None` keeps the current
    /// interval; zero is a configuration error.
    pub async fn set_auto_save(&self, enabled: bool, interval_ms: Option<u64>) -> Result<()> {
        if interval_ms == Some(0) {
            return Err(CairnError::config(
                "Auto-save interval must be a positive number of milliseconds",
            ));
        }

        self.write(|s| {
            s.auto_save_enabled = enabled;
            if let Some(interval) = interval_ms {
                s.auto_save_interval_ms = interval;
            }
        });
        self.persist_preferences().await;
        Ok(())
    }

    // ============================================================================
    // Checkpoint operations
    // ============================================================================

    /// Creates a checkpoint of the current workspace state and reloads the
    /// checkpoint list for the current session.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` without a current session and workspace state
    /// - `Validation` for a bad name, description or tags (before any request)
    /// - `OperationInProgress` while another create is running
    /// - Gateway errors from the create call
    pub async fn create_checkpoint(&self, name: &str, options: CreateCheckpointOptions) -> Result<String> {
        let (session_id, workspace_state) = self
            .read(|s| match (&s.current_session, &s.workspace_state) {
                (Some(session), Some(workspace)) => Some((session.id.clone(), workspace.clone())),
                _ => None,
            })
            .ok_or(CairnError::NoActiveSession)?;

        validate_checkpoint_name(name)?;
        validate_checkpoint_description(options.description.as_deref())?;
        validate_checkpoint_tags(&options.tags)?;

        let _permit = self.guard.try_acquire(OperationKind::CreateCheckpoint)?;
        let _flag = FlagGuard::raise(self, InFlightFlag::Creating);

        let request = NewCheckpoint::new(session_id.clone(), name, workspace_state, options);
        let checkpoint_id = self.gateway.create_checkpoint(&request).await?;
        tracing::info!(
            "[SessionStore] Created checkpoint {} for session {}",
            checkpoint_id,
            session_id
        );

        self.write(|s| s.checkpoint_form = Default::default());

        // The backend computes sizes and ordering, so always take its list.
        if let Err(e) = self
            .fetch_checkpoints(CheckpointFilterPatch::for_session(session_id))
            .await
        {
            tracing::warn!(
                "[SessionStore] Checkpoint {} created but list reload failed: {}",
                checkpoint_id,
                e
            );
        }

        Ok(checkpoint_id)
    }

    /// Fetches checkpoints with `filter` merged onto the stored filter, then
    /// stores both the list and the merged filter.
    pub async fn load_checkpoints(&self, filter: CheckpointFilterPatch) -> Result<Vec<Checkpoint>> {
        let _permit = self.guard.try_acquire(OperationKind::LoadCheckpoints)?;
        self.fetch_checkpoints(filter).await
    }

    async fn fetch_checkpoints(&self, patch: CheckpointFilterPatch) -> Result<Vec<Checkpoint>> {
        let filter = self.read(|s| s.checkpoint_filter.merged(patch));
        let _flag = FlagGuard::raise(self, InFlightFlag::Loading);

        let fetched = self.gateway.list_checkpoints(&filter).await?;
        let checkpoints = sort_checkpoints(&fetched, filter.sort_by, filter.sort_order);
        tracing::debug!(
            "[SessionStore] Loaded {} checkpoints (session: {:?})",
            checkpoints.len(),
            filter.session_id
        );

        self.write(|s| {
            s.checkpoints = checkpoints.clone();
            s.checkpoint_filter = filter;
        });
        self.persist_preferences().await;

        Ok(checkpoints)
    }

    /// Restores a checkpoint. The restored session replaces the current one
    /// and the checkpoint list is reloaded for the restored session id.
    ///
    /// Gateway errors are returned unchanged.
    pub async fn restore_checkpoint(
        &self,
        checkpoint_id: &str,
        options: RestoreCheckpointOptions,
    ) -> Result<bool> {
        let _permit = self.guard.try_acquire(OperationKind::RestoreCheckpoint)?;
        let _flag = FlagGuard::raise(self, InFlightFlag::Restoring);

        let snapshot = self.gateway.restore_checkpoint(checkpoint_id, &options).await?;
        let session_id = self.apply_snapshot(snapshot);
        tracing::info!(
            "[SessionStore] Restored checkpoint {} into session {}",
            checkpoint_id,
            session_id
        );

        if let Err(e) = self
            .fetch_checkpoints(CheckpointFilterPatch::for_session(session_id))
            .await
        {
            tracing::warn!("[SessionStore] Restore succeeded but list reload failed: {}", e);
        }

        Ok(true)
    }

    /// Deletes a checkpoint, then drops it from the local list.
    pub async fn delete_checkpoint(&self, checkpoint_id: &str) -> Result<()> {
        self.gateway.delete_checkpoint(checkpoint_id).await?;
        self.write(|s| s.checkpoints.retain(|c| c.id != checkpoint_id));
        tracing::info!("[SessionStore] Deleted checkpoint {}", checkpoint_id);
        Ok(())
    }

    /// Updates checkpoint metadata and swaps in the backend's copy.
    pub async fn update_checkpoint_metadata(
        &self,
        checkpoint_id: &str,
        update: CheckpointMetadataUpdate,
    ) -> Result<Checkpoint> {
        validate_metadata_update(&update)?;

        let updated = self
            .gateway
            .update_checkpoint_metadata(checkpoint_id, &update)
            .await?;

        self.write(|s| {
            if let Some(slot) = s.checkpoints.iter_mut().find(|c| c.id == checkpoint_id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    // ============================================================================
    // Session operations
    // ============================================================================

    /// Saves the workspace state. Best effort: failures are logged and
    /// reported as `false`.
    pub async fn save_session(&self, options: SaveOptions) -> bool {
        self.save_session_outcome(options).await.is_success()
    }

    /// Like [`save_session`](Self::save_session) but reports what happened.
    pub async fn save_session_outcome(&self, options: SaveOptions) -> SaveOutcome {
        let (dirty, target) = self.read(|s| {
            let target = match (&s.current_session, &s.workspace_state) {
                (Some(session), Some(workspace)) => Some((session.id.clone(), workspace.clone())),
                _ => None,
            };
            (s.is_dirty, target)
        });

        if !dirty && !options.force {
            return SaveOutcome::Clean;
        }
        let Some((session_id, workspace_state)) = target else {
            tracing::debug!("[SessionStore] Save skipped: no active session");
            return SaveOutcome::NoActiveSession;
        };

        let Ok(_permit) = self.guard.try_acquire(OperationKind::SaveSession) else {
            return SaveOutcome::InProgress;
        };

        match self.gateway.save_session(&session_id, &workspace_state).await {
            Ok(session) => {
                self.write(|s| {
                    s.current_session = Some(session);
                    // edits made while the request was in flight still need saving
                    if s.workspace_state.as_ref() == Some(&workspace_state) {
                        s.is_dirty = false;
                    }
                    s.last_saved = Some(Utc::now());
                });
                tracing::debug!("[SessionStore] Saved session {}", session_id);
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to save session {}: {}", session_id, e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Loads a session from the backend and makes it current. Best effort:
    /// failures are logged and reported as `false`, leaving state untouched.
    pub async fn restore_session(&self, session_id: &str, options: RestoreSessionOptions) -> bool {
        let Ok(_permit) = self.guard.try_acquire(OperationKind::RestoreSession) else {
            tracing::debug!("[SessionStore] Restore of {} skipped: already restoring", session_id);
            return false;
        };

        let snapshot = match self.gateway.restore_session(session_id, &options).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to restore session {}: {}", session_id, e);
                return false;
            }
        };

        let restored_id = self.apply_snapshot(snapshot);
        tracing::info!("[SessionStore] Restored session {}", restored_id);

        if let Err(e) = self
            .fetch_checkpoints(CheckpointFilterPatch::for_session(restored_id))
            .await
        {
            tracing::warn!("[SessionStore] Session restored but list reload failed: {}", e);
        }
        true
    }

    /// Creates a session on the backend and makes it current with an empty
    /// checkpoint list.
    pub async fn create_new_session(&self, config: NewSessionConfig) -> Result<String> {
        let session = self.gateway.create_session(&config).await?;
        let session_id = session.id.clone();

        self.write(|s| {
            s.current_session = Some(session);
            s.workspace_state = Some(config.workspace_state);
            s.is_dirty = false;
            s.last_saved = Some(Utc::now());
            s.checkpoints.clear();
        });
        tracing::info!("[SessionStore] Created session {}", session_id);
        Ok(session_id)
    }

    /// Forgets the current session, its workspace state and checkpoints.
    pub fn clear_session(&self) {
        self.write(|s| {
            s.current_session = None;
            s.workspace_state = None;
            s.is_dirty = false;
            s.last_saved = None;
            s.checkpoints.clear();
        });
    }

    // ============================================================================
    // Checkpoint form
    // ============================================================================

    pub fn set_checkpoint_form(&self, patch: CheckpointDraftPatch) {
        self.write(|s| s.checkpoint_form.apply(patch));
    }

    pub fn reset_checkpoint_form(&self) {
        self.write(|s| s.checkpoint_form = Default::default());
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Installs a restored session as current, returning its id.
    fn apply_snapshot(&self, snapshot: SessionSnapshot) -> String {
        let session_id = snapshot.session.id.clone();
        self.write(|s| {
            s.current_session = Some(snapshot.session);
            s.workspace_state = Some(snapshot.workspace_state);
            s.is_dirty = false;
            s.last_saved = Some(Utc::now());
        });
        session_id
    }

    async fn persist_preferences(&self) {
        let Some(repository) = &self.preferences else {
            return;
        };
        let preferences = self.preferences();
        if let Err(e) = repository.save(&preferences).await {
            tracing::warn!("[SessionStore] Failed to persist preferences: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;
