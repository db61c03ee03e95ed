//! In-memory gateway used by the store and scheduler tests.

use async_trait::async_trait;
use cairn_core::checkpoint::{
    Checkpoint, CheckpointFilter, CheckpointMetadataUpdate, NewCheckpoint, RestoreCheckpointOptions,
};
use cairn_core::error::{CairnError, Result};
use cairn_core::gateway::PersistenceGateway;
use cairn_core::session::{NewSessionConfig, RestoreSessionOptions, Session, SessionSnapshot, WorkspaceState};
use cairn_core::state::{PreferencesRepository, StorePreferences};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    CreateCheckpoint(NewCheckpoint),
    ListCheckpoints(CheckpointFilter),
    RestoreCheckpoint(String, RestoreCheckpointOptions),
    DeleteCheckpoint(String),
    UpdateCheckpoint(String, CheckpointMetadataUpdate),
    SaveSession(String, WorkspaceState),
    RestoreSession(String),
    CreateSession(NewSessionConfig),
}

pub fn session(id: &str) -> Session {
    Session {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        workspace_id: "workspace-1".to_string(),
        name: format!("Session {}", id),
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        last_saved_at: None,
        checkpoint_count: 0,
        total_size: 0,
    }
}

/// Behaves like a tiny backend: remembers checkpoints and sessions, records
/// every call, and can be told to fail or to block.
#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    checkpoints: Mutex<Vec<Checkpoint>>,
    snapshots: Mutex<HashMap<String, SessionSnapshot>>,
    next_id: AtomicUsize,
    pub fail_creates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_saves: AtomicBool,
    pub fail_restores: AtomicBool,
    /// When set, the matching call waits for a notification before answering
    pub create_gate: Mutex<Option<Arc<Notify>>>,
    pub list_gate: Mutex<Option<Arc<Notify>>>,
    pub save_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<CheckpointFilter> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::ListCheckpoints(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls().len()
    }

    pub fn save_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::SaveSession(..)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Registers what restoring `checkpoint_id` (or session id) returns.
    pub fn set_snapshot(&self, id: &str, snapshot: SessionSnapshot) {
        self.snapshots.lock().unwrap().insert(id.to_string(), snapshot);
    }

    pub fn add_checkpoint(&self, checkpoint: Checkpoint) {
        self.checkpoints.lock().unwrap().push(checkpoint);
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass(gate: &Mutex<Option<Arc<Notify>>>) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl PersistenceGateway for MockGateway {
    async fn create_checkpoint(&self, request: &NewCheckpoint) -> Result<String> {
        self.record(GatewayCall::CreateCheckpoint(request.clone()));
        Self::pass(&self.create_gate).await;
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(500, "Failed to create checkpoint"));
        }

        let id = self.next_id("cp");
        self.add_checkpoint(Checkpoint {
            id: id.clone(),
            session_id: request.session_id.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            tags: request.tags.clone(),
            priority: request.priority,
            created_at: Utc::now(),
            compressed_size: 128,
            uncompressed_size: 512,
            is_auto_generated: false,
            metadata: serde_json::Value::Null,
        });
        Ok(id)
    }

    async fn list_checkpoints(&self, filter: &CheckpointFilter) -> Result<Vec<Checkpoint>> {
        self.record(GatewayCall::ListCheckpoints(filter.clone()));
        Self::pass(&self.list_gate).await;
        let checkpoints = self.checkpoints.lock().unwrap();
        Ok(checkpoints
            .iter()
            .filter(|c| filter.session_id.as_ref().is_none_or(|id| &c.session_id == id))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn restore_checkpoint(
        &self,
        checkpoint_id: &str,
        options: &RestoreCheckpointOptions,
    ) -> Result<SessionSnapshot> {
        self.record(GatewayCall::RestoreCheckpoint(
            checkpoint_id.to_string(),
            options.clone(),
        ));
        if self.fail_restores.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(500, "Checkpoint payload is corrupted"));
        }
        self.snapshots
            .lock()
            .unwrap()
            .get(checkpoint_id)
            .cloned()
            .ok_or_else(|| CairnError::gateway(404, "Checkpoint not found"))
    }

    async fn delete_checkpoint(&self, checkpoint_id: &str) -> Result<()> {
        self.record(GatewayCall::DeleteCheckpoint(checkpoint_id.to_string()));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(500, "Failed to delete checkpoint"));
        }
        self.checkpoints.lock().unwrap().retain(|c| c.id != checkpoint_id);
        Ok(())
    }

    async fn update_checkpoint_metadata(
        &self,
        checkpoint_id: &str,
        update: &CheckpointMetadataUpdate,
    ) -> Result<Checkpoint> {
        self.record(GatewayCall::UpdateCheckpoint(
            checkpoint_id.to_string(),
            update.clone(),
        ));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(500, "Failed to update checkpoint"));
        }
        let mut checkpoints = self.checkpoints.lock().unwrap();
        let checkpoint = checkpoints
            .iter_mut()
            .find(|c| c.id == checkpoint_id)
            .ok_or_else(|| CairnError::gateway(404, "Checkpoint not found"))?;

        if let Some(name) = &update.name {
            checkpoint.name = name.clone();
        }
        if let Some(description) = &update.description {
            checkpoint.description = Some(description.clone());
        }
        if let Some(tags) = &update.tags {
            checkpoint.tags = tags.clone();
        }
        if let Some(priority) = update.priority {
            checkpoint.priority = priority;
        }
        // server-computed field the client never derives itself
        checkpoint.metadata = serde_json::json!({"revision": 2});
        Ok(checkpoint.clone())
    }

    async fn save_session(&self, session_id: &str, workspace_state: &WorkspaceState) -> Result<Session> {
        self.record(GatewayCall::SaveSession(
            session_id.to_string(),
            workspace_state.clone(),
        ));
        Self::pass(&self.save_gate).await;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(503, "Backend unavailable"));
        }
        let mut saved = session(session_id);
        saved.last_saved_at = Some(Utc::now());
        Ok(saved)
    }

    async fn restore_session(
        &self,
        session_id: &str,
        _options: &RestoreSessionOptions,
    ) -> Result<SessionSnapshot> {
        self.record(GatewayCall::RestoreSession(session_id.to_string()));
        if self.fail_restores.load(Ordering::SeqCst) {
            return Err(CairnError::gateway(500, "Failed to restore session"));
        }
        self.snapshots
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| CairnError::gateway(404, "Session not found"))
    }

    async fn create_session(&self, config: &NewSessionConfig) -> Result<Session> {
        self.record(GatewayCall::CreateSession(config.clone()));
        let mut created = session(&self.next_id("s"));
        created.user_id = config.user_id.clone();
        created.workspace_id = config.workspace_id.clone();
        created.name = config.name.clone();
        Ok(created)
    }
}

/// Preferences kept in memory, with a count of writes.
#[derive(Default)]
pub struct MemoryPreferences {
    stored: Mutex<Option<StorePreferences>>,
    saves: AtomicUsize,
}

impl MemoryPreferences {
    pub fn with(preferences: StorePreferences) -> Arc<Self> {
        Arc::new(Self {
            stored: Mutex::new(Some(preferences)),
            saves: AtomicUsize::new(0),
        })
    }

    pub fn stored(&self) -> Option<StorePreferences> {
        self.stored.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreferencesRepository for MemoryPreferences {
    async fn load(&self) -> Result<StorePreferences> {
        Ok(self.stored().unwrap_or_default())
    }

    async fn save(&self, preferences: &StorePreferences) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock().unwrap() = Some(preferences.clone());
        Ok(())
    }
}
