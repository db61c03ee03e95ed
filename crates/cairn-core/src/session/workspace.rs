//! Opaque workspace bundle.
//!
//! The core never looks inside a `WorkspaceState`. It only merges partial
//! updates key by key and forwards the whole bundle to the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known top-level keys of a workspace bundle.
pub mod keys {
    pub const TERMINAL_STATE: &str = "terminalState";
    pub const BROWSER_TABS: &str = "browserTabs";
    pub const AI_CONVERSATIONS: &str = "aiConversations";
    pub const OPEN_FILES: &str = "openFiles";
    pub const WORKSPACE_CONFIG: &str = "workspaceConfig";
    pub const METADATA: &str = "metadata";
}

/// Editor, terminal, browser and AI-conversation data as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceState(Map<String, Value>);

impl WorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Shallow merge: every top-level key in `partial` replaces the key here.
    /// Nested objects are not merged.
    pub fn merge(&mut self, partial: WorkspaceState) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for WorkspaceState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_is_shallow() {
        let mut state = WorkspaceState::new()
            .with(keys::OPEN_FILES, json!(["a.rs"]))
            .with(keys::METADATA, json!({"theme": "dark", "font": 12}));

        let partial = WorkspaceState::new()
            .with(keys::METADATA, json!({"theme": "light"}))
            .with(keys::BROWSER_TABS, json!([]));

        state.merge(partial);

        assert_eq!(state.get(keys::OPEN_FILES), Some(&json!(["a.rs"])));
        // whole value replaced, "font" is gone
        assert_eq!(state.get(keys::METADATA), Some(&json!({"theme": "light"})));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let state = WorkspaceState::new().with(keys::TERMINAL_STATE, json!({"cwd": "/tmp"}));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value, json!({"terminalState": {"cwd": "/tmp"}}));
    }
}
