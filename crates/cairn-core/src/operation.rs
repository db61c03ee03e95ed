//! Kinds of store operations that are guarded against concurrent re-entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a store operation for the single-flight guard.
///
/// At most one call per kind may be in flight; calls of different kinds may
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    CreateCheckpoint,
    LoadCheckpoints,
    RestoreCheckpoint,
    SaveSession,
    RestoreSession,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCheckpoint => "create checkpoint",
            Self::LoadCheckpoints => "load checkpoints",
            Self::RestoreCheckpoint => "restore checkpoint",
            Self::SaveSession => "save session",
            Self::RestoreSession => "restore session",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
