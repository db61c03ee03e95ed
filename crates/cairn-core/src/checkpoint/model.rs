//! Checkpoint domain model.

use crate::error::{CairnError, Result};
use crate::session::WorkspaceState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Importance of a checkpoint. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl CheckpointPriority {
    pub const ALL: [CheckpointPriority; 3] = [Self::Low, Self::Medium, Self::High];

    /// Sort ordinal: low=0, medium=1, high=2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for CheckpointPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckpointPriority {
    type Err = CairnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(CairnError::validation(format!(
                "Invalid priority: {}. Must be one of: low, medium, high",
                other
            ))),
        }
    }
}

/// A named snapshot of a session's workspace state.
///
/// Checkpoints are created and sized by the backend. Locally they are only
/// ever replaced with a server copy or removed, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub session_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: CheckpointPriority,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub compressed_size: i64,
    #[serde(default)]
    pub uncompressed_size: i64,
    #[serde(default)]
    pub is_auto_generated: bool,
    #[serde(default)]
    pub metadata: Value,
}

impl Checkpoint {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Caller-supplied options for creating a checkpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCheckpointOptions {
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub priority: CheckpointPriority,
    pub encrypt_data: bool,
    pub encryption_key: Option<String>,
}

impl CreateCheckpointOptions {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: CheckpointPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_encryption(mut self, key: impl Into<String>) -> Self {
        self.encrypt_data = true;
        self.encryption_key = Some(key.into());
        self
    }
}

/// Wire body for the create-checkpoint call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckpoint {
    pub session_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub priority: CheckpointPriority,
    pub workspace_state: WorkspaceState,
    pub encrypt_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
    pub skip_duplicates: bool,
}

impl NewCheckpoint {
    pub fn new(
        session_id: impl Into<String>,
        name: impl Into<String>,
        workspace_state: WorkspaceState,
        options: CreateCheckpointOptions,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            name: name.into(),
            description: options.description,
            tags: options.tags,
            priority: options.priority,
            workspace_state,
            encrypt_data: options.encrypt_data,
            encryption_key: options.encryption_key,
            skip_duplicates: true,
        }
    }
}

/// Options (and wire body) for restoring a checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreCheckpointOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
    pub create_backup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,
}

impl RestoreCheckpointOptions {
    pub fn with_backup(name: Option<String>) -> Self {
        Self {
            create_backup: true,
            backup_name: name,
            ..Self::default()
        }
    }
}

/// Partial metadata update. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointMetadataUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<CheckpointPriority>,
}

impl CheckpointMetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.priority.is_none()
    }
}
