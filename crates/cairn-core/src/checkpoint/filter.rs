//! Checkpoint list filter and its query-string form.

use super::model::CheckpointPriority;
use crate::error::{CairnError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CHECKPOINT_LIMIT: u32 = 20;

/// Field a checkpoint list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Name,
    Priority,
    Size,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Name => "name",
            Self::Priority => "priority",
            Self::Size => "size",
        }
    }
}

impl FromStr for SortField {
    type Err = CairnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "name" => Ok(Self::Name),
            "priority" => Ok(Self::Priority),
            "size" => Ok(Self::Size),
            other => Err(CairnError::validation(format!(
                "Invalid sort field: {}. Must be one of: createdAt, name, priority, size",
                other
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CairnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CairnError::validation(format!(
                "Invalid sort order: {}. Must be one of: asc, desc",
                other
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter used both for the backend list query and the local re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointFilter {
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<CheckpointPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for CheckpointFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CHECKPOINT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            tags: None,
            priority: None,
            session_id: None,
            created_after: None,
            created_before: None,
            search: None,
        }
    }
}

/// Override for one optional filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the base value as is
    #[default]
    Keep,
    /// Drop the base value
    Clear,
    Set(T),
}

impl<T: Clone> FieldPatch<T> {
    /// `Some` sets the field, `None` clears it.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }

    pub fn apply(self, base: &Option<T>) -> Option<T> {
        match self {
            Self::Keep => base.clone(),
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

/// Field-wise override for a [`CheckpointFilter`].
///
/// `None` / [`FieldPatch::Keep`] keeps the base value. Optional filter fields
/// can also be cleared with [`FieldPatch::Clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointFilterPatch {
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub tags: FieldPatch<Vec<String>>,
    pub priority: FieldPatch<CheckpointPriority>,
    pub session_id: FieldPatch<String>,
    pub created_after: FieldPatch<DateTime<Utc>>,
    pub created_before: FieldPatch<DateTime<Utc>>,
    pub search: FieldPatch<String>,
}

impl CheckpointFilterPatch {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: FieldPatch::Set(session_id.into()),
            ..Self::default()
        }
    }

    /// Clears every optional narrowing field (tags, priority, dates, search)
    /// while keeping session, limit and ordering.
    pub fn clear_narrowing(self) -> Self {
        Self {
            tags: FieldPatch::Clear,
            priority: FieldPatch::Clear,
            created_after: FieldPatch::Clear,
            created_before: FieldPatch::Clear,
            search: FieldPatch::Clear,
            ..self
        }
    }
}

/// One query-string parameter of the list call.
///
/// Every filter field maps to exactly one variant, so the marshalling in
/// [`CheckpointFilter::query_params`] is checked by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointQueryParam {
    Limit(u32),
    SortBy(SortField),
    SortOrder(SortOrder),
    /// Repeated once per tag
    Tag(String),
    Priority(CheckpointPriority),
    SessionId(String),
    CreatedAfter(DateTime<Utc>),
    CreatedBefore(DateTime<Utc>),
    Search(String),
}

impl CheckpointQueryParam {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Limit(_) => "limit",
            Self::SortBy(_) => "sortBy",
            Self::SortOrder(_) => "sortOrder",
            Self::Tag(_) => "tags",
            Self::Priority(_) => "priority",
            Self::SessionId(_) => "sessionId",
            Self::CreatedAfter(_) => "createdAfter",
            Self::CreatedBefore(_) => "createdBefore",
            Self::Search(_) => "search",
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Limit(limit) => limit.to_string(),
            Self::SortBy(field) => field.as_str().to_string(),
            Self::SortOrder(order) => order.as_str().to_string(),
            Self::Tag(tag) => tag.clone(),
            Self::Priority(priority) => priority.as_str().to_string(),
            Self::SessionId(id) => id.clone(),
            Self::CreatedAfter(at) | Self::CreatedBefore(at) => {
                at.to_rfc3339_opts(SecondsFormat::Millis, true)
            }
            Self::Search(search) => search.clone(),
        }
    }
}

impl CheckpointFilter {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    /// Returns a copy of this filter with the patch applied field by field.
    pub fn merged(&self, patch: CheckpointFilterPatch) -> Self {
        let CheckpointFilterPatch {
            limit,
            sort_by,
            sort_order,
            tags,
            priority,
            session_id,
            created_after,
            created_before,
            search,
        } = patch;

        Self {
            limit: limit.unwrap_or(self.limit),
            sort_by: sort_by.unwrap_or(self.sort_by),
            sort_order: sort_order.unwrap_or(self.sort_order),
            tags: tags.apply(&self.tags),
            priority: priority.apply(&self.priority),
            session_id: session_id.apply(&self.session_id),
            created_after: created_after.apply(&self.created_after),
            created_before: created_before.apply(&self.created_before),
            search: search.apply(&self.search),
        }
    }

    /// Typed query parameters in a stable order.
    pub fn query_params(&self) -> Vec<CheckpointQueryParam> {
        let Self {
            limit,
            sort_by,
            sort_order,
            tags,
            priority,
            session_id,
            created_after,
            created_before,
            search,
        } = self;

        let mut params = vec![
            CheckpointQueryParam::Limit(*limit),
            CheckpointQueryParam::SortBy(*sort_by),
            CheckpointQueryParam::SortOrder(*sort_order),
        ];
        if let Some(tags) = tags {
            params.extend(tags.iter().cloned().map(CheckpointQueryParam::Tag));
        }
        if let Some(priority) = priority {
            params.push(CheckpointQueryParam::Priority(*priority));
        }
        if let Some(session_id) = session_id {
            params.push(CheckpointQueryParam::SessionId(session_id.clone()));
        }
        if let Some(after) = created_after {
            params.push(CheckpointQueryParam::CreatedAfter(*after));
        }
        if let Some(before) = created_before {
            params.push(CheckpointQueryParam::CreatedBefore(*before));
        }
        if let Some(search) = search.as_ref().filter(|s| !s.is_empty()) {
            params.push(CheckpointQueryParam::Search(search.clone()));
        }
        params
    }

    /// Key/value pairs ready for a query string.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.query_params()
            .into_iter()
            .map(|param| (param.key(), param.value()))
            .collect()
    }
}
