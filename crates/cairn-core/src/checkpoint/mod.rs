//! Checkpoint domain module.
//!
//! # Module Structure
//!
//! - `model`: Checkpoint record, priority and request/option types
//! - `filter`: Query filter, sort fields and typed query-string marshalling
//! - `validation`: Synchronous input checks run before any I/O
//! - `query`: Pure filter/sort/format helpers over checkpoint lists

mod filter;
mod model;
mod query;
mod validation;

pub use filter::{DEFAULT_CHECKPOINT_LIMIT, CheckpointFilter, CheckpointFilterPatch, CheckpointQueryParam, FieldPatch, SortField, SortOrder};
pub use model::{
    Checkpoint, CheckpointMetadataUpdate, CheckpointPriority, CreateCheckpointOptions, NewCheckpoint,
    RestoreCheckpointOptions,
};
pub use query::{
    DEFAULT_MAX_AGE_DAYS, checkpoint_summary, compression_ratio, default_max_age, filter_checkpoints,
    format_checkpoint_age, format_checkpoint_size, is_checkpoint_expired, sort_checkpoints,
};
pub use validation::{
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_TAG_LENGTH, MAX_TAGS, validate_checkpoint_description,
    validate_checkpoint_name, validate_checkpoint_priority, validate_checkpoint_tags,
    validate_metadata_update,
};
