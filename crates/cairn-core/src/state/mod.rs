//! Session store state.
//!
//! - `model`: The aggregate `SessionState`, draft form and persisted
//!   preferences
//! - `repository`: Persistence interface for the preferences subset

pub mod model;
pub mod repository;

pub use model::{
    CheckpointDraft, CheckpointDraftPatch, DEFAULT_AUTO_SAVE_INTERVAL_MS, SessionState, StorePreferences,
};
pub use repository::PreferencesRepository;
