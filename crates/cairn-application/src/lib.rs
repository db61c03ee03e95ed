//! Application layer for Cairn.
//!
//! Holds the session state store, the single-flight guard its operations run
//! under, and the auto-save scheduler that drives periodic saves.

pub mod autosave;
pub mod operation_guard;
pub mod session_store;

#[cfg(test)]
mod test_support;

pub use autosave::{AutoSaveReport, AutoSaveScheduler};
pub use operation_guard::{OperationGuard, OperationPermit};
pub use session_store::{SaveOptions, SaveOutcome, SessionStore};
