//! Domain layer for Cairn.
//!
//! Session and checkpoint models, validation and query helpers, and the
//! traits the application layer talks to the outside world through.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod gateway;
pub mod operation;
pub mod session;
pub mod state;

pub use error::{CairnError, Result};
pub use gateway::PersistenceGateway;
pub use operation::OperationKind;
