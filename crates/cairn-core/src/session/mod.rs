//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Server-side session record (`Session`) and the restore payload
//!   (`SessionSnapshot`)
//! - `workspace`: Opaque workspace bundle (`WorkspaceState`)

mod model;
mod workspace;

pub use model::{NewSessionConfig, RestoreSessionOptions, Session, SessionSnapshot};
pub use workspace::{WorkspaceState, keys as workspace_keys};
