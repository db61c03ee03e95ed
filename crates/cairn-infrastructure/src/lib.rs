//! Infrastructure layer for Cairn: HTTP gateway, local preference storage,
//! configuration loading and path resolution.

pub mod config_service;
pub mod http_gateway;
pub mod paths;
pub mod preferences_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_gateway::HttpPersistenceGateway;
pub use crate::preferences_repository::{FilePreferencesRepository, InMemoryPreferencesRepository};
