//! Storage layer for atomic, namespaced TOML files.

mod namespaced_toml;

pub use namespaced_toml::NamespacedTomlFile;
