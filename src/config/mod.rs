// src/config/mod.rs

//! TOML configuration: raw deserialization, semantic validation, loading.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
