// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskdagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duplicate task name: '{0}'")]
    DuplicateTask(String),

    #[error("Task '{task}' references unknown dependency '{dependency}'")]
    MissingDependency { task: String, dependency: String },

    #[error("Cycle detected in task graph involving task '{0}'")]
    DependencyCycle(String),

    #[error("Task '{task}' uses unknown operation '{op}'")]
    UnknownOp { task: String, op: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TaskdagError>;
