// src/config/validate.rs

use crate::config::model::{build_task_set, ConfigFile, RawConfigFile};
use crate::dag::TaskGraph;
use crate::errors::{Result, TaskdagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskdagError::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.workers == Some(0) {
        return Err(TaskdagError::Config(
            "[config].workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Building the graph is the canonical check: it rejects references to
/// unknown tasks, self-references, and cycles before any execution.
fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    let set = build_task_set(&cfg.task)?;
    TaskGraph::build(&set)?;
    Ok(())
}
