// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::Result;
use crate::exec::ExecMode;
use crate::task::{ArgSpec, TaskSet, TaskSpec};

/// `[config]` section: run-wide defaults, all overridable from the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Default execution mode for this file.
    pub mode: Option<ExecMode>,
    /// Worker pool size for threaded / process modes.
    pub workers: Option<usize>,
}

/// One `[task.<name>]` section.
///
/// ```toml
/// [task.total]
/// op = "add"
/// args = [{ task = "t1" }, { task = "t2" }]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Registered operation name.
    pub op: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, ArgSpec>,
}

/// Config file exactly as deserialized, before semantic validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated config file.
///
/// Constructed only through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]), so holders can assume the task graph is
/// well-formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { config, task }
    }

    /// Materialize the `[task.*]` sections as a [`TaskSet`], in name order.
    pub fn to_task_set(&self) -> Result<TaskSet> {
        build_task_set(&self.task)
    }
}

pub(crate) fn build_task_set(tasks: &BTreeMap<String, TaskConfig>) -> Result<TaskSet> {
    let mut set = TaskSet::new();
    for (name, tc) in tasks {
        let mut spec = TaskSpec::new(name.clone(), tc.op.clone());
        spec.args = tc.args.clone();
        spec.kwargs = tc.kwargs.clone();
        set.insert(spec)?;
    }
    Ok(set)
}
