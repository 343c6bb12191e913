#![allow(dead_code)]

use std::collections::BTreeMap;

use taskdag::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use taskdag::task::ArgSpec;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_mode(mut self, mode: taskdag::ExecMode) -> Self {
        self.config.config.mode = Some(mode);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.config.workers = Some(workers);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(op: &str) -> Self {
        Self {
            task: TaskConfig {
                op: op.to_string(),
                args: vec![],
                kwargs: BTreeMap::new(),
            },
        }
    }

    /// Positional literal argument.
    pub fn arg(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.task.args.push(ArgSpec::value(value.into()));
        self
    }

    /// Positional reference to another task's result.
    pub fn arg_ref(mut self, task: &str) -> Self {
        self.task.args.push(ArgSpec::task(task));
        self
    }

    pub fn kwarg(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.task.kwargs.insert(key.to_string(), ArgSpec::value(value.into()));
        self
    }

    pub fn kwarg_ref(mut self, key: &str, task: &str) -> Self {
        self.task.kwargs.insert(key.to_string(), ArgSpec::task(task));
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
