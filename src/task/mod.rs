// src/task/mod.rs

//! Task declarations.
//!
//! - [`TaskSpec`] describes a single unit of work: a display name, the name
//!   of a registered operation, positional arguments and keyword arguments.
//! - [`ArgSpec`] is an argument position: a literal value, a reference to
//!   another task's result, or a nested list/map of either.
//! - [`TaskSet`] is the indexed collection of specs registered for a run.
//!
//! Dependencies are not declared separately: they are derived by scanning a
//! spec's arguments for [`ArgSpec::Ref`] entries. The graph itself (edges as
//! ID pairs, topological order) lives in [`crate::dag::graph`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TaskdagError};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Index of a task within its [`TaskSet`].
pub type TaskId = usize;

/// Value universe for task arguments and results.
///
/// Everything that flows between tasks must be representable as JSON; this
/// is what lets the process-based mode ship arguments and results across the
/// worker boundary without a separate serialization contract.
pub type TaskValue = serde_json::Value;

/// One argument position of a task.
///
/// The untagged representation makes the TOML form read naturally:
///
/// ```toml
/// args = [5, { task = "t1" }, [1, 2, { task = "t2" }]]
/// ```
///
/// A single-key table `{ task = "<name>" }` always parses as a reference, so
/// a literal map must not use `task` as its only key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    /// Use the completed result of another task.
    Ref { task: TaskName },
    /// Nested list; resolved element-wise.
    List(Vec<ArgSpec>),
    /// Nested map; resolved value-wise.
    Map(BTreeMap<String, ArgSpec>),
    /// A plain value, passed through untouched.
    Literal(TaskValue),
}

impl ArgSpec {
    /// Literal argument from anything JSON-convertible.
    pub fn value(v: impl Into<TaskValue>) -> Self {
        ArgSpec::Literal(v.into())
    }

    /// Reference to another task's result.
    pub fn task(name: impl Into<TaskName>) -> Self {
        ArgSpec::Ref { task: name.into() }
    }

    /// Append every task name referenced by this argument (recursively).
    pub fn collect_refs(&self, out: &mut Vec<TaskName>) {
        match self {
            ArgSpec::Ref { task } => out.push(task.clone()),
            ArgSpec::List(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            ArgSpec::Map(entries) => {
                for value in entries.values() {
                    value.collect_refs(out);
                }
            }
            ArgSpec::Literal(_) => {}
        }
    }
}

/// Declaration of a single task: name, operation, arguments.
///
/// Specs are immutable once inserted into a [`TaskSet`]; all per-run state
/// (status, timing, result) lives in the scheduler and is discarded with the
/// run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub name: TaskName,
    /// Name of the operation in the [`crate::ops::OpRegistry`].
    pub op: String,
    pub args: Vec<ArgSpec>,
    pub kwargs: BTreeMap<String, ArgSpec>,
}

impl TaskSpec {
    pub fn new(name: impl Into<TaskName>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Add a positional argument.
    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Add a keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, arg: ArgSpec) -> Self {
        self.kwargs.insert(key.into(), arg);
        self
    }

    /// Names of tasks this spec references in its arguments, in encounter
    /// order, duplicates included.
    pub fn referenced_tasks(&self) -> Vec<TaskName> {
        let mut refs = Vec::new();
        for arg in &self.args {
            arg.collect_refs(&mut refs);
        }
        for value in self.kwargs.values() {
            value.collect_refs(&mut refs);
        }
        refs
    }
}

/// Indexed collection of task specs with unique names.
///
/// Insertion order defines [`TaskId`]s, which the graph and scheduler use as
/// node indices.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<TaskSpec>,
    index: HashMap<TaskName, TaskId>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spec, returning its ID. Names must be unique within the set.
    pub fn insert(&mut self, spec: TaskSpec) -> Result<TaskId> {
        if self.index.contains_key(&spec.name) {
            return Err(TaskdagError::DuplicateTask(spec.name));
        }
        let id = self.tasks.len();
        self.index.insert(spec.name.clone(), id);
        self.tasks.push(spec);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskSpec> {
        self.tasks.get(id)
    }

    pub fn id_of(&self, name: &str) -> Option<TaskId> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &TaskSpec)> {
        self.tasks.iter().enumerate()
    }
}
