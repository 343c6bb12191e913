// src/dag/task_info.rs

//! Per-run task state and the scheduler → executor handoff type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::ops::Operation;
use crate::task::{ArgSpec, TaskId, TaskName, TaskValue};

/// Lifecycle state of a task within a run.
///
/// `pending → running → completed | failed | skipped`. "Ready" is not a
/// stored state: a pending task becomes ready the instant its last dependency
/// completes, and the scheduler marks it `Running` as it hands it to the
/// executor. `Skipped` is terminal and means an upstream dependency failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        f.pad(s)
    }
}

/// Static spec fields plus mutable per-run state for one task.
///
/// Created fresh for every run and discarded afterwards.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub op: String,
    pub args: Vec<ArgSpec>,
    pub kwargs: BTreeMap<String, ArgSpec>,
    /// Direct dependencies (deduplicated).
    pub deps: Vec<TaskId>,

    pub status: TaskStatus,
    /// Dependencies not yet completed; the task is ready at zero.
    pub remaining_deps: usize,
    pub result: Option<TaskValue>,
    pub error: Option<String>,
    /// Offsets from the start of the run.
    pub started: Option<Duration>,
    pub finished: Option<Duration>,
}

/// A task the scheduler wants the executor to run now.
///
/// Arguments are fully resolved: every task reference has been substituted
/// with the referenced task's completed result, so the executor needs no
/// access to scheduler state.
#[derive(Clone)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: TaskName,
    pub op_name: String,
    pub op: Arc<dyn Operation>,
    pub args: Vec<TaskValue>,
    pub kwargs: BTreeMap<String, TaskValue>,
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("op_name", &self.op_name)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish_non_exhaustive()
    }
}
