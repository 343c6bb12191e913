// src/dag/scheduler.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskStatus};
use crate::engine::{TaskOutcome, TaskSpan};
use crate::errors::{Result, TaskdagError};
use crate::ops::{OpRegistry, Operation};
use crate::task::{ArgSpec, TaskId, TaskName, TaskSet, TaskValue};

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - tracking each task through `pending → running → terminal`
/// - deciding when a task is ready (all dependencies completed)
/// - substituting dependency results into arguments at dispatch time
/// - skipping dependents when a task fails
///
/// It never executes anything itself; executor backends receive
/// [`ScheduledTask`]s and report back through the engine's completion events.
pub struct Scheduler {
    infos: Vec<TaskInfo>,
    /// Operation handles, parallel to `infos` (kept out of [`TaskInfo`] so
    /// the per-run records stay plain data).
    ops: Vec<Arc<dyn Operation>>,
    graph: TaskGraph,
    index: HashMap<TaskName, TaskId>,
}

impl Scheduler {
    /// Build per-run state for `set`, resolving every operation name.
    ///
    /// An unknown operation is a configuration error, reported here so the
    /// run aborts before anything executes.
    pub fn new(set: &TaskSet, graph: TaskGraph, registry: &OpRegistry) -> Result<Self> {
        let mut infos = Vec::with_capacity(set.len());
        let mut ops = Vec::with_capacity(set.len());
        let mut index = HashMap::with_capacity(set.len());

        for (id, spec) in set.iter() {
            let op = registry.get(&spec.op).ok_or_else(|| TaskdagError::UnknownOp {
                task: spec.name.clone(),
                op: spec.op.clone(),
            })?;
            let deps = graph.dependencies_of(id).to_vec();
            infos.push(TaskInfo {
                name: spec.name.clone(),
                op: spec.op.clone(),
                args: spec.args.clone(),
                kwargs: spec.kwargs.clone(),
                remaining_deps: deps.len(),
                deps,
                status: TaskStatus::Pending,
                result: None,
                error: None,
                started: None,
                finished: None,
            });
            ops.push(op);
            index.insert(spec.name.clone(), id);
        }

        Ok(Self {
            infos,
            ops,
            graph,
            index,
        })
    }

    /// Tasks with no dependencies, in topological order, marked `Running`.
    ///
    /// Called once to seed the run.
    pub fn initial_ready(&mut self) -> Result<Vec<ScheduledTask>> {
        let candidates: Vec<TaskId> = self
            .graph
            .topo_order()
            .iter()
            .copied()
            .filter(|&id| self.infos[id].remaining_deps == 0)
            .collect();
        self.dispatch(candidates)
    }

    /// Apply a completion event and return the tasks it made ready.
    pub fn handle_completion(
        &mut self,
        id: TaskId,
        outcome: TaskOutcome,
        span: TaskSpan,
    ) -> Result<Vec<ScheduledTask>> {
        let Some(info) = self.infos.get_mut(id) else {
            warn!(task_id = id, "completion for unknown task; ignoring");
            return Ok(Vec::new());
        };
        if info.status != TaskStatus::Running {
            warn!(
                task = %info.name,
                status = %info.status,
                "completion for task that is not running; ignoring"
            );
            return Ok(Vec::new());
        }

        info.started = Some(span.started);
        info.finished = Some(span.finished);

        match outcome {
            TaskOutcome::Success(value) => {
                info.status = TaskStatus::Completed;
                info.result = Some(value);
                debug!(task = %info.name, "task completed");

                let mut newly_ready = Vec::new();
                for &dep_id in self.graph.dependents_of(id) {
                    let dependent = &mut self.infos[dep_id];
                    dependent.remaining_deps = dependent.remaining_deps.saturating_sub(1);
                    if dependent.remaining_deps == 0 && dependent.status == TaskStatus::Pending {
                        newly_ready.push(dep_id);
                    }
                }
                self.dispatch(newly_ready)
            }
            TaskOutcome::Failed(message) => {
                info.status = TaskStatus::Failed;
                warn!(task = %info.name, error = %message, "task failed; skipping dependents");
                info.error = Some(message);
                let skipped = self.mark_dependents_skipped(id);
                if !skipped.is_empty() {
                    debug!(?skipped, "dependents skipped due to upstream failure");
                }
                Ok(Vec::new())
            }
        }
    }

    /// Whether every task has reached a terminal state.
    pub fn all_terminal(&self) -> bool {
        self.infos.iter().all(|info| info.status.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskInfo> {
        self.infos.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.infos.iter()
    }

    pub fn dependencies_of(&self, id: TaskId) -> &[TaskId] {
        self.graph.dependencies_of(id)
    }

    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        let id = self.index.get(name)?;
        self.infos.get(*id).map(|info| info.status)
    }

    /// Mark the given pending tasks `Running` and build their
    /// [`ScheduledTask`]s with fully resolved arguments.
    fn dispatch(&mut self, ids: Vec<TaskId>) -> Result<Vec<ScheduledTask>> {
        let mut scheduled = Vec::with_capacity(ids.len());

        // Resolve first, then mutate: resolution borrows the whole task
        // table to read dependency results.
        for id in ids {
            let info = &self.infos[id];
            let mut args = Vec::with_capacity(info.args.len());
            for arg in &info.args {
                args.push(self.resolve_arg(&info.name, arg)?);
            }
            let mut kwargs = std::collections::BTreeMap::new();
            for (key, arg) in &info.kwargs {
                kwargs.insert(key.clone(), self.resolve_arg(&info.name, arg)?);
            }

            scheduled.push(ScheduledTask {
                id,
                name: info.name.clone(),
                op_name: info.op.clone(),
                op: self.ops[id].clone(),
                args,
                kwargs,
            });

            let info = &mut self.infos[id];
            debug!(task = %info.name, "dependencies satisfied; marking running");
            info.status = TaskStatus::Running;
        }

        Ok(scheduled)
    }

    /// Substitute task references with completed results, recursively.
    fn resolve_arg(&self, owner: &str, arg: &ArgSpec) -> Result<TaskValue> {
        match arg {
            ArgSpec::Ref { task } => {
                let resolved = self
                    .index
                    .get(task)
                    .and_then(|&id| self.infos.get(id))
                    .filter(|dep| dep.status == TaskStatus::Completed)
                    .and_then(|dep| dep.result.clone());
                resolved.ok_or_else(|| TaskdagError::MissingDependency {
                    task: owner.to_string(),
                    dependency: task.clone(),
                })
            }
            ArgSpec::List(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_arg(owner, item)?);
                }
                Ok(TaskValue::Array(resolved))
            }
            ArgSpec::Map(entries) => {
                let mut resolved = serde_json::Map::new();
                for (key, value) in entries {
                    resolved.insert(key.clone(), self.resolve_arg(owner, value)?);
                }
                Ok(TaskValue::Object(resolved))
            }
            ArgSpec::Literal(value) => Ok(value.clone()),
        }
    }

    /// Transitively mark pending dependents of a failed task as `Skipped`.
    ///
    /// Returns the names of newly skipped tasks. Dependents that already
    /// reached a terminal state are left alone; `Running` dependents cannot
    /// exist, since a dependent is only dispatched after every dependency
    /// completed successfully.
    fn mark_dependents_skipped(&mut self, failed: TaskId) -> Vec<TaskName> {
        let mut stack: Vec<TaskId> = self.graph.dependents_of(failed).to_vec();
        let mut newly_skipped = Vec::new();

        while let Some(id) = stack.pop() {
            let info = &mut self.infos[id];
            match info.status {
                TaskStatus::Pending => {
                    info.status = TaskStatus::Skipped;
                    newly_skipped.push(info.name.clone());
                    stack.extend(self.graph.dependents_of(id));
                }
                TaskStatus::Running
                | TaskStatus::Completed
                | TaskStatus::Failed
                | TaskStatus::Skipped => {}
            }
        }

        newly_skipped
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("infos", &self.infos)
            .finish_non_exhaustive()
    }
}
