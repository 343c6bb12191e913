// src/dag/graph.rs

use std::collections::BTreeSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, TaskdagError};
use crate::task::{TaskId, TaskSet};

/// Explicit dependency graph over a [`TaskSet`].
///
/// Nodes are [`TaskId`] indices; edges are derived by scanning each task's
/// arguments for references to other tasks. Building the graph is where
/// configuration errors surface: self-references, references to tasks not in
/// the set, and cycles are all rejected here, before anything executes.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// deps[i] = tasks whose results task `i` consumes (deduplicated).
    deps: Vec<Vec<TaskId>>,
    /// dependents[i] = tasks that consume task `i`'s result.
    dependents: Vec<Vec<TaskId>>,
    /// One valid topological order over all tasks.
    topo: Vec<TaskId>,
}

impl TaskGraph {
    pub fn build(set: &TaskSet) -> Result<Self> {
        let n = set.len();
        let mut deps: Vec<Vec<TaskId>> = vec![Vec::new(); n];
        let mut dependents: Vec<Vec<TaskId>> = vec![Vec::new(); n];

        for (id, spec) in set.iter() {
            // A task may reference the same dependency in several argument
            // positions; the edge set must still be deduplicated or the
            // in-degree bookkeeping in the scheduler would double-count.
            let mut seen: BTreeSet<TaskId> = BTreeSet::new();
            for dep_name in spec.referenced_tasks() {
                let dep_id = set.id_of(&dep_name).ok_or_else(|| {
                    TaskdagError::MissingDependency {
                        task: spec.name.clone(),
                        dependency: dep_name.clone(),
                    }
                })?;
                if dep_id == id {
                    return Err(TaskdagError::Config(format!(
                        "task '{}' cannot depend on itself",
                        spec.name
                    )));
                }
                seen.insert(dep_id);
            }
            for dep_id in seen {
                deps[id].push(dep_id);
                dependents[dep_id].push(id);
            }
        }

        // Edge direction: dependency -> dependent, so a topological sort
        // yields a valid execution order. The sort failing is the cycle check.
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for id in 0..n {
            graph.add_node(id);
        }
        for (id, task_deps) in deps.iter().enumerate() {
            for &dep_id in task_deps {
                graph.add_edge(dep_id, id, ());
            }
        }

        let topo = match toposort(&graph, None) {
            Ok(order) => order,
            Err(cycle) => {
                let name = set
                    .get(cycle.node_id())
                    .map(|spec| spec.name.clone())
                    .unwrap_or_else(|| format!("#{}", cycle.node_id()));
                return Err(TaskdagError::DependencyCycle(name));
            }
        };

        Ok(Self {
            deps,
            dependents,
            topo,
        })
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Direct dependencies of a task.
    pub fn dependencies_of(&self, id: TaskId) -> &[TaskId] {
        self.deps.get(id).map(|d| d.as_slice()).unwrap_or(&[])
    }

    /// Direct dependents of a task.
    pub fn dependents_of(&self, id: TaskId) -> &[TaskId] {
        self.dependents.get(id).map(|d| d.as_slice()).unwrap_or(&[])
    }

    /// A valid execution order over all tasks.
    pub fn topo_order(&self) -> &[TaskId] {
        &self.topo
    }
}
