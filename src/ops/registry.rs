// src/ops/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ops::{FnOp, OpResult, Operation};
use crate::task::TaskValue;

/// Name → operation map shared by every execution mode.
///
/// The registry is built once before a run and never mutated afterwards; the
/// orchestrator holds it behind an `Arc` so backends and pooled threads can
/// share it freely.
#[derive(Default)]
pub struct OpRegistry {
    ops: BTreeMap<String, Arc<dyn Operation>>,
}

impl OpRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in operation library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::ops::builtin::register_builtins(&mut registry);
        registry
    }

    /// Register an operation under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, op: impl Operation + 'static) {
        self.ops.insert(name.into(), Arc::new(op));
    }

    /// Register a closure as an operation.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[TaskValue], &BTreeMap<String, TaskValue>) -> OpResult + Send + Sync + 'static,
    {
        self.register(name, FnOp(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.ops.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(|s| s.as_str())
    }
}

impl std::fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpRegistry")
            .field("ops", &self.ops.keys().collect::<Vec<_>>())
            .finish()
    }
}
