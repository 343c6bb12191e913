// src/ops/mod.rs

//! Operations: the callables behind tasks.
//!
//! A task names an operation; the [`OpRegistry`] maps names to
//! implementations. Keeping operations registry-resident (instead of storing
//! closures inside tasks) is what makes the process-based execution mode
//! possible: the worker child resolves the same name against the same
//! registry, so only the name and the JSON arguments cross the process
//! boundary.
//!
//! - [`registry`] holds the name → operation map.
//! - [`builtin`] provides the stock operation library used by the CLI, demo
//!   configs and the worker binary.

pub mod builtin;
pub mod registry;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::task::TaskValue;

pub use registry::OpRegistry;

/// Result of invoking an operation.
pub type OpResult = anyhow::Result<TaskValue>;

/// A unit of executable work.
///
/// `call` is the synchronous entry used by the sequential, threaded and
/// process-based modes. `call_async` is what the cooperative mode awaits; the
/// default implementation just runs `call` inline (blocking the single
/// scheduler thread, which is the documented behaviour for operations without
/// explicit wait points). Operations that wait on I/O or timers should
/// override `call_async` to yield at those points.
pub trait Operation: Send + Sync {
    fn call(&self, args: &[TaskValue], kwargs: &BTreeMap<String, TaskValue>) -> OpResult;

    fn call_async<'a>(
        &'a self,
        args: &'a [TaskValue],
        kwargs: &'a BTreeMap<String, TaskValue>,
    ) -> Pin<Box<dyn Future<Output = OpResult> + Send + 'a>> {
        Box::pin(async move { self.call(args, kwargs) })
    }
}

/// Adapter turning a plain closure into an [`Operation`].
///
/// Closure operations run in-process in every mode; for the process-based
/// mode the worker binary must register the same name, which is only
/// guaranteed for the built-ins. See `OpRegistry::register_fn`.
pub struct FnOp<F>(pub F);

impl<F> Operation for FnOp<F>
where
    F: Fn(&[TaskValue], &BTreeMap<String, TaskValue>) -> OpResult + Send + Sync,
{
    fn call(&self, args: &[TaskValue], kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        (self.0)(args, kwargs)
    }
}
