// src/exec/mod.rs

//! Execution layer: one backend per execution mode.
//!
//! The runtime talks to an [`ExecutorBackend`] instead of a concrete
//! executor. This keeps the scheduling loop identical across modes and makes
//! it easy to swap in a recording backend in tests.
//!
//! - [`sequential`] runs one task at a time, inline.
//! - [`threaded`] submits ready tasks to a bounded shared thread pool.
//! - [`process`] ships ready tasks to a pool of worker child processes.
//! - [`cooperative`] spawns ready tasks as futures; driven by a
//!   current-thread runtime they interleave on a single thread.
//! - [`worker`] is the child-process side of the process mode.

pub mod cooperative;
pub mod process;
pub mod sequential;
pub mod threaded;
pub mod worker;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::dag::ScheduledTask;
use crate::errors::Result;

pub use cooperative::CooperativeBackend;
pub use process::ProcessPoolBackend;
pub use sequential::SequentialBackend;
pub use threaded::ThreadPoolBackend;

/// How ready tasks are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Strict topological order, one task at a time.
    Sequential,
    /// Ready tasks run on a bounded shared thread pool.
    Threaded,
    /// Ready tasks run in isolated worker processes.
    Process,
    /// Ready tasks run as futures on a single-threaded event loop.
    Cooperative,
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecMode::Sequential => "sequential",
            ExecMode::Threaded => "threaded",
            ExecMode::Process => "process",
            ExecMode::Cooperative => "cooperative",
        };
        f.pad(s)
    }
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(ExecMode::Sequential),
            "threaded" => Ok(ExecMode::Threaded),
            "process" => Ok(ExecMode::Process),
            "cooperative" => Ok(ExecMode::Cooperative),
            other => Err(format!(
                "invalid execution mode: {other} (expected \"sequential\", \"threaded\", \"process\" or \"cooperative\")"
            )),
        }
    }
}

/// Map an operation result onto a task outcome, flattening the error chain.
pub(crate) fn outcome_from(result: crate::ops::OpResult) -> crate::engine::TaskOutcome {
    match result {
        Ok(value) => crate::engine::TaskOutcome::Success(value),
        Err(err) => crate::engine::TaskOutcome::Failed(format!("{err:#}")),
    }
}

/// Trait abstracting how scheduled tasks are executed.
///
/// The implementation is free to:
/// - run tasks inline (sequential)
/// - hand them to pool threads or worker processes
/// - spawn them as futures (cooperative)
/// - record them and fabricate completions (tests)
///
/// Every dispatched task must eventually produce exactly one
/// [`crate::engine::TaskCompletion`] on the runtime's channel.
pub trait ExecutorBackend: Send {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
