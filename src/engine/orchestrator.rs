// src/engine/orchestrator.rs

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::info;

use crate::dag::{Scheduler, TaskGraph};
use crate::engine::runtime::Runtime;
use crate::engine::TaskCompletion;
use crate::errors::{Result, TaskdagError};
use crate::exec::{
    CooperativeBackend, ExecMode, ProcessPoolBackend, SequentialBackend, ThreadPoolBackend,
};
use crate::ops::OpRegistry;
use crate::report::RunReport;
use crate::task::TaskSet;

/// Default worker pool size for the threaded and process-based modes.
pub const DEFAULT_WORKERS: usize = 4;

/// Knobs shared by all execution modes.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pool size for threaded / process modes. Must be at least 1.
    pub workers: usize,
    /// argv for process-mode worker children; `None` re-executes the current
    /// binary with `--worker`.
    pub worker_command: Option<Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            worker_command: None,
        }
    }
}

/// Public entry point: validates a task set, executes it under the selected
/// mode, and returns the per-task records.
///
/// The orchestrator owns no per-run state; `run` can be called repeatedly
/// with different sets and modes.
pub struct Orchestrator {
    registry: OpRegistry,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(registry: OpRegistry) -> Self {
        Self {
            registry,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &OpRegistry {
        &self.registry
    }

    /// Execute `set` under `mode` on the ambient Tokio runtime.
    ///
    /// Configuration errors (cycles, missing dependencies, unknown
    /// operations, bad options) are returned before anything executes. Task
    /// failures do NOT produce an `Err`: they are recorded per task in the
    /// report, with transitive dependents marked skipped.
    ///
    /// Cooperative mode is only genuinely single-threaded when the ambient
    /// runtime is a current-thread one; use [`Orchestrator::run_blocking`]
    /// unless you are managing runtimes yourself.
    pub async fn run(&self, set: &TaskSet, mode: ExecMode) -> Result<RunReport> {
        if self.options.workers == 0 {
            return Err(TaskdagError::Config(
                "workers must be at least 1".to_string(),
            ));
        }

        let graph = TaskGraph::build(set)?;
        let scheduler = Scheduler::new(set, graph, &self.registry)?;

        info!(
            mode = %mode,
            tasks = set.len(),
            workers = self.options.workers,
            "starting run"
        );

        let (tx, rx) = mpsc::unbounded_channel::<TaskCompletion>();
        let epoch = Instant::now();

        let final_state = match mode {
            ExecMode::Sequential => {
                let backend = SequentialBackend::new(tx, epoch);
                Runtime::new(scheduler, rx, backend).run().await?
            }
            ExecMode::Threaded => {
                let backend = ThreadPoolBackend::new(tx, epoch, self.options.workers);
                Runtime::new(scheduler, rx, backend).run().await?
            }
            ExecMode::Process => {
                let backend = ProcessPoolBackend::new(
                    tx,
                    epoch,
                    self.options.workers,
                    self.options.worker_command.clone(),
                )?;
                Runtime::new(scheduler, rx, backend).run().await?
            }
            ExecMode::Cooperative => {
                let backend = CooperativeBackend::new(tx, epoch);
                Runtime::new(scheduler, rx, backend).run().await?
            }
        };

        Ok(RunReport::from_scheduler(mode, epoch.elapsed(), &final_state))
    }

    /// Like [`Orchestrator::run`], but owns runtime selection: a
    /// current-thread runtime for cooperative mode (so tasks interleave on a
    /// single thread), a multi-thread runtime otherwise.
    pub fn run_blocking(&self, set: &TaskSet, mode: ExecMode) -> Result<RunReport> {
        let runtime = match mode {
            ExecMode::Cooperative => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
            _ => tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?,
        };
        runtime.block_on(self.run(set, mode))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}
