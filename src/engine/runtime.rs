// src/engine/runtime.rs

use std::fmt;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::{ScheduledTask, Scheduler};
use crate::engine::TaskCompletion;
use crate::errors::Result;
use crate::exec::ExecutorBackend;

/// Drives one run of the scheduler against an executor backend.
///
/// The loop is mode-agnostic: it seeds the initial ready set, waits for
/// completion events, feeds them to the scheduler, and dispatches whatever
/// became ready, until every task is terminal. All mode-specific behaviour
/// lives behind [`ExecutorBackend`].
pub struct Runtime<E: ExecutorBackend> {
    scheduler: Scheduler,
    completion_rx: mpsc::UnboundedReceiver<TaskCompletion>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        scheduler: Scheduler,
        completion_rx: mpsc::UnboundedReceiver<TaskCompletion>,
        executor: E,
    ) -> Self {
        Self {
            scheduler,
            completion_rx,
            executor,
        }
    }

    /// Run the task set to completion and return the final scheduler state.
    pub async fn run(mut self) -> Result<Scheduler> {
        let initial = self.scheduler.initial_ready()?;
        debug!(count = initial.len(), "seeding initial ready tasks");
        self.dispatch(initial).await?;

        while !self.scheduler.all_terminal() {
            let completion = match self.completion_rx.recv().await {
                Some(c) => c,
                None => {
                    // Every sender hung up while tasks are still outstanding;
                    // the backend lost track of something.
                    return Err(anyhow!(
                        "completion channel closed before all tasks finished"
                    )
                    .into());
                }
            };

            debug!(?completion, "runtime received completion");
            let newly_ready =
                self.scheduler
                    .handle_completion(completion.id, completion.outcome, completion.span)?;
            self.dispatch(newly_ready).await?;
        }

        info!("all tasks terminal; run finished");
        Ok(self.scheduler)
    }

    async fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "dispatching ready tasks");
        self.executor.spawn_ready_tasks(tasks).await
    }
}
