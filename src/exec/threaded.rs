// src/exec/threaded.rs

//! Bounded shared thread pool execution.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

use crate::dag::ScheduledTask;
use crate::engine::{TaskCompletion, TaskOutcome, TaskSpan};
use crate::errors::Result;
use crate::exec::{outcome_from, ExecutorBackend};

/// Submits each ready task to the blocking thread pool, with a semaphore
/// capping how many run at once.
///
/// Tasks with no dependency relationship run concurrently; a task that
/// panics is reported as failed rather than tearing the run down.
pub struct ThreadPoolBackend {
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    epoch: Instant,
    permits: Arc<Semaphore>,
}

impl ThreadPoolBackend {
    pub fn new(
        completion_tx: mpsc::UnboundedSender<TaskCompletion>,
        epoch: Instant,
        workers: usize,
    ) -> Self {
        Self {
            completion_tx,
            epoch,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }
}

impl ExecutorBackend for ThreadPoolBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;
        let permits = Arc::clone(&self.permits);

        Box::pin(async move {
            for task in tasks {
                let tx = tx.clone();
                let permits = Arc::clone(&permits);

                tokio::spawn(async move {
                    // The semaphore is never closed, so acquisition only
                    // fails if the whole pool is being torn down.
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };

                    let ScheduledTask {
                        id,
                        name,
                        op,
                        args,
                        kwargs,
                        ..
                    } = task;
                    debug!(task = %name, "running task on pool thread");

                    let started = epoch.elapsed();
                    let joined =
                        tokio::task::spawn_blocking(move || op.call(&args, &kwargs)).await;
                    let span = TaskSpan {
                        started,
                        finished: epoch.elapsed(),
                    };

                    let outcome = match joined {
                        Ok(result) => outcome_from(result),
                        Err(join_err) => {
                            TaskOutcome::Failed(format!("task '{name}' panicked: {join_err}"))
                        }
                    };

                    let _ = tx.send(TaskCompletion { id, outcome, span });
                });
            }
            Ok(())
        })
    }
}
