// src/exec/sequential.rs

//! Inline, one-at-a-time execution.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::debug;

use crate::dag::ScheduledTask;
use crate::engine::{TaskCompletion, TaskSpan};
use crate::errors::Result;
use crate::exec::{outcome_from, ExecutorBackend};

/// Runs every dispatched task to completion before touching the next one.
///
/// Because the runtime awaits `spawn_ready_tasks`, a whole ready batch is
/// executed serially, and the next batch is only computed afterwards; the
/// overall order is exactly the scheduler's topological order.
pub struct SequentialBackend {
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    epoch: Instant,
}

impl SequentialBackend {
    pub fn new(completion_tx: mpsc::UnboundedSender<TaskCompletion>, epoch: Instant) -> Self {
        Self {
            completion_tx,
            epoch,
        }
    }
}

impl ExecutorBackend for SequentialBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;

        Box::pin(async move {
            for task in tasks {
                debug!(task = %task.name, op = %task.op_name, "running task inline");
                let started = epoch.elapsed();
                let result = task.op.call_async(&task.args, &task.kwargs).await;
                let span = TaskSpan {
                    started,
                    finished: epoch.elapsed(),
                };
                tx.send(TaskCompletion {
                    id: task.id,
                    outcome: outcome_from(result),
                    span,
                })
                .map_err(|_| anyhow!("completion channel closed"))?;
            }
            Ok(())
        })
    }
}
