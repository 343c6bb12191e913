// src/exec/cooperative.rs

//! Cooperative single-threaded execution.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;

use crate::dag::ScheduledTask;
use crate::engine::{TaskCompletion, TaskSpan};
use crate::errors::Result;
use crate::exec::{outcome_from, ExecutorBackend};

/// Spawns each ready task as a future on the ambient runtime.
///
/// Single-threaded scheduling is a property of the runtime, not of this
/// backend: `Orchestrator::run_blocking` drives cooperative runs on a
/// current-thread runtime, so tasks only interleave where an operation's
/// `call_async` awaits. An operation that never awaits occupies the thread
/// until it returns.
pub struct CooperativeBackend {
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    epoch: Instant,
}

impl CooperativeBackend {
    pub fn new(completion_tx: mpsc::UnboundedSender<TaskCompletion>, epoch: Instant) -> Self {
        Self {
            completion_tx,
            epoch,
        }
    }
}

impl ExecutorBackend for CooperativeBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;

        Box::pin(async move {
            for task in tasks {
                let tx = tx.clone();
                tokio::spawn(async move {
                    debug!(task = %task.name, "running task on event loop");
                    let started = epoch.elapsed();
                    let result = task.op.call_async(&task.args, &task.kwargs).await;
                    let span = TaskSpan {
                        started,
                        finished: epoch.elapsed(),
                    };
                    let _ = tx.send(TaskCompletion {
                        id: task.id,
                        outcome: outcome_from(result),
                        span,
                    });
                });
            }
            Ok(())
        })
    }
}
