use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use taskdag::dag::ScheduledTask;
use taskdag::engine::{TaskCompletion, TaskOutcome, TaskSpan};
use taskdag::errors::Result;
use taskdag::exec::ExecutorBackend;

/// A recording executor that:
/// - records which tasks were "run", in dispatch order
/// - immediately reports completion for each scheduled task, without
///   invoking any operation (success with `null`, or an injected failure).
pub struct RecordingBackend {
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    executed: Arc<Mutex<Vec<String>>>,
    failures: HashSet<String>,
}

impl RecordingBackend {
    pub fn new(
        completion_tx: mpsc::UnboundedSender<TaskCompletion>,
        executed: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            completion_tx,
            executed,
            failures: HashSet::new(),
        }
    }

    /// Tasks whose completion should be reported as a failure.
    pub fn with_failures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failures = names.into_iter().map(Into::into).collect();
        self
    }
}

impl ExecutorBackend for RecordingBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.completion_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failures = self.failures.clone();

        Box::pin(async move {
            for t in tasks {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(t.name.clone());
                }

                let outcome = if failures.contains(&t.name) {
                    TaskOutcome::Failed("injected failure".to_string())
                } else {
                    TaskOutcome::Success(serde_json::Value::Null)
                };

                tx.send(TaskCompletion {
                    id: t.id,
                    outcome,
                    span: TaskSpan {
                        started: Duration::ZERO,
                        finished: Duration::ZERO,
                    },
                })
                .map_err(|_| anyhow::anyhow!("completion channel closed"))?;
            }
            Ok(())
        })
    }
}
