// src/exec/process.rs

//! Worker-process pool execution.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, warn};

use crate::dag::ScheduledTask;
use crate::engine::{TaskCompletion, TaskOutcome, TaskSpan};
use crate::errors::{Result, TaskdagError};
use crate::exec::worker::{WorkerRequest, WorkerResponse};
use crate::exec::ExecutorBackend;

/// Runs each ready task in an isolated worker process.
///
/// Workers are spawned lazily, reused across tasks, and capped by a
/// semaphore so at most `workers` processes exist at a time. A worker that
/// breaks protocol (dies, emits garbage) is killed and dropped from the
/// pool; the task it was serving is reported as failed, and a replacement is
/// spawned on demand.
pub struct ProcessPoolBackend {
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    epoch: Instant,
    pool: Arc<WorkerPool>,
}

impl ProcessPoolBackend {
    /// `worker_command` is the argv used to start a worker child; `None`
    /// re-executes the current binary with `--worker` appended, which is
    /// correct for the `taskdag` CLI and for any binary that routes
    /// `--worker` into [`crate::exec::worker::serve`].
    pub fn new(
        completion_tx: mpsc::UnboundedSender<TaskCompletion>,
        epoch: Instant,
        workers: usize,
        worker_command: Option<Vec<String>>,
    ) -> Result<Self> {
        let command = match worker_command {
            Some(command) if !command.is_empty() => command,
            Some(_) => {
                return Err(TaskdagError::Config(
                    "worker_command must not be empty".to_string(),
                ));
            }
            None => {
                let exe = std::env::current_exe()?;
                vec![exe.to_string_lossy().into_owned(), "--worker".to_string()]
            }
        };

        Ok(Self {
            completion_tx,
            epoch,
            pool: Arc::new(WorkerPool {
                permits: Semaphore::new(workers.max(1)),
                idle: Mutex::new(Vec::new()),
                command,
            }),
        })
    }
}

impl ExecutorBackend for ProcessPoolBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;
        let pool = Arc::clone(&self.pool);

        Box::pin(async move {
            for task in tasks {
                let tx = tx.clone();
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    let Ok(_permit) = pool.permits.acquire().await else {
                        return;
                    };

                    let started = epoch.elapsed();
                    let (outcome, worker) = match pool.checkout().await {
                        Ok(mut worker) => match worker.exchange(&task).await {
                            Ok(outcome) => (outcome, Some(worker)),
                            Err(err) => {
                                warn!(
                                    task = %task.name,
                                    error = %err,
                                    "worker broke protocol; discarding it"
                                );
                                worker.discard();
                                (TaskOutcome::Failed(format!("worker error: {err:#}")), None)
                            }
                        },
                        Err(err) => (
                            TaskOutcome::Failed(format!("failed to start worker: {err:#}")),
                            None,
                        ),
                    };
                    let span = TaskSpan {
                        started,
                        finished: epoch.elapsed(),
                    };

                    if let Some(worker) = worker {
                        pool.idle.lock().await.push(worker);
                    }
                    let _ = tx.send(TaskCompletion {
                        id: task.id,
                        outcome,
                        span,
                    });
                });
            }
            Ok(())
        })
    }
}

struct WorkerPool {
    permits: Semaphore,
    idle: Mutex<Vec<PoolWorker>>,
    command: Vec<String>,
}

impl WorkerPool {
    /// Reuse an idle worker, or spawn a fresh one.
    async fn checkout(&self) -> anyhow::Result<PoolWorker> {
        if let Some(worker) = self.idle.lock().await.pop() {
            return Ok(worker);
        }
        PoolWorker::spawn(&self.command)
    }
}

/// One worker child plus its wired-up pipes.
struct PoolWorker {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl PoolWorker {
    fn spawn(command: &[String]) -> anyhow::Result<Self> {
        let (program, args) = command
            .split_first()
            .context("worker command must not be empty")?;

        debug!(?program, "spawning worker process");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning worker process '{program}'"))?;

        let stdin = child.stdin.take().context("worker stdin not piped")?;
        let stdout = child.stdout.take().context("worker stdout not piped")?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Ship one request and wait for its response line.
    async fn exchange(&mut self, task: &ScheduledTask) -> anyhow::Result<TaskOutcome> {
        let request = WorkerRequest {
            op: task.op_name.clone(),
            args: task.args.clone(),
            kwargs: task.kwargs.clone(),
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        match self.stdout.next_line().await? {
            Some(line) => {
                let response: WorkerResponse = serde_json::from_str(&line)
                    .with_context(|| format!("malformed worker response: {line}"))?;
                Ok(match response {
                    WorkerResponse::Ok { value } => TaskOutcome::Success(value),
                    WorkerResponse::Err { message } => TaskOutcome::Failed(message),
                })
            }
            None => bail!("worker process exited unexpectedly"),
        }
    }

    /// Kill the child promptly instead of waiting for drop.
    fn discard(mut self) {
        if let Err(err) = self.child.start_kill() {
            debug!(error = %err, "failed to kill broken worker (already gone?)");
        }
    }
}
