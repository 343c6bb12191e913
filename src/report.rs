// src/report.rs

//! Run reports: the record set handed to visualizers.
//!
//! A [`RunReport`] is everything an external tool needs to render a Gantt
//! chart or dependency graph: per task its name, dependencies, terminal
//! status, start/end offsets and result. The core deliberately owns no
//! rendering beyond a plain-text summary for the CLI.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::dag::{Scheduler, TaskStatus};
use crate::errors::Result;
use crate::exec::ExecMode;
use crate::task::{TaskName, TaskValue};

/// One task's observable outcome.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub name: TaskName,
    pub op: String,
    pub deps: Vec<TaskName>,
    pub status: TaskStatus,
    /// Offsets in milliseconds from the start of the run; absent for tasks
    /// that never ran (skipped, or pending after an aborted run).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything observable about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: ExecMode,
    pub total_ms: f64,
    pub tasks: Vec<TaskRecord>,
}

fn to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl RunReport {
    pub(crate) fn from_scheduler(mode: ExecMode, total: Duration, scheduler: &Scheduler) -> Self {
        let tasks = scheduler
            .tasks()
            .enumerate()
            .map(|(id, info)| TaskRecord {
                name: info.name.clone(),
                op: info.op.clone(),
                deps: scheduler
                    .dependencies_of(id)
                    .iter()
                    .filter_map(|&dep_id| scheduler.task(dep_id).map(|dep| dep.name.clone()))
                    .collect(),
                status: info.status,
                started_ms: info.started.map(to_ms),
                finished_ms: info.finished.map(to_ms),
                result: info.result.clone(),
                error: info.error.clone(),
            })
            .collect();

        Self {
            mode,
            total_ms: to_ms(total),
            tasks,
        }
    }

    pub fn record(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|record| record.name == name)
    }

    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        self.record(name).map(|record| record.status)
    }

    pub fn result_of(&self, name: &str) -> Option<&TaskValue> {
        self.record(name).and_then(|record| record.result.as_ref())
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks
            .iter()
            .filter(|record| record.status == status)
            .count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text summary for terminal output.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "run finished in {:.1}ms (mode: {})",
            self.total_ms, self.mode
        );
        let _ = writeln!(
            out,
            "  {} completed, {} failed, {} skipped",
            self.count(TaskStatus::Completed),
            self.count(TaskStatus::Failed),
            self.count(TaskStatus::Skipped),
        );
        let _ = writeln!(out);

        let name_width = self
            .tasks
            .iter()
            .map(|record| record.name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        let _ = writeln!(
            out,
            "  {:<name_width$}  {:<9}  {:>9}  {:>9}  outcome",
            "task", "status", "start", "end"
        );
        for record in &self.tasks {
            let start = match record.started_ms {
                Some(ms) => format!("{ms:.1}ms"),
                None => "-".to_string(),
            };
            let end = match record.finished_ms {
                Some(ms) => format!("{ms:.1}ms"),
                None => "-".to_string(),
            };
            let outcome = match record.status {
                TaskStatus::Failed => record
                    .error
                    .clone()
                    .unwrap_or_else(|| "failed".to_string()),
                TaskStatus::Skipped => "skipped (upstream failure)".to_string(),
                _ => record
                    .result
                    .as_ref()
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            };
            let _ = writeln!(
                out,
                "  {:<name_width$}  {:<9}  {:>9}  {:>9}  {}",
                record.name, record.status, start, end, outcome
            );
        }

        out
    }
}
