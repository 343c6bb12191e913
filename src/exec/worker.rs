// src/exec/worker.rs

//! Child-process side of the process-based execution mode.
//!
//! The parent ships one JSON request per line on stdin; the worker resolves
//! the operation by name against its own registry, invokes it, and answers
//! with one JSON response per line on stdout. Only `serde_json`-representable
//! values ever cross the boundary, which is exactly the serializability
//! constraint the process mode imposes on task inputs and outputs.
//!
//! The `taskdag` binary enters this loop when invoked with `--worker`.
//! Library users whose registries contain custom operations must do the same
//! from their own binary (see [`serve`]) for process mode to find them.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ops::OpRegistry;
use crate::task::TaskValue;

/// One task invocation, as sent to a worker process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub op: String,
    #[serde(default)]
    pub args: Vec<TaskValue>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, TaskValue>,
}

/// Worker's answer to a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkerResponse {
    Ok { value: TaskValue },
    Err { message: String },
}

/// Serve requests from stdin until the parent closes the pipe.
///
/// Every request gets exactly one response line, including malformed ones;
/// the parent relies on that pairing to keep the protocol in lockstep.
pub fn serve(registry: &OpRegistry) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(registry, &line);
        let encoded = serde_json::to_string(&response)?;
        writeln!(stdout, "{encoded}")?;
        stdout.flush()?;
    }

    Ok(())
}

fn handle_request(registry: &OpRegistry, line: &str) -> WorkerResponse {
    let request: WorkerRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            return WorkerResponse::Err {
                message: format!("malformed worker request: {err}"),
            };
        }
    };

    let Some(op) = registry.get(&request.op) else {
        return WorkerResponse::Err {
            message: format!("unknown operation '{}'", request.op),
        };
    };

    match op.call(&request.args, &request.kwargs) {
        Ok(value) => WorkerResponse::Ok { value },
        Err(err) => WorkerResponse::Err {
            message: format!("{err:#}"),
        },
    }
}
