// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod ops;
pub mod report;
pub mod task;

use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::errors::Result;

pub use engine::{Orchestrator, RunOptions};
pub use exec::ExecMode;
pub use ops::OpRegistry;
pub use report::{RunReport, TaskRecord};
pub use task::{ArgSpec, TaskSet, TaskSpec};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - worker mode (process-mode children re-enter here via `--worker`)
/// - config loading and validation
/// - orchestrator construction and the actual run
/// - report output (text summary or JSON)
pub fn run(args: CliArgs) -> Result<()> {
    if args.worker {
        let registry = OpRegistry::with_builtins();
        return exec::worker::serve(&registry);
    }

    let config_path = PathBuf::from(&args.config);
    let cfg = config::load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let set = cfg.to_task_set()?;
    let mode = args
        .mode
        .or(cfg.config.mode)
        .unwrap_or(ExecMode::Sequential);

    let mut options = RunOptions::default();
    if let Some(workers) = args.workers.or(cfg.config.workers) {
        options.workers = workers;
    }

    let registry = OpRegistry::with_builtins();
    let orchestrator = Orchestrator::new(registry).with_options(options);
    let report = orchestrator.run_blocking(&set, mode)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_summary());
    }

    Ok(())
}

/// Simple dry-run output: print tasks, ops, args and derived dependencies.
fn print_dry_run(cfg: &ConfigFile) {
    println!("taskdag dry-run");
    if let Some(mode) = cfg.config.mode {
        println!("  config.mode = {mode}");
    }
    if let Some(workers) = cfg.config.workers {
        println!("  config.workers = {workers}");
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      op: {}", task.op);
        if !task.args.is_empty() {
            println!("      args: {:?}", task.args);
        }
        if !task.kwargs.is_empty() {
            println!("      kwargs: {:?}", task.kwargs);
        }
        let mut deps = Vec::new();
        for arg in task.args.iter().chain(task.kwargs.values()) {
            arg.collect_refs(&mut deps);
        }
        deps.sort();
        deps.dedup();
        if !deps.is_empty() {
            println!("      depends on: {deps:?}");
        }
    }
}
