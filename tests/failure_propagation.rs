// tests/failure_propagation.rs

//! A failed task marks its transitive dependents as skipped; independent
//! tasks still complete, and the run itself returns Ok.

use std::error::Error;

use serde_json::json;
use taskdag::dag::TaskStatus;
use taskdag::{ArgSpec, ExecMode, OpRegistry, Orchestrator, RunOptions, TaskSet, TaskSpec};
use taskdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn orchestrator() -> Orchestrator {
    Orchestrator::new(OpRegistry::with_builtins()).with_options(RunOptions {
        workers: 2,
        worker_command: Some(vec![
            env!("CARGO_BIN_EXE_taskdag").to_string(),
            "--worker".to_string(),
        ]),
    })
}

/// broken fails; chained depends on it, deep depends on chained;
/// independent has no relation to any of them.
fn failing_set() -> TaskSet {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("broken", "fail").arg(ArgSpec::value("boom")))
        .expect("insert broken");
    set.insert(TaskSpec::new("chained", "add").arg(ArgSpec::task("broken")))
        .expect("insert chained");
    set.insert(TaskSpec::new("deep", "add").arg(ArgSpec::task("chained")))
        .expect("insert deep");
    set.insert(TaskSpec::new("independent", "value").arg(ArgSpec::value(1)))
        .expect("insert independent");
    set
}

fn assert_failure_propagation(mode: ExecMode) -> TestResult {
    init_tracing();

    // The run must not surface the task failure as an error.
    let report = orchestrator().run_blocking(&failing_set(), mode)?;

    assert_eq!(report.status_of("broken"), Some(TaskStatus::Failed), "mode {mode}");
    assert_eq!(report.status_of("chained"), Some(TaskStatus::Skipped), "mode {mode}");
    assert_eq!(report.status_of("deep"), Some(TaskStatus::Skipped), "mode {mode}");
    assert_eq!(
        report.status_of("independent"),
        Some(TaskStatus::Completed),
        "mode {mode}"
    );
    assert_eq!(report.result_of("independent"), Some(&json!(1)));

    let broken = report.record("broken").unwrap();
    assert!(
        broken.error.as_deref().is_some_and(|e| e.contains("boom")),
        "mode {mode}: expected failure message, got {:?}",
        broken.error
    );

    // Skipped tasks never ran, so they have no timing.
    let chained = report.record("chained").unwrap();
    assert_eq!(chained.started_ms, None, "mode {mode}");
    assert_eq!(chained.result, None, "mode {mode}");

    Ok(())
}

#[test]
fn sequential_failure_propagation() -> TestResult {
    assert_failure_propagation(ExecMode::Sequential)
}

#[test]
fn threaded_failure_propagation() -> TestResult {
    assert_failure_propagation(ExecMode::Threaded)
}

#[test]
fn process_failure_propagation() -> TestResult {
    assert_failure_propagation(ExecMode::Process)
}

#[test]
fn cooperative_failure_propagation() -> TestResult {
    assert_failure_propagation(ExecMode::Cooperative)
}

/// A panicking operation is contained the same way as an error return.
#[test]
fn panicking_operation_is_reported_as_failed() -> TestResult {
    init_tracing();

    let mut registry = OpRegistry::with_builtins();
    registry.register_fn("panics", |_, _| panic!("operation blew up"));

    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("bad", "panics"))?;
    set.insert(TaskSpec::new("after", "add").arg(ArgSpec::task("bad")))?;

    let report =
        Orchestrator::new(registry).run_blocking(&set, ExecMode::Threaded)?;

    assert_eq!(report.status_of("bad"), Some(TaskStatus::Failed));
    assert_eq!(report.status_of("after"), Some(TaskStatus::Skipped));

    Ok(())
}
