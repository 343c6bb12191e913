// tests/concurrency_timing.rs

//! Mode-specific interleaving: unrelated tasks overlap in concurrent modes
//! and never overlap in sequential mode. Assertions only compare the two
//! tasks' recorded spans against each other, so they are robust to slow
//! machines.

use std::error::Error;

use taskdag::report::RunReport;
use taskdag::{ArgSpec, ExecMode, OpRegistry, Orchestrator, RunOptions, TaskSet, TaskSpec};
use taskdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn sleepy_pair() -> TaskSet {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "sleep_ms").arg(ArgSpec::value(100)))
        .expect("insert a");
    set.insert(TaskSpec::new("b", "sleep_ms").arg(ArgSpec::value(100)))
        .expect("insert b");
    set
}

fn run(mode: ExecMode) -> Result<RunReport, Box<dyn Error>> {
    init_tracing();
    let orchestrator = Orchestrator::new(OpRegistry::with_builtins()).with_options(RunOptions {
        workers: 2,
        worker_command: None,
    });
    Ok(orchestrator.run_blocking(&sleepy_pair(), mode)?)
}

fn spans(report: &RunReport) -> ((f64, f64), (f64, f64)) {
    let get = |name: &str| {
        let record = report.record(name).expect("record exists");
        (
            record.started_ms.expect("task ran"),
            record.finished_ms.expect("task ran"),
        )
    };
    (get("a"), get("b"))
}

#[test]
fn threaded_unrelated_tasks_overlap() -> TestResult {
    let report = run(ExecMode::Threaded)?;
    let ((a_start, a_end), (b_start, b_end)) = spans(&report);
    assert!(
        a_start.max(b_start) < a_end.min(b_end),
        "expected overlap, got a=({a_start},{a_end}) b=({b_start},{b_end})"
    );
    Ok(())
}

#[test]
fn cooperative_unrelated_tasks_overlap() -> TestResult {
    let report = run(ExecMode::Cooperative)?;
    let ((a_start, a_end), (b_start, b_end)) = spans(&report);
    assert!(
        a_start.max(b_start) < a_end.min(b_end),
        "expected overlap, got a=({a_start},{a_end}) b=({b_start},{b_end})"
    );
    Ok(())
}

#[test]
fn sequential_tasks_never_overlap() -> TestResult {
    let report = run(ExecMode::Sequential)?;
    let ((a_start, a_end), (b_start, b_end)) = spans(&report);
    assert!(
        b_start >= a_end || a_start >= b_end,
        "expected serial spans, got a=({a_start},{a_end}) b=({b_start},{b_end})"
    );
    Ok(())
}
