// tests/modes_equivalence.rs

//! For an acyclic task set, every execution mode must produce identical
//! final results; mode only affects timing and interleaving.

use std::collections::BTreeMap;
use std::error::Error;

use serde_json::json;
use taskdag::dag::TaskStatus;
use taskdag::{ArgSpec, ExecMode, OpRegistry, Orchestrator, RunOptions, TaskSet, TaskSpec};
use taskdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

const ALL_MODES: [ExecMode; 4] = [
    ExecMode::Sequential,
    ExecMode::Threaded,
    ExecMode::Process,
    ExecMode::Cooperative,
];

fn orchestrator() -> Orchestrator {
    Orchestrator::new(OpRegistry::with_builtins()).with_options(RunOptions {
        workers: 2,
        // The test binary is not the taskdag CLI, so point process mode at
        // the real binary explicitly.
        worker_command: Some(vec![
            env!("CARGO_BIN_EXE_taskdag").to_string(),
            "--worker".to_string(),
        ]),
    })
}

/// T1 returns 5, T2 returns 7, T3 sums both.
fn sum_set() -> TaskSet {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("t1", "value").arg(ArgSpec::value(5)))
        .expect("insert t1");
    set.insert(TaskSpec::new("t2", "value").arg(ArgSpec::value(7)))
        .expect("insert t2");
    set.insert(
        TaskSpec::new("t3", "add")
            .arg(ArgSpec::task("t1"))
            .arg(ArgSpec::task("t2")),
    )
    .expect("insert t3");
    set
}

fn assert_sum_scenario(mode: ExecMode) -> TestResult {
    init_tracing();

    let report = orchestrator().run_blocking(&sum_set(), mode)?;

    assert_eq!(report.result_of("t3"), Some(&json!(12)), "mode {mode}");
    for name in ["t1", "t2", "t3"] {
        assert_eq!(
            report.status_of(name),
            Some(TaskStatus::Completed),
            "mode {mode}, task {name}"
        );
    }

    // T1 and T2 have no mutual ordering constraint, but both must finish
    // before T3 starts.
    let t3_start = report.record("t3").and_then(|r| r.started_ms).unwrap();
    for dep in ["t1", "t2"] {
        let finished = report.record(dep).and_then(|r| r.finished_ms).unwrap();
        assert!(
            finished <= t3_start,
            "mode {mode}: {dep} finished at {finished}ms, after t3 started at {t3_start}ms"
        );
    }

    Ok(())
}

#[test]
fn sequential_sum_scenario() -> TestResult {
    assert_sum_scenario(ExecMode::Sequential)
}

#[test]
fn threaded_sum_scenario() -> TestResult {
    assert_sum_scenario(ExecMode::Threaded)
}

#[test]
fn process_sum_scenario() -> TestResult {
    assert_sum_scenario(ExecMode::Process)
}

#[test]
fn cooperative_sum_scenario() -> TestResult {
    assert_sum_scenario(ExecMode::Cooperative)
}

/// A deeper DAG mixing compute, waits and string handling.
fn mixed_set() -> TaskSet {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("fib", "fib").arg(ArgSpec::value(20)))
        .expect("insert fib");
    set.insert(
        TaskSpec::new("factors", "prime_factor_count").arg(ArgSpec::value(1_234_567)),
    )
    .expect("insert factors");
    set.insert(
        TaskSpec::new("wait", "sleep_ms")
            .arg(ArgSpec::value(10))
            .kwarg("result", ArgSpec::value(3)),
    )
    .expect("insert wait");
    set.insert(
        TaskSpec::new("total", "add")
            .arg(ArgSpec::task("fib"))
            .arg(ArgSpec::task("factors"))
            .arg(ArgSpec::task("wait")),
    )
    .expect("insert total");
    set.insert(
        TaskSpec::new("label", "concat")
            .arg(ArgSpec::value("total:"))
            .arg(ArgSpec::task("total")),
    )
    .expect("insert label");
    set
}

#[test]
fn all_modes_produce_identical_results() -> TestResult {
    init_tracing();

    let orchestrator = orchestrator();
    let set = mixed_set();

    let mut baseline: Option<BTreeMap<String, (TaskStatus, Option<serde_json::Value>)>> = None;
    for mode in ALL_MODES {
        let report = orchestrator.run_blocking(&set, mode)?;
        let outcomes: BTreeMap<_, _> = report
            .tasks
            .iter()
            .map(|r| (r.name.clone(), (r.status, r.result.clone())))
            .collect();

        match &baseline {
            None => baseline = Some(outcomes),
            Some(expected) => {
                assert_eq!(expected, &outcomes, "mode {mode} diverged from sequential");
            }
        }
    }

    Ok(())
}
