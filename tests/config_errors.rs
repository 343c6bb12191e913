// tests/config_errors.rs

//! Configuration errors abort a run before any task executes.

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskdag::errors::TaskdagError;
use taskdag::{ArgSpec, ExecMode, OpRegistry, Orchestrator, RunOptions, TaskSet, TaskSpec};
use taskdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// Registry whose single op counts invocations, to prove nothing ran.
fn counting_registry() -> (OpRegistry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_op = Arc::clone(&calls);
    let mut registry = OpRegistry::new();
    registry.register_fn("count", move |_, _| {
        calls_in_op.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::Value::Null)
    });
    (registry, calls)
}

#[test]
fn cycle_is_rejected_before_execution() -> TestResult {
    init_tracing();

    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "count").arg(ArgSpec::task("b")))?;
    set.insert(TaskSpec::new("b", "count").arg(ArgSpec::task("a")))?;

    let (registry, calls) = counting_registry();
    let result = Orchestrator::new(registry).run_blocking(&set, ExecMode::Threaded);

    assert!(matches!(result, Err(TaskdagError::DependencyCycle(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "no task may have executed");

    Ok(())
}

#[test]
fn missing_dependency_is_a_config_error() -> TestResult {
    init_tracing();

    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "count").arg(ArgSpec::task("ghost")))?;

    let (registry, calls) = counting_registry();
    let result = Orchestrator::new(registry).run_blocking(&set, ExecMode::Sequential);

    match result {
        Err(TaskdagError::MissingDependency { task, dependency }) => {
            assert_eq!(task, "a");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[test]
fn self_reference_is_rejected() -> TestResult {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "count").arg(ArgSpec::task("a")))?;

    let (registry, _) = counting_registry();
    let result = Orchestrator::new(registry).run_blocking(&set, ExecMode::Sequential);

    assert!(matches!(result, Err(TaskdagError::Config(_))));
    Ok(())
}

#[test]
fn duplicate_task_names_are_rejected_at_insert() {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "count")).expect("first insert");
    let result = set.insert(TaskSpec::new("a", "count"));
    assert!(matches!(result, Err(TaskdagError::DuplicateTask(name)) if name == "a"));
}

#[test]
fn unknown_operation_is_rejected_before_execution() -> TestResult {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "no_such_op"))?;

    let (registry, _) = counting_registry();
    let result = Orchestrator::new(registry).run_blocking(&set, ExecMode::Sequential);

    match result {
        Err(TaskdagError::UnknownOp { task, op }) => {
            assert_eq!(task, "a");
            assert_eq!(op, "no_such_op");
        }
        other => panic!("expected UnknownOp, got {other:?}"),
    }
    Ok(())
}

#[test]
fn zero_workers_is_rejected() -> TestResult {
    let mut set = TaskSet::new();
    set.insert(TaskSpec::new("a", "count"))?;

    let (registry, _) = counting_registry();
    let orchestrator = Orchestrator::new(registry).with_options(RunOptions {
        workers: 0,
        worker_command: None,
    });
    let result = orchestrator.run_blocking(&set, ExecMode::Threaded);

    assert!(matches!(result, Err(TaskdagError::Config(_))));
    Ok(())
}
