// tests/config_loading.rs

//! TOML config parsing and validation.

use std::error::Error;
use std::path::PathBuf;

use taskdag::config::load_and_validate;
use taskdag::errors::TaskdagError;
use taskdag::task::ArgSpec;
use taskdag::ExecMode;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Taskdag.toml");
    std::fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn full_config_round() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[config]
mode = "threaded"
workers = 2

[task.t1]
op = "value"
args = [5]

[task.total]
op = "add"
args = [{ task = "t1" }, 7]
kwargs = { note = "demo" }
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.config.mode, Some(ExecMode::Threaded));
    assert_eq!(cfg.config.workers, Some(2));
    assert_eq!(cfg.task.len(), 2);

    let total = &cfg.task["total"];
    assert_eq!(total.op, "add");
    assert_eq!(total.args[0], ArgSpec::task("t1"));
    assert_eq!(total.args[1], ArgSpec::value(7));
    assert_eq!(total.kwargs["note"], ArgSpec::value("demo"));

    let set = cfg.to_task_set()?;
    assert_eq!(set.len(), 2);
    let id = set.id_of("total").expect("total registered");
    assert_eq!(set.get(id).map(|s| s.op.as_str()), Some("add"));

    Ok(())
}

#[test]
fn nested_argument_references_parse() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.t1]
op = "value"
args = [1]

[task.t2]
op = "value"
args = [[1, { task = "t1" }]]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    let t2 = &cfg.task["t2"];
    match &t2.args[0] {
        ArgSpec::List(items) => {
            assert_eq!(items[0], ArgSpec::value(1));
            assert_eq!(items[1], ArgSpec::task("t1"));
        }
        other => panic!("expected nested list, got {other:?}"),
    }

    // Nested references still count as dependencies.
    let set = cfg.to_task_set()?;
    let id = set.id_of("t2").expect("t2 registered");
    assert_eq!(
        set.get(id).map(|s| s.referenced_tasks()),
        Some(vec!["t1".to_string()])
    );

    Ok(())
}

#[test]
fn empty_config_is_rejected() -> TestResult {
    let (_dir, path) = write_config("")?;
    let result = load_and_validate(&path);
    assert!(matches!(result, Err(TaskdagError::Config(_))));
    Ok(())
}

#[test]
fn cyclic_config_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.a]
op = "value"
args = [{ task = "b" }]

[task.b]
op = "value"
args = [{ task = "a" }]
"#,
    )?;

    let result = load_and_validate(&path);
    assert!(matches!(result, Err(TaskdagError::DependencyCycle(_))));
    Ok(())
}

#[test]
fn unknown_reference_in_config_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.a]
op = "value"
args = [{ task = "missing" }]
"#,
    )?;

    let result = load_and_validate(&path);
    assert!(matches!(
        result,
        Err(TaskdagError::MissingDependency { .. })
    ));
    Ok(())
}

#[test]
fn zero_workers_in_config_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[config]
workers = 0

[task.a]
op = "value"
args = [1]
"#,
    )?;

    let result = load_and_validate(&path);
    assert!(matches!(result, Err(TaskdagError::Config(_))));
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let (_dir, path) = write_config("not [valid toml")?;
    let result = load_and_validate(&path);
    assert!(matches!(result, Err(TaskdagError::Toml(_))));
    Ok(())
}

#[test]
fn literal_arguments_stay_literal() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.t1]
op = "concat"
args = ["a", 1, 2.5, true]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    let t1 = &cfg.task["t1"];
    assert_eq!(t1.args[0], ArgSpec::value("a"));
    assert_eq!(t1.args[1], ArgSpec::value(1));
    assert_eq!(t1.args[2], ArgSpec::value(2.5));
    assert_eq!(t1.args[3], ArgSpec::value(true));
    let mut refs = Vec::new();
    for arg in &t1.args {
        arg.collect_refs(&mut refs);
    }
    assert!(refs.is_empty());

    Ok(())
}
