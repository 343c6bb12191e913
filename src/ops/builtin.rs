// src/ops/builtin.rs

//! Built-in operation library.
//!
//! These cover the same ground as the demo task bodies shipped with the
//! original tool: cheap value producers, arithmetic that combines upstream
//! results, simulated I/O waits, a couple of compute-intensive kernels, and
//! an operation that always fails (for exercising failure propagation).
//!
//! All built-ins are registered in the worker binary as well, so every one of
//! them works in process-based mode.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde_json::json;

use crate::ops::{OpRegistry, OpResult, Operation};
use crate::task::TaskValue;

pub fn register_builtins(registry: &mut OpRegistry) {
    registry.register("value", ValueOp);
    registry.register("add", AddOp);
    registry.register("mul", MulOp);
    registry.register("concat", ConcatOp);
    registry.register("sleep_ms", SleepMsOp);
    registry.register("fib", FibOp);
    registry.register("prime_factor_count", PrimeFactorCountOp);
    registry.register("fail", FailOp);
}

fn arg<'a>(args: &'a [TaskValue], idx: usize, op: &str) -> anyhow::Result<&'a TaskValue> {
    args.get(idx)
        .ok_or_else(|| anyhow!("'{op}' expects at least {} argument(s)", idx + 1))
}

fn as_f64(value: &TaskValue) -> anyhow::Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {value}"))
}

fn as_u64(value: &TaskValue) -> anyhow::Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("expected a non-negative integer, got {value}"))
}

/// Pass the first argument through unchanged.
struct ValueOp;

impl Operation for ValueOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        Ok(arg(args, 0, "value")?.clone())
    }
}

/// Sum of all arguments. Integer if every input is an integer, float otherwise.
struct AddOp;

impl Operation for AddOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        if args.is_empty() {
            bail!("'add' expects at least one argument");
        }
        if args.iter().all(|v| v.is_i64()) {
            let mut sum: i64 = 0;
            for v in args {
                // is_i64 checked above
                sum = sum
                    .checked_add(v.as_i64().unwrap_or(0))
                    .context("'add' overflowed i64")?;
            }
            return Ok(json!(sum));
        }
        let mut sum = 0.0;
        for v in args {
            sum += as_f64(v)?;
        }
        Ok(json!(sum))
    }
}

/// Product of all arguments, as a float.
struct MulOp;

impl Operation for MulOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        if args.is_empty() {
            bail!("'mul' expects at least one argument");
        }
        let mut product = 1.0;
        for v in args {
            product *= as_f64(v)?;
        }
        Ok(json!(product))
    }
}

/// Concatenate arguments as strings. A `sep` kwarg overrides the default " ".
struct ConcatOp;

impl Operation for ConcatOp {
    fn call(&self, args: &[TaskValue], kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        let sep = match kwargs.get("sep") {
            Some(v) => v
                .as_str()
                .ok_or_else(|| anyhow!("'concat' sep must be a string"))?
                .to_string(),
            None => " ".to_string(),
        };
        let parts: Vec<String> = args
            .iter()
            .map(|v| match v {
                TaskValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        Ok(json!(parts.join(&sep)))
    }
}

/// Sleep for `args[0]` milliseconds, simulating an I/O wait.
///
/// Returns the `result` kwarg if given, otherwise the slept duration. The
/// async path uses a timer instead of blocking, so in cooperative mode other
/// tasks run while this one waits.
struct SleepMsOp;

impl SleepMsOp {
    fn parse(args: &[TaskValue], kwargs: &BTreeMap<String, TaskValue>) -> anyhow::Result<(u64, TaskValue)> {
        let ms = as_u64(arg(args, 0, "sleep_ms")?)?;
        let result = kwargs.get("result").cloned().unwrap_or(json!(ms));
        Ok((ms, result))
    }
}

impl Operation for SleepMsOp {
    fn call(&self, args: &[TaskValue], kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        let (ms, result) = Self::parse(args, kwargs)?;
        std::thread::sleep(Duration::from_millis(ms));
        Ok(result)
    }

    fn call_async<'a>(
        &'a self,
        args: &'a [TaskValue],
        kwargs: &'a BTreeMap<String, TaskValue>,
    ) -> Pin<Box<dyn Future<Output = OpResult> + Send + 'a>> {
        Box::pin(async move {
            let (ms, result) = Self::parse(args, kwargs)?;
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(result)
        })
    }
}

/// Iterative Fibonacci; errors on u64 overflow (n > 93).
struct FibOp;

impl Operation for FibOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        let n = as_u64(arg(args, 0, "fib")?)?;
        let (mut a, mut b): (u64, u64) = (0, 1);
        for _ in 0..n {
            let next = a.checked_add(b).context("'fib' overflowed u64")?;
            a = b;
            b = next;
        }
        Ok(json!(a))
    }
}

/// Count of prime factors of `args[0]`, with multiplicity.
struct PrimeFactorCountOp;

impl Operation for PrimeFactorCountOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        let mut n = as_u64(arg(args, 0, "prime_factor_count")?)?;
        if n < 2 {
            return Ok(json!(0));
        }
        let mut count: u64 = 0;
        let mut d: u64 = 2;
        while d * d <= n {
            while n % d == 0 {
                count += 1;
                n /= d;
            }
            d += 1;
        }
        if n > 1 {
            count += 1;
        }
        Ok(json!(count))
    }
}

/// Always fails, with `args[0]` as the message if given.
struct FailOp;

impl Operation for FailOp {
    fn call(&self, args: &[TaskValue], _kwargs: &BTreeMap<String, TaskValue>) -> OpResult {
        let message = args
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or("'fail' operation invoked");
        bail!("{message}")
    }
}
