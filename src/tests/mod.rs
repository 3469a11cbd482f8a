mod closures;
mod diagnostics;
mod macros;
mod numbers;
mod tracing;

use crate::environment::{default_env, EnvRef};
use crate::errors::{Error, Result, RuntimeErrorKind};
use crate::expression::Value;
use crate::read_and_evaluate;

fn run(src: &str) -> Result<Value> {
    run_in_env(src, &default_env())
}

fn run_in_env(src: &str, env: &EnvRef) -> Result<Value> {
    read_and_evaluate(src, None, env)
}

fn runtime_kind(result: Result<Value>) -> RuntimeErrorKind {
    match result {
        Err(Error::Runtime(e)) => e.kind().clone(),
        other => panic!("expected runtime error, got {:?}", other),
    }
}

fn sym(name: &str) -> Value {
    Value::symbol(name)
}
