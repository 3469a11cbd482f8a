pub mod builtins;
pub mod envref;
pub mod environment;
pub mod errors;
pub mod expression;
pub mod interpreter;
pub mod io;
pub mod lexer;
pub mod macros;
pub mod number;
pub mod parser;
pub mod sourcecode;
pub mod symbol;
pub mod syntax;
pub mod tracer;

#[cfg(test)]
mod tests;

pub use environment::{default_env, EnvRef};
pub use errors::{Error, Result, RuntimeError, RuntimeErrorKind, SyntaxError};
pub use expression::Value;

/// Scan, build and evaluate a whole program in `env`. Returns the forced value
/// of the last top-level form.
pub fn read_and_evaluate(source: &str, name: Option<&str>, env: &EnvRef) -> Result<Value> {
    let ast = parser::parse_str(source, name)?;
    interpreter::eval(&ast, env).and_then(interpreter::force)
}
