use crate::environment::{EnvRef, Environment};
use crate::errors::*;
use crate::expression::{Closure, Kind, Pair, Params, Ref, Value};
use crate::interpreter::{self, parse_params, Operand};
use crate::macros::Macro;
use crate::number::Number;
use crate::sourcecode::Position;
use crate::symbol::Symbol;
use crate::syntax::{Ast, Special};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Sub};

/// Register every built-in procedure and special form in `env`.
pub fn install(env: &mut Environment) {
    // special forms

    env.insert_syntax("lambda", lambda);
    env.insert_syntax("define", define);
    env.insert_syntax("define-syntax", define_syntax);
    env.insert_syntax("syntax-rules", syntax_rules);
    env.insert_syntax("quote", quote);
    env.insert_syntax("if", if_);
    env.insert_syntax("begin", begin);
    env.insert_syntax("let", let_);
    env.insert_syntax("delay", delay);

    // pair operations

    env.insert_native("cons", |args| {
        require_args(args.len(), 2)?;
        Ok(Value::cons(args[0].clone(), args[1].clone()))
    });
    env.insert_native("car", |args| {
        require_args(args.len(), 1)?;
        require_kinds("car", args, &[Kind::is_pair])?;
        Ok(pair_of(&args[0])?.head())
    });
    env.insert_native("cdr", |args| {
        require_args(args.len(), 1)?;
        require_kinds("cdr", args, &[Kind::is_pair])?;
        Ok(pair_of(&args[0])?.tail())
    });
    env.insert_native("set-car!", |args| {
        require_args(args.len(), 2)?;
        require_kinds("set-car!", args, &[Kind::is_pair, Kind::is_any])?;
        pair_of(&args[0])?.set_head(args[1].clone());
        Ok(Value::Unspecified)
    });
    env.insert_native("set-cdr!", |args| {
        require_args(args.len(), 2)?;
        require_kinds("set-cdr!", args, &[Kind::is_pair, Kind::is_any])?;
        pair_of(&args[0])?.set_tail(args[1].clone());
        Ok(Value::Unspecified)
    });
    env.insert_native("list", |args| Ok(args.iter().cloned().collect()));

    // arithmetic

    env.insert_native("+", |args| accumulate("+", args, Number::Integer(0), Number::add));
    env.insert_native("*", |args| accumulate("*", args, Number::Integer(1), Number::mul));
    env.insert_native("-", |args| reduce("-", args, Number::Integer(0), Number::sub));
    env.insert_native("/", |args| reduce("/", args, Number::Integer(1), Number::div));

    env.insert_native("=", |args| compare_chain("=", args, |o| o == Ordering::Equal));
    env.insert_native("<", |args| compare_chain("<", args, |o| o == Ordering::Less));
    env.insert_native(">", |args| compare_chain(">", args, |o| o == Ordering::Greater));
    env.insert_native("<=", |args| compare_chain("<=", args, |o| o != Ordering::Greater));
    env.insert_native(">=", |args| compare_chain(">=", args, |o| o != Ordering::Less));

    // types

    env.insert_native("null?", |args| is_kind(args, |k| k == Kind::Nil));
    env.insert_native("pair?", |args| is_kind(args, Kind::is_pair));
    env.insert_native("number?", |args| is_kind(args, Kind::is_number));
    env.insert_native("symbol?", |args| is_kind(args, |k| k == Kind::Symbol));
    env.insert_native("procedure?", |args| is_kind(args, |k| k == Kind::Procedure));
    env.insert_native("vector?", |args| is_kind(args, Kind::is_vector));

    env.insert_native("eq?", |args| {
        require_args(args.len(), 2)?;
        Ok(args[0].eqv(&args[1]).into())
    });
    env.insert_native("not", |args| {
        require_args(args.len(), 1)?;
        Ok((!args[0].is_true()).into())
    });
    env.insert_native("force", |args| {
        require_args(args.len(), 1)?;
        interpreter::force(args[0].clone())
    });

    // vectors

    env.insert_native("vector", |args| Ok(Value::vector(args.to_vec())));
    env.insert_native("vector-length", |args| {
        require_args(args.len(), 1)?;
        let items = vector_of("vector-length", &args[0])?;
        let length = items.borrow().len();
        Ok(Value::from(length as i64))
    });
    env.insert_native("vector-ref", |args| {
        require_args(args.len(), 2)?;
        let items = vector_of("vector-ref", &args[0])?.borrow();
        let i = vector_index("vector-ref", &args[1], items.len())?;
        Ok(items[i].clone())
    });
    env.insert_native("vector-set!", |args| {
        require_args(args.len(), 3)?;
        let mut items = vector_of("vector-set!", &args[0])?.borrow_mut();
        let i = vector_index("vector-set!", &args[1], items.len())?;
        items[i] = args[2].clone();
        Ok(Value::Unspecified)
    });

    // files

    env.insert_native("load", |_| Err(RuntimeErrorKind::Unimplemented("load").into()));
}

/// Exactly `expected` arguments.
pub fn require_args(actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(RuntimeErrorKind::MissingArgs {
            required: expected,
            actual,
        }
        .into());
    }
    if actual > expected {
        return Err(RuntimeErrorKind::TooMuchArgs {
            required: expected,
            actual,
        }
        .into());
    }
    Ok(())
}

pub fn require_at_least(actual: usize, at_least: usize) -> Result<()> {
    if actual < at_least {
        return Err(RuntimeErrorKind::MissingArgsForDynamic { at_least, actual }.into());
    }
    Ok(())
}

/// Check each argument against the guard at the same index. Arguments past
/// the last guard are checked against the last one.
pub fn require_kinds(procedure: &str, args: &[Value], guards: &[fn(Kind) -> bool]) -> Result<()> {
    for (i, arg) in args.iter().enumerate() {
        let guard = match guards.get(i).or_else(|| guards.last()) {
            Some(guard) => guard,
            None => return Ok(()),
        };
        let kind = arg.kind();
        if !guard(kind) {
            return Err(RuntimeErrorKind::TypeMismatch {
                kind,
                procedure: procedure.into(),
            }
            .into());
        }
    }
    Ok(())
}

fn pair_of(value: &Value) -> Result<&Ref<Pair>> {
    value.as_pair().ok_or_else(|| {
        RuntimeErrorKind::TypeMismatch {
            kind: value.kind(),
            procedure: "pair".into(),
        }
        .into()
    })
}

fn vector_of<'a>(procedure: &str, value: &'a Value) -> Result<&'a RefCell<Vec<Value>>> {
    match value {
        Value::Vector(items) => Ok(&**items),
        other => Err(RuntimeErrorKind::TypeMismatch {
            kind: other.kind(),
            procedure: procedure.into(),
        }
        .into()),
    }
}

fn vector_index(procedure: &str, index: &Value, length: usize) -> Result<usize> {
    let i = match index {
        Value::Number(Number::Integer(i)) => *i,
        other => {
            return Err(RuntimeErrorKind::TypeMismatch {
                kind: other.kind(),
                procedure: procedure.into(),
            }
            .into())
        }
    };
    if i < 0 || i as usize >= length {
        return Err(RuntimeErrorKind::IndexOutOfRange { index: i, length }.into());
    }
    Ok(i as usize)
}

fn numbers(name: &str, args: &[Value], guard: fn(Kind) -> bool) -> Result<Vec<Number>> {
    require_kinds(name, args, &[guard])?;
    Ok(args.iter().filter_map(Value::as_number).copied().collect())
}

/// Fold all arguments into `identity`.
fn accumulate(
    name: &str,
    args: &[Value],
    identity: Number,
    op: fn(Number, Number) -> Result<Number>,
) -> Result<Value> {
    let mut acc = identity;
    for x in numbers(name, args, Kind::is_number)? {
        acc = op(acc, x)?;
    }
    Ok(acc.into())
}

/// Fold the remaining arguments into the first one. A single argument is
/// combined with `identity` instead, so `(- x)` negates and `(/ x)` inverts.
fn reduce(
    name: &str,
    args: &[Value],
    identity: Number,
    op: fn(Number, Number) -> Result<Number>,
) -> Result<Value> {
    require_at_least(args.len(), 1)?;
    let numbers = numbers(name, args, Kind::is_number)?;
    let (first, rest) = match numbers.split_first() {
        Some((first, [])) => return Ok(op(identity, *first)?.into()),
        Some(split) => split,
        None => return Ok(identity.into()),
    };
    let mut acc = *first;
    for x in rest {
        acc = op(acc, *x)?;
    }
    Ok(acc.into())
}

fn compare_chain(name: &str, args: &[Value], accept: fn(Ordering) -> bool) -> Result<Value> {
    require_at_least(args.len(), 1)?;
    let numbers = numbers(name, args, Kind::is_real)?;
    Ok(numbers
        .windows(2)
        .all(|w| w[0].compare(&w[1]).map_or(false, accept))
        .into())
}

fn is_kind(args: &[Value], predicate: fn(Kind) -> bool) -> Result<Value> {
    require_args(args.len(), 1)?;
    Ok(predicate(args[0].kind()).into())
}

fn syntax_node<'a>(operand: &'a Operand, env: &EnvRef, pos: &Position) -> Result<&'a Ast> {
    operand.node().ok_or_else(|| {
        RuntimeError::new(RuntimeErrorKind::InvalidSyntax)
            .at(pos)
            .in_env(env)
            .into()
    })
}

fn body_of(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Ref<[Ast]>> {
    operands
        .iter()
        .map(|op| syntax_node(op, env, pos).map(Ast::clone))
        .collect::<Result<Vec<_>>>()
        .map(Ref::from)
}

fn lambda(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    require_at_least(operands.len(), 2)?;
    let params = parse_params(syntax_node(&operands[0], env, pos)?)?;
    let body = body_of(&operands[1..], env, pos)?;
    Ok(Value::Closure(Closure::new(params, body, env.clone())))
}

/// `(define name expr)` or `(define (name . params) body ...)`.
fn define(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    require_at_least(operands.len(), 2)?;
    match syntax_node(&operands[0], env, pos)? {
        Ast::Symbol(name, _) => {
            require_args(operands.len(), 2)?;
            let value = operands[1].eval(env)?;
            env.define(name.clone(), value);
        }
        Ast::List(signature, sig_pos) => {
            let (name, params) = procedure_signature(signature, sig_pos)?;
            let body = body_of(&operands[1..], env, pos)?;
            env.define(name, Value::Closure(Closure::new(params, body, env.clone())));
        }
        other => {
            return Err(SyntaxError::IllegalParamList {
                pos: other.position().cloned().unwrap_or_else(|| pos.clone()),
            }
            .into())
        }
    }
    Ok(Value::Unspecified)
}

fn procedure_signature(
    signature: &[Ast],
    pos: &Position,
) -> std::result::Result<(Symbol, Params), SyntaxError> {
    let illegal = || SyntaxError::IllegalParamList { pos: pos.clone() };
    let (name, params) = signature.split_first().ok_or_else(illegal)?;
    let name = name.as_symbol().cloned().ok_or_else(illegal)?;
    let params = match params {
        [Ast::Special(Special::Dot, _), Ast::Symbol(rest, _)] => Params::Dynamic {
            fixed: vec![],
            rest: rest.clone(),
        },
        _ => parse_params(&Ast::List(params.to_vec().into(), pos.clone()))?,
    };
    Ok((name, params))
}

fn define_syntax(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    require_args(operands.len(), 2)?;
    let name = syntax_node(&operands[0], env, pos)?
        .as_symbol()
        .cloned()
        .ok_or_else(|| Error::from(RuntimeError::new(RuntimeErrorKind::InvalidSyntax).at(pos)))?;
    let value = operands[1].eval_forced(env)?;
    if !matches!(value, Value::Macro(_)) {
        return Err(RuntimeErrorKind::TypeMismatch {
            kind: value.kind(),
            procedure: "define-syntax".into(),
        }
        .into());
    }
    env.define(name, value);
    Ok(Value::Unspecified)
}

fn syntax_rules(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    Macro::parse(operands, env, pos).map(|m| Value::Macro(Ref::new(m)))
}

fn quote(operands: &[Operand], _env: &EnvRef, _pos: &Position) -> Result<Value> {
    require_args(operands.len(), 1)?;
    match &operands[0] {
        Operand::Value(v) => Ok(v.clone()),
        op => match op.node() {
            Some(node) => interpreter::quote(node),
            None => Ok(Value::Unspecified),
        },
    }
}

fn if_(operands: &[Operand], env: &EnvRef, _pos: &Position) -> Result<Value> {
    require_at_least(operands.len(), 2)?;
    if operands.len() > 3 {
        return Err(RuntimeErrorKind::TooMuchArgs {
            required: 3,
            actual: operands.len(),
        }
        .into());
    }
    if operands[0].eval_forced(env)?.is_true() {
        operands[1].eval(env)
    } else {
        match operands.get(2) {
            Some(alternative) => alternative.eval(env),
            None => Ok(Value::Unspecified),
        }
    }
}

fn begin(operands: &[Operand], env: &EnvRef, _pos: &Position) -> Result<Value> {
    let mut result = Value::Unspecified;
    for op in operands {
        result = op.eval_forced(env)?;
    }
    Ok(result)
}

/// `(let ((name expr) ...) body ...)`. Initializers see the outer
/// environment only.
fn let_(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    require_at_least(operands.len(), 2)?;
    let invalid = || Error::from(RuntimeError::new(RuntimeErrorKind::InvalidSyntax).at(pos).in_env(env));

    let local = env.child();
    for binding in operands[0].children().ok_or_else(invalid)? {
        let parts = binding.children().ok_or_else(invalid)?;
        let (name, init) = match parts.as_slice() {
            [name, init] => (name, init),
            _ => return Err(invalid()),
        };
        let name = name.node().and_then(Ast::as_symbol).ok_or_else(invalid)?;
        let value = init.eval_forced(env)?;
        local.define(name.clone(), value);
    }

    let mut result = Value::Unspecified;
    for op in &operands[1..] {
        result = op.eval(&local)?;
    }
    Ok(result)
}

fn delay(operands: &[Operand], env: &EnvRef, _pos: &Position) -> Result<Value> {
    require_args(operands.len(), 1)?;
    Ok(operands[0].delay(env))
}
