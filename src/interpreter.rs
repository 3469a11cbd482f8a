use crate::environment::EnvRef;
use crate::errors::*;
use crate::expression::{Closure, Delayed, Params, Value};
use crate::lexer::QuoteKind;
use crate::sourcecode::Position;
use crate::symbol::{self, Symbol};
use crate::syntax::{Ast, Literal, Special};
use crate::tracer;

/// An argument as seen by the application protocol: either a piece of syntax
/// from the call site, a delayed fragment spliced in from a macro vararg, or a
/// plain value spliced in from a list.
#[derive(Clone)]
pub enum Operand<'a> {
    Node(&'a Ast),
    Deferred(Delayed),
    Value(Value),
}

impl<'a> Operand<'a> {
    /// The syntax behind this operand, if there is any.
    pub fn node(&self) -> Option<&Ast> {
        match self {
            Operand::Node(ast) => Some(ast),
            Operand::Deferred(d) => Some(&d.node),
            Operand::Value(_) => None,
        }
    }

    /// Evaluate without forcing the result.
    pub fn eval(&self, env: &EnvRef) -> Result<Value> {
        match self {
            Operand::Node(ast) => eval(ast, env),
            Operand::Deferred(d) => Ok(Value::Delayed(d.clone())),
            Operand::Value(v) => Ok(v.clone()),
        }
    }

    pub fn eval_forced(&self, env: &EnvRef) -> Result<Value> {
        self.eval(env).and_then(force)
    }

    /// Turn this operand into something that can be bound to a macro
    /// variable, remembering `env` as the place to evaluate it later.
    pub fn delay(&self, env: &EnvRef) -> Value {
        match self {
            Operand::Node(ast) => Value::Delayed(Delayed::new((*ast).clone(), env.clone())),
            Operand::Deferred(d) => Value::Delayed(d.clone()),
            Operand::Value(v) => v.clone(),
        }
    }

    /// Sub-operands of a list operand. Delayed fragments keep their
    /// environment.
    pub fn children(&self) -> Option<Vec<Operand>> {
        match self {
            Operand::Node(ast) => ast
                .as_list()
                .map(|items| items.iter().map(Operand::Node).collect()),
            Operand::Deferred(d) => d.node.as_list().map(|items| {
                items
                    .iter()
                    .map(|item| Operand::Deferred(Delayed::new(item.clone(), d.env.clone())))
                    .collect()
            }),
            Operand::Value(_) => None,
        }
    }
}

/// Resolve delayed objects until a plain value remains.
pub fn force(mut value: Value) -> Result<Value> {
    while let Value::Delayed(d) = value {
        value = eval(&d.node, &d.env)?;
    }
    Ok(value)
}

pub fn eval(ast: &Ast, env: &EnvRef) -> Result<Value> {
    match ast {
        Ast::Literal(literal, pos) => eval_literal(literal, pos),
        Ast::Symbol(s, pos) => env.lookup(s).ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::UnboundVariable(s.clone()))
                .at(pos)
                .in_env(env)
                .into()
        }),
        Ast::List(items, pos) => match items.split_first() {
            None => Ok(Value::Nil),
            Some((operator, args)) => {
                let op = eval(operator, env).and_then(force)?;
                let operands = collect_operands(args, env)?;
                apply(op, &operands, env, pos)
            }
        },
        Ast::Root(items) => {
            let (last, init) = items
                .split_last()
                .ok_or_else(|| Error::from(RuntimeErrorKind::EmptyProgram))?;
            for item in init {
                eval(item, env)?;
            }
            eval(last, env)
        }
        Ast::Special(Special::Dot, pos) => Err(SyntaxError::UnexpectedDot { pos: pos.clone() }.into()),
        Ast::Special(Special::Sharp, pos) => Err(SyntaxError::IllegalCharacter {
            ch: '#',
            pos: pos.clone(),
        }
        .into()),
    }
}

/// Evaluate a sequence of forms and return the value of the last one.
pub fn eval_body(body: &[Ast], env: &EnvRef) -> Result<Value> {
    let mut result = Value::Unspecified;
    for form in body {
        result = eval(form, env)?;
    }
    Ok(result)
}

fn eval_literal(literal: &Literal, pos: &Position) -> Result<Value> {
    Ok(match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Char(ch) => Value::Char(*ch),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Quote(QuoteKind::List, inner) => quote(inner)?,
        Literal::Quote(QuoteKind::Vector, inner) => match inner.as_list() {
            Some(items) => Value::vector(quote_items(items, pos)?),
            None => {
                return Err(SyntaxError::IllegalCharacter {
                    ch: '#',
                    pos: pos.clone(),
                }
                .into())
            }
        },
    })
}

/// Convert syntax into data, as `'datum` does.
pub fn quote(ast: &Ast) -> Result<Value> {
    match ast {
        Ast::Symbol(s, _) => Ok(Value::Symbol(s.clone())),
        Ast::Literal(Literal::Quote(QuoteKind::List, inner), _) => Ok(quote_form(quote(inner)?)),
        Ast::Literal(vector @ Literal::Quote(QuoteKind::Vector, _), pos) => {
            Ok(quote_form(eval_literal(vector, pos)?))
        }
        Ast::Literal(literal, pos) => eval_literal(literal, pos),
        Ast::List(items, pos) => quote_list(items, pos),
        Ast::Root(items) => quote_list(items, &Position::new(0, 0, None)),
        Ast::Special(Special::Dot, pos) => Err(SyntaxError::UnexpectedDot { pos: pos.clone() }.into()),
        Ast::Special(Special::Sharp, pos) => Err(SyntaxError::IllegalCharacter {
            ch: '#',
            pos: pos.clone(),
        }
        .into()),
    }
}

fn quote_form(datum: Value) -> Value {
    vec![Value::symbol(symbol::QUOTE), datum].into_iter().collect()
}

fn quote_items(items: &[Ast], pos: &Position) -> Result<Vec<Value>> {
    let mut result = vec![];
    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        match item {
            Ast::Special(Special::Sharp, _) => match iter.next() {
                Some(Ast::List(inner, inner_pos)) => {
                    result.push(Value::vector(quote_items(inner, inner_pos)?))
                }
                _ => {
                    return Err(SyntaxError::IllegalCharacter {
                        ch: '#',
                        pos: pos.clone(),
                    }
                    .into())
                }
            },
            Ast::Special(Special::Dot, dot_pos) => {
                return Err(SyntaxError::UnexpectedDot {
                    pos: dot_pos.clone(),
                }
                .into())
            }
            _ => result.push(quote(item)?),
        }
    }
    Ok(result)
}

fn quote_list(items: &[Ast], pos: &Position) -> Result<Value> {
    let dot = items.iter().position(|item| item.is_special(Special::Dot));
    match dot {
        None => Ok(quote_items(items, pos)?.into_iter().collect()),
        Some(i) if i > 0 && i + 2 == items.len() => {
            let head = quote_items(&items[..i], pos)?;
            let tail = quote(&items[i + 1])?;
            Ok(Value::list_with_tail(head, tail))
        }
        Some(i) => Err(SyntaxError::UnexpectedDot {
            pos: items[i].position().cloned().unwrap_or_else(|| pos.clone()),
        }
        .into()),
    }
}

/// Build the operand list of an application. An argument followed by the
/// ellipsis symbol is looked up and its list elements are spliced in.
fn collect_operands<'a>(args: &'a [Ast], env: &EnvRef) -> Result<Vec<Operand<'a>>> {
    let mut operands = Vec::with_capacity(args.len());
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        let splice = args
            .get(i + 1)
            .map_or(false, |next| next.is_named_symbol(symbol::ELLIPSIS));
        match (arg, splice) {
            (Ast::Symbol(_, pos), true) => {
                let list = eval(arg, env)?;
                for item in list.iter_list() {
                    operands.push(match item.map_err(|e| e.traced(pos, env))? {
                        Value::Delayed(d) => Operand::Deferred(d),
                        value => Operand::Value(value),
                    });
                }
                i += 2;
            }
            _ => {
                operands.push(Operand::Node(arg));
                i += 1;
            }
        }
    }
    Ok(operands)
}

/// Apply an evaluated operator to the operands of a call site at `pos`.
pub fn apply(op: Value, operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
    let result = match &op {
        Value::NativeSyntax(_, func) => func(operands, env, pos),
        Value::Native(_, func) => eval_args(operands, env).and_then(|args| func(&args)),
        Value::Closure(closure) => {
            eval_args(operands, env).and_then(|args| call_closure(closure, args, pos))
        }
        Value::Macro(m) => {
            tracer::trace_call(&tracer::CallRecord::macro_use(pos, operands.len()));
            m.expand(operands, env, pos)
        }
        other => Err(RuntimeError::new(RuntimeErrorKind::ApplyNonProcedure(other.to_string()))
            .at(pos)
            .in_env(env)
            .into()),
    };
    result.map_err(|e| e.traced(pos, env))
}

/// Evaluate and force each operand, left to right.
fn eval_args(operands: &[Operand], env: &EnvRef) -> Result<Vec<Value>> {
    operands.iter().map(|op| op.eval_forced(env)).collect()
}

pub fn call_closure(closure: &Closure<EnvRef>, args: Vec<Value>, pos: &Position) -> Result<Value> {
    let local = closure.env().child();
    tracer::trace_call(&tracer::CallRecord::closure_call(pos, args.len()));
    bind_params(closure.params(), args, &local, pos)?;
    eval_body(closure.body(), &local)
}

fn bind_params(params: &Params, args: Vec<Value>, env: &EnvRef, pos: &Position) -> Result<()> {
    let fail = |kind| -> Result<()> { Err(RuntimeError::new(kind).at(pos).in_env(env).into()) };
    match params {
        Params::Fixed(names) => {
            if args.len() < names.len() {
                return fail(RuntimeErrorKind::MissingArgs {
                    required: names.len(),
                    actual: args.len(),
                });
            }
            if args.len() > names.len() {
                return fail(RuntimeErrorKind::TooMuchArgs {
                    required: names.len(),
                    actual: args.len(),
                });
            }
            let mut frame = env.borrow_mut();
            for (name, arg) in names.iter().zip(args) {
                frame.define(name.clone(), arg);
            }
        }
        Params::Dynamic { fixed, rest } => {
            if args.len() < fixed.len() {
                return fail(RuntimeErrorKind::MissingArgsForDynamic {
                    at_least: fixed.len(),
                    actual: args.len(),
                });
            }
            let mut args = args.into_iter();
            let mut frame = env.borrow_mut();
            for name in fixed {
                if let Some(arg) = args.next() {
                    frame.define(name.clone(), arg);
                }
            }
            frame.define(rest.clone(), args.collect());
        }
    }
    Ok(())
}

/// Interpret the formal parameter syntax of a lambda.
pub fn parse_params(spec: &Ast) -> std::result::Result<Params, SyntaxError> {
    match spec {
        Ast::Symbol(rest, _) => Ok(Params::Dynamic {
            fixed: vec![],
            rest: rest.clone(),
        }),
        Ast::List(items, pos) => {
            let illegal = || SyntaxError::IllegalParamList { pos: pos.clone() };
            let mut fixed: Vec<Symbol> = vec![];
            let mut rest = None;
            let mut dot = false;
            for item in items.iter() {
                match item {
                    Ast::Special(Special::Dot, dot_pos) => {
                        if dot {
                            return Err(SyntaxError::UnexpectedDot {
                                pos: dot_pos.clone(),
                            });
                        }
                        dot = true;
                    }
                    Ast::Symbol(s, _) if !dot => fixed.push(s.clone()),
                    Ast::Symbol(s, _) if rest.is_none() => rest = Some(s.clone()),
                    _ => return Err(illegal()),
                }
            }
            match (dot, rest) {
                (false, _) => Ok(Params::Fixed(fixed)),
                (true, Some(rest)) if !fixed.is_empty() => Ok(Params::Dynamic { fixed, rest }),
                (true, _) => Err(illegal()),
            }
        }
        Ast::Special(Special::Dot, pos) => Err(SyntaxError::UnexpectedDot { pos: pos.clone() }),
        other => Err(SyntaxError::IllegalParamList {
            pos: other
                .position()
                .cloned()
                .unwrap_or_else(|| Position::new(0, 0, None)),
        }),
    }
}
