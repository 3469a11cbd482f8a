use crate::envref::{EnvRef, EnvWeak};
use crate::errors::*;
use crate::interpreter::Operand;
use crate::macros::Macro;
use crate::number::Number;
use crate::sourcecode::Position;
use crate::symbol::Symbol;
use crate::syntax::Ast;
use std::cell::RefCell;
use std::collections::HashSet;
use std::iter::FromIterator;

pub use std::rc::{Rc as Ref, Weak};

pub type NativeFn = fn(&[Value]) -> Result<Value>;
pub type NativeSyntaxFn = fn(&[Operand], &EnvRef, &Position) -> Result<Value>;

#[derive(Debug)]
pub struct Pair {
    head: RefCell<Value>,
    tail: RefCell<Value>,
}

impl Pair {
    pub fn new(head: Value, tail: Value) -> Ref<Self> {
        Ref::new(Pair {
            head: RefCell::new(head),
            tail: RefCell::new(tail),
        })
    }

    pub fn head(&self) -> Value {
        self.head.borrow().clone()
    }

    pub fn tail(&self) -> Value {
        self.tail.borrow().clone()
    }

    pub fn set_head(&self, x: Value) {
        *self.head.borrow_mut() = x;
    }

    pub fn set_tail(&self, x: Value) {
        *self.tail.borrow_mut() = x;
    }
}

/// Formal parameters of a closure.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Fixed(Vec<Symbol>),
    Dynamic { fixed: Vec<Symbol>, rest: Symbol },
}

#[derive(Clone)]
pub struct Closure<E> {
    params: Ref<Params>,
    body: Ref<[Ast]>,
    env: E,
}

impl<E> Closure<E> {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn body(&self) -> &[Ast] {
        &self.body
    }

    pub fn env(&self) -> &E {
        &self.env
    }
}

impl Closure<EnvRef> {
    pub fn new(params: Params, body: Ref<[Ast]>, env: EnvRef) -> Self {
        Closure {
            params: Ref::new(params),
            body,
            env,
        }
    }

    pub fn downgrade(&self) -> Closure<EnvWeak> {
        Closure {
            params: self.params.clone(),
            body: self.body.clone(),
            env: self.env.downgrade(),
        }
    }

    pub fn eqv(&self, other: &Self) -> bool {
        Ref::ptr_eq(&self.params, &other.params) && EnvRef::ptr_eq(&self.env, &other.env)
    }
}

impl Closure<EnvWeak> {
    pub fn upgrade(&self) -> Option<Closure<EnvRef>> {
        Some(Closure {
            params: self.params.clone(),
            body: self.body.clone(),
            env: self.env.upgrade()?,
        })
    }
}

/// An unevaluated fragment together with the environment it must be
/// evaluated in.
#[derive(Clone)]
pub struct Delayed {
    pub node: Ast,
    pub env: EnvRef,
}

impl Delayed {
    pub fn new(node: Ast, env: EnvRef) -> Self {
        Delayed { node, env }
    }
}

#[derive(Clone)]
pub enum Value {
    Unspecified,
    Nil,
    Boolean(bool),
    Char(char),
    String(Ref<String>),
    Symbol(Symbol),
    Number(Number),
    Pair(Ref<Pair>),
    Vector(Ref<RefCell<Vec<Value>>>),
    Closure(Closure<EnvRef>),
    Macro(Ref<Macro>),
    Delayed(Delayed),
    Native(&'static str, NativeFn),
    NativeSyntax(&'static str, NativeSyntaxFn),
}

/// Coarse runtime type of a value, used by argument guards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    Unspecified,
    String,
    Char,
    Boolean,
    NaN,
    Int,
    Fraction,
    Float,
    Infinite,
    Complex,
    Symbol,
    Pair,
    Nil,
    Procedure,
    Vector,
    Syntax,
    Delayed,
}

impl Kind {
    pub fn is_number(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Fraction | Kind::Float | Kind::Infinite | Kind::NaN | Kind::Complex
        )
    }

    pub fn is_real(self) -> bool {
        self.is_number() && self != Kind::Complex
    }

    pub fn is_pair(self) -> bool {
        self == Kind::Pair
    }

    pub fn is_vector(self) -> bool {
        self == Kind::Vector
    }

    pub fn is_any(self) -> bool {
        true
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Kind::Unspecified => "Unspecified",
            Kind::String => "String",
            Kind::Char => "Char",
            Kind::Boolean => "Boolean",
            Kind::NaN => "NaN",
            Kind::Int => "Int",
            Kind::Fraction => "Fraction",
            Kind::Float => "Float",
            Kind::Infinite => "Inf",
            Kind::Complex => "Complex",
            Kind::Symbol => "Symbol",
            Kind::Pair => "Pair",
            Kind::Nil => "Nil",
            Kind::Procedure => "Procedure",
            Kind::Vector => "Vector",
            Kind::Syntax => "Syntax",
            Kind::Delayed => "Delayed",
        };
        write!(f, "{}", name)
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Unspecified => Kind::Unspecified,
            Value::Nil => Kind::Nil,
            Value::Boolean(_) => Kind::Boolean,
            Value::Char(_) => Kind::Char,
            Value::String(_) => Kind::String,
            Value::Symbol(_) => Kind::Symbol,
            Value::Number(Number::Integer(_)) => Kind::Int,
            Value::Number(Number::Fraction(_)) => Kind::Fraction,
            Value::Number(Number::Float(_)) => Kind::Float,
            Value::Number(Number::Complex(_)) => Kind::Complex,
            Value::Number(Number::NaN) => Kind::NaN,
            Value::Number(Number::Infinite) => Kind::Infinite,
            Value::Pair(_) => Kind::Pair,
            Value::Vector(_) => Kind::Vector,
            Value::Closure(_) | Value::Native(..) => Kind::Procedure,
            Value::Macro(_) | Value::NativeSyntax(..) => Kind::Syntax,
            Value::Delayed(_) => Kind::Delayed,
        }
    }

    pub fn cons(head: impl Into<Value>, tail: impl Into<Value>) -> Self {
        Value::Pair(Pair::new(head.into(), tail.into()))
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Ref::new(RefCell::new(items)))
    }

    /// Build a proper list, or an improper one ending in `last`.
    pub fn list_with_tail(items: Vec<Value>, last: Value) -> Self {
        items
            .into_iter()
            .rev()
            .fold(last, |tail, head| Value::cons(head, tail))
    }

    pub fn iter_list(&self) -> ListIterator {
        ListIterator {
            next_pair: self.clone(),
        }
    }

    pub fn is_true(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Ref<Pair>> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    /// Identity comparison. Numbers, characters, booleans and symbols compare
    /// by value, everything else by reference.
    pub fn eqv(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Unspecified, Unspecified) | (Nil, Nil) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (String(a), String(b)) => Ref::ptr_eq(a, b),
            (Symbol(a), Symbol(b)) => a == b,
            (Number(a), Number(b)) => a.eqv(b),
            (Pair(a), Pair(b)) => Ref::ptr_eq(a, b),
            (Vector(a), Vector(b)) => Ref::ptr_eq(a, b),
            (Closure(a), Closure(b)) => a.eqv(b),
            (Macro(a), Macro(b)) => Ref::ptr_eq(a, b),
            (Native(a, _), Native(b, _)) => a == b,
            (NativeSyntax(a, _), NativeSyntax(b, _)) => a == b,
            _ => false,
        }
    }

    fn write(&self, f: &mut std::fmt::Formatter, seen: &mut HashSet<*const ()>) -> std::fmt::Result {
        match self {
            Value::Unspecified => write!(f, "#<unspecified>"),
            Value::Nil => write!(f, "()"),
            Value::Boolean(true) => write!(f, "#t"),
            Value::Boolean(false) => write!(f, "#f"),
            Value::Char(ch) => write!(f, "#\\{}", ch),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Pair(_) => self.write_list(f, seen),
            Value::Vector(items) => {
                let ptr = Ref::as_ptr(items) as *const ();
                if !seen.insert(ptr) {
                    return write!(f, "...");
                }
                let result = write!(f, "#(").and_then(|_| {
                    for (i, x) in items.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        x.write(f, seen)?;
                    }
                    write!(f, ")")
                });
                seen.remove(&ptr);
                result
            }
            Value::Closure(_) | Value::Native(..) => write!(f, "#<procedure>"),
            Value::Macro(_) | Value::NativeSyntax(..) => write!(f, "#<macro>"),
            Value::Delayed(_) => write!(f, "#<delayed>"),
        }
    }

    /// Pairs and vectors already on the path being printed are shown as `...`,
    /// so cyclic structures print in finite time.
    fn write_list(&self, f: &mut std::fmt::Formatter, seen: &mut HashSet<*const ()>) -> std::fmt::Result {
        let mut entered = vec![];
        let mut cursor = self.clone();
        write!(f, "(")?;
        let mut first = true;
        let result = loop {
            match cursor {
                Value::Nil => break Ok(()),
                Value::Pair(pair) => {
                    let ptr = Ref::as_ptr(&pair) as *const ();
                    if !seen.insert(ptr) {
                        break write!(f, " ...");
                    }
                    entered.push(ptr);
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    pair.head().write(f, seen)?;
                    cursor = pair.tail();
                }
                other => {
                    write!(f, " . ")?;
                    break other.write(f, seen);
                }
            }
        };
        for ptr in entered {
            seen.remove(&ptr);
        }
        result?;
        write!(f, ")")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.write(f, &mut HashSet::new())
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(Number::float(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Ref::new(s.into()))
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::list_with_tail(iter.into_iter().collect(), Value::Nil)
    }
}

/// Structural equality for tests and `Ast`-free comparisons. Procedures and
/// other reference types compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => {
                Ref::ptr_eq(a, b) || (a.head() == b.head() && a.tail() == b.tail())
            }
            (Value::Vector(a), Value::Vector(b)) => {
                Ref::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => self.eqv(other),
        }
    }
}

/// Walks the pairs of a list. Yields an error item when the chain ends in
/// something other than the empty list.
pub struct ListIterator {
    next_pair: Value,
}

impl Iterator for ListIterator {
    type Item = Result<Value>;
    fn next(&mut self) -> Option<Self::Item> {
        let (head, tail) = match &self.next_pair {
            Value::Nil => return None,
            Value::Pair(pair) => (pair.head(), pair.tail()),
            other => {
                let kind = other.kind();
                self.next_pair = Value::Nil;
                return Some(Err(RuntimeErrorKind::TypeMismatch {
                    kind,
                    procedure: "list".into(),
                }
                .into()));
            }
        };
        self.next_pair = tail;
        Some(Ok(head))
    }
}
