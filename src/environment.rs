pub use crate::envref::{EnvRef, EnvWeak};
use crate::builtins;
use crate::expression::{Closure, NativeFn, NativeSyntaxFn, Value};
use crate::number::Number;
use crate::symbol::Symbol;
use std::collections::HashMap;

#[derive(Clone)]
pub enum Entry {
    Value(Value),
    Closure(Closure<EnvWeak>),
}

/// One frame: a private name table plus an optional parent frame.
pub struct Environment {
    map: HashMap<Symbol, Entry>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new(parent: Option<EnvRef>) -> Environment {
        Environment {
            map: Default::default(),
            parent,
        }
    }

    pub fn lookup(&self, key: &Symbol) -> Option<Value> {
        match self.map.get(key) {
            None => self.parent.as_ref().and_then(|p| p.lookup(key)),
            Some(Entry::Value(value)) => Some(value.clone()),
            Some(Entry::Closure(closure)) => closure.upgrade().map(Value::Closure),
        }
    }

    /// Insert or overwrite a binding in this frame only.
    pub fn define(&mut self, key: impl Into<Symbol>, value: Value) {
        let entry = self.value_to_entry(value);
        self.map.insert(key.into(), entry);
    }

    // A closure stored in the frame it captured would keep that frame alive
    // forever, so it is stored weakly. The frame is alive whenever it is
    // looked up, hence the upgrade cannot fail there.
    fn value_to_entry(&self, value: Value) -> Entry {
        match value {
            Value::Closure(closure) if closure.env().as_ptr() == self as *const _ => {
                Entry::Closure(closure.downgrade())
            }
            value => Entry::Value(value),
        }
    }

    pub fn insert_native(&mut self, key: &'static str, func: NativeFn) {
        self.define(key, Value::Native(key, func));
    }

    pub fn insert_syntax(&mut self, key: &'static str, func: NativeSyntaxFn) {
        self.define(key, Value::NativeSyntax(key, func));
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut keys: Vec<_> = self.map.keys().map(Symbol::name).collect();
        keys.sort_unstable();
        write!(f, "Environment {{{}}}", keys.join(", "))
    }
}

/// Build the global frame: constants and every built-in procedure and
/// special form. Call once, before evaluating anything, and pass the handle
/// on explicitly.
pub fn default_env() -> EnvRef {
    let defenv: EnvRef = Environment::new(None).into();
    {
        let mut env = defenv.borrow_mut();
        env.define("PI", Value::Number(Number::Float(std::f64::consts::PI)));
        env.define("nil", Value::Nil);
        builtins::install(&mut env);
    }
    defenv
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expression::{Params, Ref};

    #[test]
    fn child_shadows_parent() {
        let parent: EnvRef = Environment::new(None).into();
        parent.define("x", 1.into());
        parent.define("y", 2.into());

        let child = parent.child();
        child.define("x", 10.into());

        assert_eq!(Some(Value::from(10)), child.lookup(&"x".into()));
        assert_eq!(Some(Value::from(2)), child.lookup(&"y".into()));
        assert_eq!(Some(Value::from(1)), parent.lookup(&"x".into()));
        assert_eq!(None, child.lookup(&"z".into()));
    }

    #[test]
    fn siblings_share_parent() {
        let parent: EnvRef = Environment::new(None).into();
        let a = parent.child();
        let b = parent.child();
        a.define("x", 1.into());
        parent.define("x", 0.into());
        assert_eq!(Some(Value::from(1)), a.lookup(&"x".into()));
        assert_eq!(Some(Value::from(0)), b.lookup(&"x".into()));
    }

    #[test]
    fn self_capturing_closure_does_not_leak_frame() {
        let env: EnvRef = Environment::new(None).into();
        let closure = Closure::new(Params::Fixed(vec![]), Ref::from(vec![]), env.clone());
        env.define("f", Value::Closure(closure));

        assert!(matches!(env.lookup(&"f".into()), Some(Value::Closure(_))));

        let weak = env.downgrade();
        drop(env);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn global_bindings() {
        let env = default_env();
        assert!(env.lookup(&"PI".into()).is_some());
        assert_eq!(Some(Value::Nil), env.lookup(&"nil".into()));
        for name in &["lambda", "cons", "car", "cdr", "+", "load"] {
            assert!(env.lookup(&(*name).into()).is_some(), "{} missing", name);
        }
    }
}
