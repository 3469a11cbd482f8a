use crate::environment::Environment;
use crate::expression::{Ref, Value, Weak};
use crate::symbol::Symbol;
use std::cell::{self, RefCell};

/// Shared handle to an environment frame.
#[derive(Clone)]
pub struct EnvRef(Ref<RefCell<Environment>>);

pub type EnvTmpRef<'a> = cell::Ref<'a, Environment>;
pub type EnvMutRef<'a> = cell::RefMut<'a, Environment>;

impl From<Environment> for EnvRef {
    fn from(env: Environment) -> Self {
        EnvRef(Ref::new(RefCell::new(env)))
    }
}

impl EnvRef {
    pub fn borrow(&self) -> EnvTmpRef {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> EnvMutRef {
        self.0.borrow_mut()
    }

    pub fn downgrade(&self) -> EnvWeak {
        EnvWeak(Ref::downgrade(&self.0))
    }

    pub fn as_ptr(&self) -> *const Environment {
        self.0.as_ptr()
    }

    pub fn ptr_eq(a: &EnvRef, b: &EnvRef) -> bool {
        Ref::ptr_eq(&a.0, &b.0)
    }

    /// New empty frame whose parent is `self`.
    pub fn child(&self) -> EnvRef {
        Environment::new(Some(self.clone())).into()
    }

    pub fn lookup(&self, key: &Symbol) -> Option<Value> {
        self.borrow().lookup(key)
    }

    pub fn define(&self, key: impl Into<Symbol>, value: Value) {
        self.borrow_mut().define(key, value)
    }
}

impl std::fmt::Debug for EnvRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#<environment {:p}>", self.as_ptr())
    }
}

#[derive(Clone, Default)]
pub struct EnvWeak(Weak<RefCell<Environment>>);

impl EnvWeak {
    pub fn upgrade(&self) -> Option<EnvRef> {
        self.0.upgrade().map(EnvRef)
    }
}
