use crate::sourcecode::Position;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Hook notified by the evaluator on every closure and macro application.
pub trait Tracer {
    fn trace_call(&mut self, call: &CallRecord);

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallKind {
    Closure,
    Macro,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub kind: CallKind,
    pub position: Position,
    pub arg_count: usize,
}

impl CallRecord {
    pub fn closure_call(position: &Position, arg_count: usize) -> Self {
        CallRecord {
            kind: CallKind::Closure,
            position: position.clone(),
            arg_count,
        }
    }

    pub fn macro_use(position: &Position, arg_count: usize) -> Self {
        CallRecord {
            kind: CallKind::Macro,
            position: position.clone(),
            arg_count,
        }
    }
}

thread_local! {
    static TRACERS: RefCell<HashMap<usize, Box<dyn Tracer>>> = RefCell::new(HashMap::new());
    static NEXT_ID: Cell<usize> = Cell::new(0);
}

#[derive(Debug, Eq, PartialEq, Hash)]
pub struct TracerId(usize);

fn next_id() -> usize {
    NEXT_ID.with(|id| id.replace(id.get() + 1))
}

pub fn trace_call(call: &CallRecord) {
    TRACERS.with(|tracers| {
        for tracer in tracers.borrow_mut().values_mut() {
            tracer.trace_call(call);
        }
    });
}

pub fn install_tracer<T: Tracer + 'static>(tracer: T) -> TracerId {
    TRACERS.with(|tracers| {
        let mut tracers = tracers.borrow_mut();
        let id = next_id();
        tracers.insert(id, Box::new(tracer));
        TracerId(id)
    })
}

pub fn remove_tracer(id: TracerId) -> Option<Box<dyn Tracer>> {
    TRACERS.with(|tracers| tracers.borrow_mut().remove(&id.0))
}

/// Records every closure application in call order.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Vec<CallRecord>,
    macro_uses: usize,
}

impl CallLog {
    pub fn new() -> Self {
        CallLog::default()
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn macro_uses(&self) -> usize {
        self.macro_uses
    }
}

impl Tracer for CallLog {
    fn trace_call(&mut self, call: &CallRecord) {
        match call.kind {
            CallKind::Closure => self.calls.push(call.clone()),
            CallKind::Macro => self.macro_uses += 1,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
