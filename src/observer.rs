//! Observer notifications and ordering guarantees.
//!
//! Each notification kind gets its own registry rather than a single
//! tagged-enum bus: call sites already know which thing happened, and
//! consumers usually only care about one or two of the four kinds.
//!
//! Registries use interior mutability (`&self`, not `&mut self`) so that
//! `Observers` can live outside the engine's own `RefCell` (
//! "notification dispatch is split from the interior engine borrow").
//! Dispatch itself takes the callback list out of its `RefCell` before
//! invoking any callback and puts it back afterwards, so a callback that
//! calls back into the machine — which re-enters dispatch — never finds
//! the registry already borrowed.

use std::cell::RefCell;

use crate::value::Value;

type StateCb = Box<dyn FnMut(&str, i32, i32)>;
type InputCb = Box<dyn FnMut(&str, &Value)>;
type OutputCb = Box<dyn FnMut(&str, &Value, bool)>;

#[derive(Default)]
pub struct Observers {
    state_enter: RefCell<Vec<StateCb>>,
    state_exit: RefCell<Vec<StateCb>>,
    input_changed: RefCell<Vec<InputCb>>,
    output_changed: RefCell<Vec<OutputCb>>,
}

impl Observers {
    pub fn on_state_enter(&self, f: impl FnMut(&str, i32, i32) + 'static) {
        self.state_enter.borrow_mut().push(Box::new(f));
    }

    pub fn on_state_exit(&self, f: impl FnMut(&str, i32, i32) + 'static) {
        self.state_exit.borrow_mut().push(Box::new(f));
    }

    pub fn on_input_changed(&self, f: impl FnMut(&str, &Value) + 'static) {
        self.input_changed.borrow_mut().push(Box::new(f));
    }

    pub fn on_output_changed(&self, f: impl FnMut(&str, &Value, bool) + 'static) {
        self.output_changed.borrow_mut().push(Box::new(f));
    }

    pub(crate) fn notify_state_exit(&self, name: &str, old: i32, new: i32) {
        let mut cbs = self.state_exit.take();
        for f in cbs.iter_mut() {
            f(name, old, new);
        }
        self.state_exit.borrow_mut().splice(0..0, cbs);
    }

    pub(crate) fn notify_state_enter(&self, name: &str, new: i32, old: i32) {
        let mut cbs = self.state_enter.take();
        for f in cbs.iter_mut() {
            f(name, new, old);
        }
        self.state_enter.borrow_mut().splice(0..0, cbs);
    }

    pub(crate) fn notify_input_changed(&self, name: &str, value: &Value) {
        let mut cbs = self.input_changed.take();
        for f in cbs.iter_mut() {
            f(name, value);
        }
        self.input_changed.borrow_mut().splice(0..0, cbs);
    }

    pub(crate) fn notify_output_changed(&self, name: &str, value: &Value, state_change: bool) {
        let mut cbs = self.output_changed.take();
        for f in cbs.iter_mut() {
            f(name, value, state_change);
        }
        self.output_changed.borrow_mut().splice(0..0, cbs);
    }
}

/// One notification produced while processing a `set_input` call or a
/// tick, recorded so the engine's own borrow can be released before any
/// of them are dispatched.
pub enum Pending {
    StateExit { name: Box<str>, old: i32, new: i32 },
    StateEnter { name: Box<str>, new: i32, old: i32 },
    InputChanged { name: Box<str>, value: Value },
    OutputChanged { name: Box<str>, value: Value, state_change: bool },
}

impl Pending {
    pub(crate) fn dispatch(self, observers: &Observers) {
        match self {
            Pending::StateExit { name, old, new } => observers.notify_state_exit(&name, old, new),
            Pending::StateEnter { name, new, old } => observers.notify_state_enter(&name, new, old),
            Pending::InputChanged { name, value } => observers.notify_input_changed(&name, &value),
            Pending::OutputChanged { name, value, state_change } => {
                observers.notify_output_changed(&name, &value, state_change)
            }
        }
    }
}
