//! The host scheduling hook ("scheduler decoupling").
//!
//! The engine never assumes a concrete event loop. It only needs one
//! primitive — "invoke this closure the next time the host is idle,
//! returning a handle I can cancel" — and two implementations of it ship
//! with the crate: [`ImmediateScheduler`], which runs the tick right away
//! (and so, by simple recursion, drives the machine to quiescence inside
//! a single public call), and [`ManualScheduler`], which just remembers
//! the pending closure until the host calls [`ManualScheduler::run_pending`],
//! giving tests tick-by-tick control.

use std::cell::RefCell;

pub trait Scheduler {
    type Handle;

    fn schedule_idle(&self, tick: Box<dyn FnOnce()>) -> Self::Handle;
    fn cancel(&self, handle: Self::Handle);
}

/// Runs the scheduled closure synchronously, in-line. This is the
/// crate's default: a consumer who never touches the scheduler at all
/// gets a machine that settles to quiescence on every `set_input`/
/// `queue_event` call, exactly as if it had pumped a real idle loop to
/// completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    type Handle = ();

    fn schedule_idle(&self, tick: Box<dyn FnOnce()>) -> Self::Handle {
        tick();
    }

    fn cancel(&self, _handle: Self::Handle) {}
}

/// Remembers at most one pending tick closure; nothing runs until the
/// host explicitly pumps it. Used by this crate's own scenario tests to
/// assert notification ordering tick-by-tick, and a reasonable starting
/// point for a host that wants to integrate with its own idle loop.
#[derive(Default)]
pub struct ManualScheduler {
    pending: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the single pending tick, if any. Returns whether one ran.
    pub fn run_pending(&self) -> bool {
        let tick = self.pending.borrow_mut().take();
        match tick {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    /// Pumps until no tick is scheduled. Useful in tests that only care
    /// about the final, settled state.
    pub fn run_to_quiescence(&self) {
        while self.run_pending() {}
    }

    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl Scheduler for ManualScheduler {
    /// A single pending slot needs no real token; cancellation just
    /// clears it.
    type Handle = ();

    fn schedule_idle(&self, tick: Box<dyn FnOnce()>) -> Self::Handle {
        let mut pending = self.pending.borrow_mut();
        if pending.is_none() {
            *pending = Some(tick);
        }
    }

    fn cancel(&self, _handle: Self::Handle) {
        *self.pending.borrow_mut() = None;
    }
}
