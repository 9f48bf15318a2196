//! # reactive-fsm: a declarative, hierarchical finite state machine runtime
//!
//! A consumer describes, at construction time, a set of named states
//! (optionally grouped into hierarchical compound states), a set of typed
//! inputs, a set of typed outputs, a set of named discrete events, and a
//! set of guarded transitions. At runtime the consumer pushes input values
//! and queued events into the machine; the runtime reacts by evaluating
//! guards, performing transitions, and publishing output values plus
//! lifecycle notifications.
//!
//! The engine is single-threaded and cooperative: it never assumes a
//! concrete event loop, only a host-supplied [`Scheduler`] that can run a
//! closure "the next time the host is idle". [`ImmediateScheduler`] (the
//! default) runs it right away and drives the machine to quiescence inside
//! a single call; [`ManualScheduler`] defers it for callers (and this
//! crate's own tests) that want tick-by-tick control.
//!
//! ## Quick start
//!
//! ```rust
//! use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};
//!
//! let m = Machine::new(&[(0, "INIT"), (1, "A"), (2, "B")]).unwrap();
//! m.add_input("bool-in", TypeTag::Bool, Value::Bool(false)).unwrap();
//! m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
//! m.add_edge(0, 1, &[]).unwrap();
//! m.add_edge(1, 2, &["bool-in"]).unwrap();
//! m.add_edge(2, 1, &["!bool-in"]).unwrap();
//!
//! m.set_running(true);
//! m.set_input("bool-in", Value::Bool(true)).unwrap();
//! assert_eq!(m.get_state(), 2);
//! ```
//!
//! See `demos/` for larger walkthroughs (groups, orthogonal guards, events,
//! and optional logging).

mod atom;
mod condition;
mod dot;
mod engine;
mod error;
mod graph;
mod observer;
mod output;
mod scheduler;
mod transition;
mod value;

pub use condition::ConditionKind;
pub use dot::DOT_DIR_ENV_VAR;
pub use engine::Machine;
pub use error::{ConfigError, RuntimeError};
pub use graph::{StateId, ROOT};
pub use scheduler::{ImmediateScheduler, ManualScheduler, Scheduler};
pub use value::{TypeTag, Value};
