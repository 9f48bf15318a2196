//! # Event-Driven Example - Guards vs. Queued Events
//!
//! Demonstrates the update loop's priority rule: every tick first looks
//! for a conditional (guard-only) transition before it will even look at
//! the event queue, and at most one queued event is consumed per tick.
//!
//! Run with: `cargo run --example event_driven`

use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};

fn main() {
    let m = Machine::new(&[(0, "Idle"), (1, "Armed"), (2, "Firing")]).unwrap();
    m.add_input("armed", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("armed", ConditionKind::Eq).unwrap();
    m.add_event("trigger").unwrap();

    m.add_edge(0, 1, &["armed"]).unwrap();
    m.add_edge(1, 0, &["!armed"]).unwrap();
    m.add_edge(1, 2, &["trigger"]).unwrap();
    m.add_edge(2, 1, &[]).unwrap();

    m.on_state_enter(|name, _new, _old| println!("  -> entered {name}"));

    println!("=== Event-Driven Example ===\n");
    m.set_running(true);
    m.set_input("armed", Value::Bool(true)).unwrap();

    println!("queuing `trigger`");
    m.queue_event("trigger").unwrap();
    println!("settled at {}", m.get_state());
}
