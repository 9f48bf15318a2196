//! # Toggle Example - The Simplest State Machine
//!
//! The minimum needed to get a running machine: two states, a single
//! boolean input, and a pair of guarded edges that flip back and forth
//! on the input's value.
//!
//! Run with: `cargo run --example toggle`

use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};

fn main() {
    let m = Machine::new(&[(0, "Off"), (1, "On")]).unwrap();
    m.add_input("switch", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("switch", ConditionKind::Eq).unwrap();
    m.add_edge(0, 1, &["switch"]).unwrap();
    m.add_edge(1, 0, &["!switch"]).unwrap();

    m.on_state_enter(|name, _new, _old| println!("  -> entered {name}"));

    println!("=== Toggle Example ===\n");
    m.set_running(true);

    for flip in [true, false, true, false] {
        println!("switch = {flip}");
        m.set_input("switch", Value::Bool(flip)).unwrap();
    }
}
