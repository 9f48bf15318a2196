//! # Orthogonal Guards Example - Static Conflict Detection
//!
//! Two unrelated inputs (a boolean and a three-way enum) both gate
//! transitions out of the same state. `add_edge` proves, at configuration
//! time, that the accepted guards can never be simultaneously active —
//! a transition is rejected outright if it would race an existing one.
//!
//! Run with: `cargo run --example orthogonal_guards`

use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};

fn main() {
    let m = Machine::new(&[(0, "Idle"), (1, "Active")]).unwrap();
    m.add_input("armed", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.add_input(
        "mode",
        TypeTag::new_enum("mode", ["init", "manual", "auto"]),
        Value::Enum { type_name: "mode".into(), ordinal: 0 },
    )
    .unwrap();
    m.create_default_condition("armed", ConditionKind::Eq).unwrap();
    m.create_default_condition("mode", ConditionKind::Eq).unwrap();

    m.add_edge(0, 1, &["armed"]).unwrap();
    println!("added Idle -> Active on `armed`");

    match m.add_edge(0, 1, &["manual"]) {
        Ok(()) => println!("unexpectedly accepted a conflicting edge"),
        Err(e) => println!("rejected Idle -> Active on `manual`: {e}"),
    }

    m.add_edge(0, 1, &["auto", "!armed"]).unwrap();
    println!("added Idle -> Active on `auto & !armed` (disjoint from `armed`)");

    match m.add_edge(0, 1, &["!manual", "!armed"]) {
        Ok(()) => println!("unexpectedly accepted a conflicting edge"),
        Err(e) => println!("rejected Idle -> Active on `!manual & !armed`: {e}"),
    }

    m.set_running(true);
    m.set_input("mode", Value::Enum { type_name: "mode".into(), ordinal: 2 }).unwrap();
    println!("mode = auto, armed = false -> state {}", m.get_state());
}
