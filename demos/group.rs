//! # Group Example - Compound States
//!
//! A "Playing" compound state groups two leaves, "Low" and "High" volume.
//! A transition that targets the group lands on its leader (the first
//! child), while a transition *inside* the group lets playback move
//! between volumes without leaving the compound state.
//!
//! Run with: `cargo run --example group`

use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};

fn main() {
    let m = Machine::new(&[(0, "Stopped"), (1, "Low"), (2, "High")]).unwrap();
    let playing = m.create_group("Playing", &[1, 2]).unwrap();

    m.add_input("play", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("play", ConditionKind::Eq).unwrap();
    m.add_input("loud", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("loud", ConditionKind::Eq).unwrap();

    m.add_edge(0, playing, &["play"]).unwrap();
    m.add_edge(playing, 0, &["!play"]).unwrap();
    m.add_edge(1, 2, &["loud"]).unwrap();
    m.add_edge(2, 1, &["!loud"]).unwrap();

    m.on_state_enter(|name, _new, _old| println!("  -> entered {name}"));
    m.on_state_exit(|name, _old, _new| println!("  -> exited {name}"));

    println!("=== Group Example ===\n");
    m.set_running(true);

    println!("play = true (enters the group at its leader, Low)");
    m.set_input("play", Value::Bool(true)).unwrap();

    println!("loud = true (moves within the group)");
    m.set_input("loud", Value::Bool(true)).unwrap();

    println!("play = false (leaves the group entirely)");
    m.set_input("play", Value::Bool(false)).unwrap();
}
