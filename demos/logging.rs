//! # Logging Example: Optional Engine Instrumentation
//!
//! The `logging` Cargo feature turns on `trace`/`debug`/`warn`-level
//! `log` calls inside the update engine (tick entry/exit, transitions
//! taken, rejected configuration mutations). Without the feature none of
//! that code is even compiled in.
//!
//! Run with: `cargo run --example logging --features logging`

use reactive_fsm::{ConditionKind, Machine, TypeTag, Value};

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    let m = Machine::new(&[(0, "Pending"), (1, "Processing"), (2, "Done")]).unwrap();
    m.add_input("go", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("go", ConditionKind::Eq).unwrap();
    m.add_event("complete").unwrap();

    m.add_edge(0, 1, &["go"]).unwrap();
    m.add_edge(1, 2, &["complete"]).unwrap();

    // Rejected on purpose, to show a warn!-level log line: an unguarded
    // edge out of Pending would be reachable no matter what `go` is,
    // which makes it indistinguishable from the `go`-guarded one above.
    let _ = m.add_edge(0, 2, &[]);

    m.set_running(true);
    m.set_input("go", Value::Bool(true)).unwrap();
    m.queue_event("complete").unwrap();

    println!("settled at {}", m.get_state());
}
