//! Crate-level behavioral tests for the literal end-to-end scenarios,
//! driven through the public API plus [`ManualScheduler`] for tick-by-tick
//! control.

use std::cell::RefCell;
use std::rc::Rc;

use reactive_fsm::{ConditionKind, ConfigError, Machine, ManualScheduler, TypeTag, Value};

fn counter() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str, i32, i32)) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log2 = log.clone();
    (log, move |name: &str, _new: i32, _old: i32| {
        log2.borrow_mut().push(name.to_string());
    })
}

fn count(log: &RefCell<Vec<String>>, name: &str) -> usize {
    log.borrow().iter().filter(|s| s.as_str() == name).count()
}

#[test]
fn scenario_s_simple_boolean_toggle() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
    m.add_input("bool-in", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
    m.add_edge(0, 1, &[]).unwrap();
    m.add_edge(1, 2, &["bool-in"]).unwrap();
    m.add_edge(2, 1, &["!bool-in"]).unwrap();

    let (enters, enter_cb) = counter();
    m.on_state_enter(enter_cb);
    let (exits, exit_cb) = counter();
    m.on_state_exit(exit_cb);

    m.set_running(true);
    m.set_input("bool-in", Value::Bool(false)).unwrap();
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 1);
    assert_eq!(count(&enters, "A"), 1);
    assert_eq!(count(&enters, "B"), 0);

    m.set_input("bool-in", Value::Bool(true)).unwrap();
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 2);
    assert_eq!(count(&enters, "A"), 1);
    assert_eq!(count(&enters, "B"), 1);
    assert_eq!(count(&exits, "A"), 1);

    m.set_input("bool-in", Value::Bool(false)).unwrap();
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 1);
    assert_eq!(count(&enters, "A"), 2);
    assert_eq!(count(&exits, "B"), 1);
}

#[test]
fn scenario_g_group_target() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
    let ab = m.create_group("ab", &[1, 2]).unwrap();
    m.add_input("bool-in", TypeTag::Bool, Value::Bool(true)).unwrap();
    m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
    m.add_edge(0, ab, &["bool-in"]).unwrap();
    m.add_edge(ab, 0, &["!bool-in"]).unwrap();

    m.set_running(true);
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 1, "leader of ab is A");
}

#[test]
fn scenario_o_orthogonal_conflict() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A")], ManualScheduler::new()).unwrap();
    m.add_input("bool", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.add_input("enum", TypeTag::new_enum("e", ["init", "a", "b"]), Value::Enum { type_name: std::sync::Arc::from("e"), ordinal: 0 }).unwrap();
    m.create_default_condition("bool", ConditionKind::Eq).unwrap();
    m.create_default_condition("enum", ConditionKind::Eq).unwrap();

    m.add_edge(0, 1, &["bool"]).unwrap();
    let rejected = m.add_edge(0, 1, &["a"]);
    assert!(matches!(rejected, Err(ConfigError::ConflictingTransition { .. })));

    m.add_edge(0, 1, &["b", "!bool"]).unwrap();
    let rejected = m.add_edge(0, 1, &["!a", "!bool"]);
    assert!(matches!(rejected, Err(ConfigError::ConflictingTransition { .. })));

    m.add_edge(0, 1, &["init", "!bool"]).unwrap();
}

#[test]
fn scenario_e_event() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
    m.add_input("bool", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("bool", ConditionKind::Eq).unwrap();
    m.add_event("event").unwrap();
    m.add_edge(0, 1, &["bool"]).unwrap();
    m.add_edge(1, 0, &["!bool"]).unwrap();
    m.add_edge(1, 2, &["event"]).unwrap();
    m.add_edge(2, 1, &[]).unwrap();

    m.set_running(true);
    m.scheduler().run_to_quiescence();
    m.set_input("bool", Value::Bool(true)).unwrap();
    m.queue_event("event").unwrap();

    assert!(m.scheduler().run_pending());
    assert_eq!(m.get_state(), 1, "tick 1: INIT -> A");
    assert!(m.scheduler().run_pending());
    assert_eq!(m.get_state(), 2, "tick 2: A -> B, event consumed");
    assert!(m.scheduler().run_pending());
    assert_eq!(m.get_state(), 1, "tick 3: B -> A, unguarded");
}

#[test]
fn scenario_p_output_pass_through() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
    m.add_input("f", TypeTag::Float, Value::Float(0.0)).unwrap();
    m.add_output("f", TypeTag::Float, Value::Float(0.0)).unwrap();
    m.add_input("bool", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("bool", ConditionKind::Eq).unwrap();

    m.map_output(1, "f", "f").unwrap();
    m.set_output(0, "f", Value::Float(10.0)).unwrap();
    assert_eq!(m.get_output("f").unwrap(), Value::Float(10.0));

    m.add_edge(0, 1, &[]).unwrap();
    m.add_edge(1, 2, &["bool"]).unwrap();
    m.add_edge(2, 1, &["!bool"]).unwrap();
    m.set_running(true);
    m.scheduler().run_to_quiescence();

    m.set_input("f", Value::Float(20.0)).unwrap();
    m.set_input("bool", Value::Bool(true)).unwrap();
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 2);
    assert_eq!(m.get_output("f").unwrap(), Value::Float(0.0), "B has no binding, falls back to default");

    m.set_input("bool", Value::Bool(false)).unwrap();
    m.scheduler().run_to_quiescence();
    assert_eq!(m.get_state(), 1);
    assert_eq!(m.get_output("f").unwrap(), Value::Float(20.0));

    m.set_input("f", Value::Float(30.0)).unwrap();
    assert_eq!(m.get_output("f").unwrap(), Value::Float(30.0));
}

#[test]
fn idempotent_set_input_emits_no_output_changed() {
    let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A")], ManualScheduler::new()).unwrap();
    m.add_input("f", TypeTag::Float, Value::Float(0.0)).unwrap();
    m.add_output("f", TypeTag::Float, Value::Float(0.0)).unwrap();
    m.map_output(0, "f", "f").unwrap();

    let changed = Rc::new(RefCell::new(0u32));
    let changed2 = changed.clone();
    m.on_output_changed(move |_, _, _| *changed2.borrow_mut() += 1);

    m.set_input("f", Value::Float(0.0)).unwrap();
    assert_eq!(*changed.borrow(), 0, "same value as the current default should not fire output-changed");
}

#[test]
fn immediate_scheduler_settles_synchronously() {
    let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
    m.add_input("go", TypeTag::Bool, Value::Bool(false)).unwrap();
    m.create_default_condition("go", ConditionKind::Eq).unwrap();
    m.add_edge(0, 1, &["go"]).unwrap();

    m.set_running(true);
    m.set_input("go", Value::Bool(true)).unwrap();
    assert_eq!(m.get_state(), 1, "the default scheduler settles inline, no pumping needed");
}
