//! The machine itself: wiring the state graph, condition algebra, output
//! resolver, event queue and observer surface into the public API.
//!
//! `Machine` is split across several independently-borrowable cells rather
//! than one big `RefCell<Machine>`:
//!
//! - `inner: Rc<RefCell<Inner>>` — the engine state proper (graph, inputs,
//!   outputs, conditions, event queue).
//! - `observers: Rc<Observers>` — self-interior-mutable, lives outside
//!   `inner` so a notification callback can call back into `set_input`
//!   without finding `inner` already borrowed.
//! - `scheduler`, `scheduled`, `handle` — the coalescing "at most one tick
//!   outstanding" bookkeeping, also outside `inner` since the scheduler's
//!   `'static` closures must be able to re-borrow `inner` later.
//!
//! A tick closure captures clones of all of these (cheap `Rc` bumps) so it
//! can run at an arbitrary point in the future without borrowing `self`.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::atom::{AtomId, Interner};
use crate::condition::{Condition, ConditionKind};
use crate::error::{ConfigError, RuntimeError};
use crate::graph::{StateGraph, StateId, ROOT};
use crate::observer::{Observers, Pending};
use crate::output::{resolve_outputs, OutputCell, OutputsRef};
use crate::scheduler::{ImmediateScheduler, Scheduler};
use crate::transition::{self, Transition};
use crate::value::{TypeTag, Value};

#[cfg(feature = "logging")]
macro_rules! engine_trace { ($($arg:tt)*) => { log::trace!($($arg)*); }; }
#[cfg(not(feature = "logging"))]
macro_rules! engine_trace { ($($arg:tt)*) => {}; }

#[cfg(feature = "logging")]
macro_rules! engine_debug { ($($arg:tt)*) => { log::debug!($($arg)*); }; }
#[cfg(not(feature = "logging"))]
macro_rules! engine_debug { ($($arg:tt)*) => {}; }

#[cfg(feature = "logging")]
macro_rules! engine_warn { ($($arg:tt)*) => { log::warn!($($arg)*); }; }
#[cfg(not(feature = "logging"))]
macro_rules! engine_warn { ($($arg:tt)*) => {}; }

struct InputSlot {
    name: Rc<str>,
    type_tag: TypeTag,
    cell: OutputCell,
}

struct OutputDecl {
    name: Rc<str>,
    type_tag: TypeTag,
}

struct Inner {
    graph: StateGraph,
    interner: Interner,
    declared_names: HashSet<Box<str>>,
    inputs: Vec<InputSlot>,
    input_names: std::collections::HashMap<Box<str>, usize>,
    outputs: Vec<OutputDecl>,
    output_names: std::collections::HashMap<Box<str>, usize>,
    conditions: Vec<Condition>,
    event_atoms: HashSet<AtomId>,
    event_names: std::collections::HashMap<Box<str>, AtomId>,
    event_queue: std::collections::VecDeque<AtomId>,
    current_state: StateId,
    outputs_current: Vec<OutputCell>,
    running: bool,
}

impl Inner {
    fn compute_active_conditions(&self) -> Vec<AtomId> {
        let mut atoms = Vec::new();
        for cond in &self.conditions {
            let value = self.inputs[cond.input_index].cell.borrow();
            atoms.extend(cond.expand_active(&value));
        }
        crate::atom::sort_dedup(&mut atoms);
        atoms
    }

    fn recompute_outputs_diff(&self, leaf: StateId) -> (Vec<OutputCell>, Vec<(usize, Value)>) {
        let mut chain = vec![leaf];
        chain.extend(self.graph.ancestors(leaf));
        let resolved = resolve_outputs(
            self.outputs.len(),
            chain.iter().map(|&id| {
                let node = self.graph.get(id).expect("ancestor chain state must exist");
                (id, OutputsRef(&node.outputs))
            }),
        );
        let mut changed = Vec::new();
        for (i, cell) in resolved.iter().enumerate() {
            let same = self
                .outputs_current
                .get(i)
                .map(|old| Rc::ptr_eq(old, cell))
                .unwrap_or(false);
            if !same {
                changed.push((i, cell.borrow().clone()));
            }
        }
        (resolved, changed)
    }

    fn recompute_outputs_silent(&mut self) {
        let (resolved, _) = self.recompute_outputs_diff(self.current_state);
        self.outputs_current = resolved;
    }

    fn perform_transition(&mut self, nominal_target: StateId, pendings: &mut Vec<Pending>) {
        let real_target = self.graph.resolve_real(nominal_target);
        if real_target == self.current_state {
            return;
        }
        let old_id = self.current_state;
        let old_name = self
            .graph
            .name_of(old_id)
            .expect("current state must exist")
            .to_string();
        engine_debug!("transition: {} ({}) -> real {}", old_name, old_id, real_target);
        pendings.push(Pending::StateExit {
            name: old_name.into_boxed_str(),
            old: old_id,
            new: real_target,
        });

        self.current_state = real_target;

        let (resolved, changed) = self.recompute_outputs_diff(real_target);
        for (idx, value) in changed {
            let name = self.outputs[idx].name.clone();
            pendings.push(Pending::OutputChanged {
                name: name.as_ref().into(),
                value,
                state_change: true,
            });
        }
        self.outputs_current = resolved;

        let nominal_name = self
            .graph
            .name_of(nominal_target)
            .expect("nominal target must exist")
            .to_string();
        pendings.push(Pending::StateEnter {
            name: nominal_name.into_boxed_str(),
            new: nominal_target,
            old: old_id,
        });
    }

    /// One tick: at most one conditional transition, else at most one
    /// queued event. Returns the notifications produced and
    /// whether another tick should be requested.
    fn run_tick(&mut self) -> (Vec<Pending>, bool) {
        engine_trace!("tick: entering at state {}", self.current_state);
        let mut pendings = Vec::new();
        let active = self.compute_active_conditions();

        if let Some((_src, t)) = transition::find_applicable(&self.graph, self.current_state, None, &active) {
            let target = t.target;
            self.perform_transition(target, &mut pendings);
            engine_trace!("tick: conditional transition taken, rescheduling");
            return (pendings, true);
        }

        let mut transitioned = false;
        if let Some(event) = self.event_queue.pop_front() {
            if let Some((_src, t)) =
                transition::find_applicable(&self.graph, self.current_state, Some(event), &active)
            {
                let target = t.target;
                self.perform_transition(target, &mut pendings);
                transitioned = true;
            }
        }

        let reschedule = transitioned || !self.event_queue.is_empty();
        engine_trace!("tick: exiting, reschedule={}", reschedule);
        (pendings, reschedule)
    }
}

/// A declarative, hierarchical finite state machine, driven by a host-
/// supplied [`Scheduler`]. Defaults to [`ImmediateScheduler`], which
/// settles every call to quiescence synchronously.
pub struct Machine<S: Scheduler = ImmediateScheduler> {
    inner: Rc<RefCell<Inner>>,
    observers: Rc<Observers>,
    scheduler: Rc<S>,
    scheduled: Rc<Cell<bool>>,
    handle: Rc<RefCell<Option<S::Handle>>>,
}

impl<S: Scheduler> Clone for Machine<S> {
    fn clone(&self) -> Self {
        Machine {
            inner: self.inner.clone(),
            observers: self.observers.clone(),
            scheduler: self.scheduler.clone(),
            scheduled: self.scheduled.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl Machine<ImmediateScheduler> {
    /// Builds a machine driven by [`ImmediateScheduler`]: every
    /// `set_input`/`queue_event` call settles to quiescence before
    /// returning.
    pub fn new(states: &[(StateId, &str)]) -> Result<Self, ConfigError> {
        Self::with_scheduler(states, ImmediateScheduler)
    }
}

impl<S: Scheduler + 'static> Machine<S> {
    /// Builds a machine over `states` (the state enumeration, value 0
    /// mandatory) driven by a caller-supplied scheduler.
    pub fn with_scheduler(states: &[(StateId, &str)], scheduler: S) -> Result<Self, ConfigError> {
        if !states.iter().any(|&(id, _)| id == 0) {
            return Err(ConfigError::MissingInitialState);
        }
        for &(id, _) in states {
            if id < 0 {
                return Err(ConfigError::NegativeEnumValue(id));
            }
        }

        let mut graph = StateGraph::new();
        for &(id, name) in states {
            graph.add_leaf(id, name);
        }

        let inner = Inner {
            graph,
            interner: Interner::new(),
            declared_names: HashSet::new(),
            inputs: Vec::new(),
            input_names: std::collections::HashMap::new(),
            outputs: Vec::new(),
            output_names: std::collections::HashMap::new(),
            conditions: Vec::new(),
            event_atoms: HashSet::new(),
            event_names: std::collections::HashMap::new(),
            event_queue: std::collections::VecDeque::new(),
            current_state: 0,
            outputs_current: Vec::new(),
            running: false,
        };

        Ok(Machine {
            inner: Rc::new(RefCell::new(inner)),
            observers: Rc::new(Observers::default()),
            scheduler: Rc::new(scheduler),
            scheduled: Rc::new(Cell::new(false)),
            handle: Rc::new(RefCell::new(None)),
        })
    }

    /// Claims `name` in the shared atom/event symbol space ("Event
    /// names share the global symbol space with condition atoms"). Input
    /// and output names are checked separately, against their own tables —
    /// a boolean input's default condition atom is, by design, the input's
    /// own name, so inputs can't share this set with atoms.
    fn claim_atom_or_event_name(inner: &mut Inner, name: &str) -> Result<(), ConfigError> {
        if !inner.declared_names.insert(Box::from(name)) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Declares a named input of `type_tag`, initialized to `default`.
    pub fn add_input(&self, name: &str, type_tag: TypeTag, default: Value) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if inner.input_names.contains_key(name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        if !type_tag.accepts(&default) {
            return Err(ConfigError::InputTypeMismatch {
                input: name.to_string(),
                expected: type_tag.kind_name(),
                actual: default.kind_name(),
            });
        }
        let cell = Rc::new(RefCell::new(default));
        let idx = inner.inputs.len();
        inner.inputs.push(InputSlot {
            name: Rc::from(name),
            type_tag,
            cell,
        });
        inner.input_names.insert(Box::from(name), idx);
        Ok(())
    }

    /// Declares a named output of `type_tag`. The root "all" state is
    /// immediately given an owned `default` so output resolution never
    /// dead-ends (the "output coverage" invariant).
    pub fn add_output(&self, name: &str, type_tag: TypeTag, default: Value) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if inner.output_names.contains_key(name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        if !type_tag.accepts(&default) {
            return Err(ConfigError::OutputTypeMismatch {
                output: name.to_string(),
                expected: type_tag.kind_name(),
                actual: default.kind_name(),
            });
        }
        let idx = inner.outputs.len();
        let default_cell: OutputCell = Rc::new(RefCell::new(default));
        inner.outputs.push(OutputDecl {
            name: Rc::from(name),
            type_tag,
        });
        inner.output_names.insert(Box::from(name), idx);

        for node in inner.graph.iter_mut() {
            node.outputs.push(None);
        }
        let root = inner.graph.get_mut(ROOT).expect("root state always exists");
        root.outputs[idx] = Some(default_cell.clone());
        root.owned_values.push(default_cell);

        inner.recompute_outputs_silent();
        Ok(())
    }

    /// Declares a named event. Events share the atom symbol space.
    pub fn add_event(&self, name: &str) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        Self::claim_atom_or_event_name(&mut inner, name)?;
        let id = inner.interner.intern(name);
        inner.event_atoms.insert(id);
        inner.event_names.insert(Box::from(name), id);
        Ok(())
    }

    /// Appends `name` to the FIFO event queue and requests a tick.
    pub fn queue_event(&self, name: &str) -> Result<(), RuntimeError> {
        {
            let mut inner = self.inner.borrow_mut();
            let id = *inner
                .event_names
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownEvent(name.to_string()))?;
            inner.event_queue.push_back(id);
        }
        self.request_tick();
        Ok(())
    }

    /// Declares an input condition over `input_name` with explicit
    /// `labels`, `kind`, and a `reader` that converts a live value into the
    /// index of the currently active label (`None` for the boolean
    /// "inactive" case).
    pub fn create_condition(
        &self,
        input_name: &str,
        labels: &[&str],
        kind: ConditionKind,
        reader: impl Fn(&Value) -> Option<usize> + 'static,
    ) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        let input_index = *inner
            .input_names
            .get(input_name)
            .ok_or_else(|| ConfigError::UnknownInput(input_name.to_string()))?;

        let mut positive = Vec::with_capacity(labels.len());
        let mut negative = Vec::with_capacity(labels.len());
        for &label in labels {
            Self::claim_atom_or_event_name(&mut inner, label)?;
            positive.push(inner.interner.intern(label));
            let neg = match kind {
                ConditionKind::Eq => format!("!{label}"),
                ConditionKind::Geq => format!("<{label}"),
                ConditionKind::Leq => format!(">{label}"),
            };
            negative.push(inner.interner.intern(&neg));
        }

        inner.conditions.push(Condition {
            input_index,
            kind,
            positive,
            negative,
            reader: Box::new(reader),
        });
        Ok(())
    }

    /// Synthesizes labels from `input_name`'s declared type: one label per
    /// enum member, or the input's own name for a boolean.
    pub fn create_default_condition(&self, input_name: &str, kind: ConditionKind) -> Result<(), ConfigError> {
        let (type_tag, owned_name) = {
            let inner = self.inner.borrow();
            let idx = *inner
                .input_names
                .get(input_name)
                .ok_or_else(|| ConfigError::UnknownInput(input_name.to_string()))?;
            (inner.inputs[idx].type_tag.clone(), input_name.to_string())
        };

        match type_tag {
            TypeTag::Bool => {
                self.create_condition(input_name, &[&owned_name], kind, |v| {
                    if v.as_bool().unwrap_or(false) {
                        Some(0)
                    } else {
                        None
                    }
                })
            }
            TypeTag::Enum { variants, .. } => {
                let labels: Vec<&str> = variants.iter().map(|v| v.as_ref()).collect();
                self.create_condition(input_name, &labels, kind, |v| v.as_enum_ordinal().map(|o| o as usize))
            }
            other => Err(ConfigError::InputTypeMismatch {
                input: owned_name,
                expected: "bool or enum",
                actual: other.kind_name(),
            }),
        }
    }

    /// Allocates a compound group over `children`, which must currently
    /// share a parent.
    pub fn create_group(&self, name: &str, children: &[StateId]) -> Result<StateId, ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if children.is_empty() {
            return Err(ConfigError::EmptyGroup(name.to_string()));
        }
        for &child in children {
            if !inner.graph.contains(child) {
                return Err(ConfigError::UnknownState(child));
            }
        }
        inner
            .graph
            .create_group(name, children)
            .ok_or_else(|| ConfigError::MismatchedGroupParents { name: name.to_string() })
    }

    /// Adds a guarded edge from `src` to `tgt`. Each token in `tokens` is
    /// either a known condition atom or a known event name (at most one);
    /// `src = -1` (`ROOT`) wires the edge from any leaf.
    pub fn add_edge(&self, src: StateId, tgt: StateId, tokens: &[&str]) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.graph.contains(src) {
            return Err(ConfigError::UnknownState(src));
        }
        if !inner.graph.contains(tgt) {
            return Err(ConfigError::UnknownState(tgt));
        }

        let mut conditions = Vec::new();
        let mut event = None;
        for &token in tokens {
            let Some(id) = inner.interner.get(token) else {
                return Err(ConfigError::UnknownEdgeToken(token.to_string()));
            };
            if inner.event_atoms.contains(&id) {
                if event.replace(id).is_some() {
                    return Err(ConfigError::DuplicateEventOnEdge(src, tgt));
                }
            } else if Self::is_condition_atom(&inner, id) {
                conditions.push(id);
            } else {
                return Err(ConfigError::UnknownEdgeToken(token.to_string()));
            }
        }
        crate::atom::sort_dedup(&mut conditions);

        let contra = {
            let conditions_ref = &inner.conditions;
            transition::contradiction_set(
                |atom| {
                    for cond in conditions_ref {
                        if let Some(idx) = cond.positive.iter().position(|&a| a == atom) {
                            return cond.expand_no_overlap(idx, true);
                        }
                        if let Some(idx) = cond.negative.iter().position(|&a| a == atom) {
                            return cond.expand_no_overlap(idx, false);
                        }
                    }
                    Vec::new()
                },
                &conditions,
            )
        };

        if let Some(conflict) = transition::find_conflict(&inner.graph, src, event, &contra) {
            engine_warn!("rejected edge {} -> {}: conflicts with existing transition at {}", src, tgt, conflict);
            return Err(ConfigError::ConflictingTransition { src, tgt, conflict });
        }

        inner.graph.get_mut(src).expect("checked above").transitions.push(Transition {
            target: tgt,
            event,
            conditions,
        });
        Ok(())
    }

    fn is_condition_atom(inner: &Inner, id: AtomId) -> bool {
        inner
            .conditions
            .iter()
            .any(|c| c.positive.contains(&id) || c.negative.contains(&id))
    }

    /// Binds `state`'s `output_name` slot to alias `input_name`'s live
    /// value.
    pub fn map_output(&self, state: StateId, output_name: &str, input_name: &str) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.graph.contains(state) {
            return Err(ConfigError::UnknownState(state));
        }
        let out_idx = *inner
            .output_names
            .get(output_name)
            .ok_or_else(|| ConfigError::UnknownOutput(output_name.to_string()))?;
        let in_idx = *inner
            .input_names
            .get(input_name)
            .ok_or_else(|| ConfigError::UnknownInput(input_name.to_string()))?;

        let out_type = inner.outputs[out_idx].type_tag.clone();
        let in_type = inner.inputs[in_idx].type_tag.clone();
        if !out_type.compatible(&in_type) {
            return Err(ConfigError::OutputTypeMismatch {
                output: output_name.to_string(),
                expected: out_type.kind_name(),
                actual: in_type.kind_name(),
            });
        }

        let cell = inner.inputs[in_idx].cell.clone();
        inner.graph.get_mut(state).expect("checked above").outputs[out_idx] = Some(cell);
        drop(inner);
        self.maybe_recompute_live(state);
        Ok(())
    }

    /// Binds `state`'s `output_name` slot to an owned constant `value`.
    pub fn set_output(&self, state: StateId, output_name: &str, value: Value) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.graph.contains(state) {
            return Err(ConfigError::UnknownState(state));
        }
        let out_idx = *inner
            .output_names
            .get(output_name)
            .ok_or_else(|| ConfigError::UnknownOutput(output_name.to_string()))?;
        let out_type = inner.outputs[out_idx].type_tag.clone();
        if !out_type.accepts(&value) {
            return Err(ConfigError::OutputTypeMismatch {
                output: output_name.to_string(),
                expected: out_type.kind_name(),
                actual: value.kind_name(),
            });
        }

        let cell: OutputCell = Rc::new(RefCell::new(value));
        {
            let node = inner.graph.get_mut(state).expect("checked above");
            node.outputs[out_idx] = Some(cell.clone());
            node.owned_values.push(cell);
        }
        drop(inner);
        self.maybe_recompute_live(state);
        Ok(())
    }

    /// Recomputes and diffs the current output vector, but only when
    /// `state` is the literal id of the currently active real leaf
    /// (DESIGN.md Open Question 2).
    fn maybe_recompute_live(&self, state: StateId) {
        let pendings = {
            let mut inner = self.inner.borrow_mut();
            if inner.current_state != state {
                return;
            }
            let (resolved, changed) = inner.recompute_outputs_diff(state);
            let mut pendings = Vec::new();
            for (idx, value) in changed {
                let name = inner.outputs[idx].name.clone();
                pendings.push(Pending::OutputChanged {
                    name: name.as_ref().into(),
                    value,
                    state_change: true,
                });
            }
            inner.outputs_current = resolved;
            pendings
        };
        self.dispatch_pendings(pendings);
    }

    /// Writes `value` into `name`, emits `input-changed` plus any aliased
    /// `output-changed(state_change=false)`, and requests a tick.
    pub fn set_input(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let pendings = {
            let inner = self.inner.borrow_mut();
            let idx = *inner
                .input_names
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownInput(name.to_string()))?;
            debug_assert!(
                inner.inputs[idx].type_tag.accepts(&value),
                "set_input(\"{name}\", ..) called with a value of the wrong declared type"
            );
            let cell = inner.inputs[idx].cell.clone();
            let unchanged = *cell.borrow() == value;
            *cell.borrow_mut() = value.clone();

            let mut pendings = vec![Pending::InputChanged {
                name: name.into(),
                value: value.clone(),
            }];
            if !unchanged {
                for (i, out_cell) in inner.outputs_current.iter().enumerate() {
                    if Rc::ptr_eq(out_cell, &cell) {
                        let out_name = inner.outputs[i].name.clone();
                        pendings.push(Pending::OutputChanged {
                            name: out_name.as_ref().into(),
                            value: value.clone(),
                            state_change: false,
                        });
                    }
                }
            }
            pendings
        };
        self.dispatch_pendings(pendings);
        self.request_tick();
        Ok(())
    }

    /// Reads `name`'s current value.
    pub fn get_input(&self, name: &str) -> Result<Value, RuntimeError> {
        let inner = self.inner.borrow();
        let idx = *inner
            .input_names
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownInput(name.to_string()))?;
        let value = inner.inputs[idx].cell.borrow().clone();
        Ok(value)
    }

    /// Reads `name`'s slot in the current output vector.
    pub fn get_output(&self, name: &str) -> Result<Value, RuntimeError> {
        let inner = self.inner.borrow();
        let idx = *inner
            .output_names
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownOutput(name.to_string()))?;
        let value = inner.outputs_current[idx].borrow().clone();
        Ok(value)
    }

    /// The current *real* leaf id.
    pub fn get_state(&self) -> StateId {
        self.inner.borrow().current_state
    }

    /// The scheduler this machine was built with. Callers using
    /// [`crate::ManualScheduler`] need this to pump ticks by hand.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Starts (or stops) scheduling. Stopping cancels any outstanding idle
    /// handle; starting requests one immediately.
    pub fn set_running(&self, running: bool) {
        let was_running = {
            let mut inner = self.inner.borrow_mut();
            let was = inner.running;
            inner.running = running;
            was
        };
        if running && !was_running {
            self.request_tick();
        } else if !running {
            if let Some(h) = self.handle.borrow_mut().take() {
                self.scheduler.cancel(h);
            }
            self.scheduled.set(false);
        }
    }

    pub fn on_state_enter(&self, f: impl FnMut(&str, i32, i32) + 'static) {
        self.observers.on_state_enter(f);
    }

    pub fn on_state_exit(&self, f: impl FnMut(&str, i32, i32) + 'static) {
        self.observers.on_state_exit(f);
    }

    pub fn on_input_changed(&self, f: impl FnMut(&str, &Value) + 'static) {
        self.observers.on_input_changed(f);
    }

    pub fn on_output_changed(&self, f: impl FnMut(&str, &Value, bool) + 'static) {
        self.observers.on_output_changed(f);
    }

    /// Writes a Graphviz rendering of the compiled graph to `path`.
    pub fn write_dot(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let inner = self.inner.borrow();
        crate::dot::write_dot(&inner.graph, &inner.interner, path)
    }

    /// Writes a Graphviz rendering into `STATE_MACHINE_DOT_DIR`'s
    /// directory, if set. Returns the path written, or
    /// `None` if the variable isn't set.
    pub fn write_dot_in_env_dir(&self, filename: &str) -> std::io::Result<Option<std::path::PathBuf>> {
        match std::env::var_os(crate::dot::DOT_DIR_ENV_VAR) {
            Some(dir) => {
                let path = std::path::PathBuf::from(dir).join(filename);
                self.write_dot(&path)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    fn dispatch_pendings(&self, pendings: Vec<Pending>) {
        for p in pendings {
            p.dispatch(&self.observers);
        }
    }

    fn request_tick(&self) {
        Self::request_tick_parts(&self.inner, &self.observers, &self.scheduler, &self.scheduled, &self.handle);
    }

    fn request_tick_parts(
        inner: &Rc<RefCell<Inner>>,
        observers: &Rc<Observers>,
        scheduler: &Rc<S>,
        scheduled: &Rc<Cell<bool>>,
        handle_cell: &Rc<RefCell<Option<S::Handle>>>,
    ) {
        if !inner.borrow().running {
            return;
        }
        if scheduled.get() {
            return;
        }
        scheduled.set(true);

        let inner2 = inner.clone();
        let observers2 = observers.clone();
        let scheduler2 = scheduler.clone();
        let scheduled2 = scheduled.clone();
        let handle2 = handle_cell.clone();

        let handle = scheduler.schedule_idle(Box::new(move || {
            scheduled2.set(false);
            *handle2.borrow_mut() = None;
            let (pendings, reschedule) = inner2.borrow_mut().run_tick();
            for p in pendings {
                p.dispatch(&observers2);
            }
            if reschedule {
                Machine::<S>::request_tick_parts(&inner2, &observers2, &scheduler2, &scheduled2, &handle2);
            }
        }));
        *handle_cell.borrow_mut() = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    fn toggle_machine() -> Machine<ManualScheduler> {
        let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
        m.add_input("bool-in", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
        m.add_edge(0, 1, &[]).unwrap();
        m.add_edge(1, 2, &["bool-in"]).unwrap();
        m.add_edge(2, 1, &["!bool-in"]).unwrap();
        m
    }

    #[test]
    fn scenario_s_boolean_toggle() {
        let m = toggle_machine();
        // The unguarded INIT->A edge fires on the very first tick, so by
        // the time the first `set_input` below runs the machine has
        // already settled at A — matching the boolean-toggle scenario's combined count
        // (enter(A)=1, enter(B)=0) for "after set_running(true) and
        // set_input(bool-in, false)".
        m.set_running(true);
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 1);

        m.set_input("bool-in", Value::Bool(false)).unwrap();
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 1);

        m.set_input("bool-in", Value::Bool(true)).unwrap();
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 2);

        m.set_input("bool-in", Value::Bool(false)).unwrap();
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 1);
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
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 1);
    }

    #[test]
    fn scenario_o_orthogonal_conflict() {
        let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A")], ManualScheduler::new()).unwrap();
        m.add_input("bool", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.add_input("enum", TypeTag::new_enum("e", ["init", "a", "b"]), Value::Enum { type_name: std::sync::Arc::from("e"), ordinal: 0 }).unwrap();
        m.create_default_condition("bool", ConditionKind::Eq).unwrap();
        m.create_default_condition("enum", ConditionKind::Eq).unwrap();

        m.add_edge(0, 1, &["bool"]).unwrap();
        assert!(m.add_edge(0, 1, &["a"]).is_err());
        m.add_edge(0, 1, &["b", "!bool"]).unwrap();
        assert!(m.add_edge(0, 1, &["!a", "!bool"]).is_err());
        m.add_edge(0, 1, &["init", "!bool"]).unwrap();
    }

    #[test]
    fn scenario_e_event_consumed_one_per_tick() {
        let m = Machine::with_scheduler(&[(0, "INIT"), (1, "A"), (2, "B")], ManualScheduler::new()).unwrap();
        m.add_input("bool", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.create_default_condition("bool", ConditionKind::Eq).unwrap();
        m.add_event("event").unwrap();
        m.add_edge(0, 1, &["bool"]).unwrap();
        m.add_edge(1, 0, &["!bool"]).unwrap();
        m.add_edge(1, 2, &["event"]).unwrap();
        m.add_edge(2, 1, &[]).unwrap();

        m.set_running(true);
        m.scheduler.run_to_quiescence();
        m.set_input("bool", Value::Bool(true)).unwrap();
        m.queue_event("event").unwrap();

        assert!(m.scheduler.run_pending());
        assert_eq!(m.get_state(), 1);
        assert!(m.scheduler.run_pending());
        assert_eq!(m.get_state(), 2);
        assert!(m.scheduler.run_pending());
        assert_eq!(m.get_state(), 1);
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
        m.scheduler.run_to_quiescence();

        m.set_input("f", Value::Float(20.0)).unwrap();
        m.set_input("bool", Value::Bool(true)).unwrap();
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 2);
        assert_eq!(m.get_output("f").unwrap(), Value::Float(0.0));

        m.set_input("bool", Value::Bool(false)).unwrap();
        m.scheduler.run_to_quiescence();
        assert_eq!(m.get_state(), 1);
        assert_eq!(m.get_output("f").unwrap(), Value::Float(20.0));

        m.set_input("f", Value::Float(30.0)).unwrap();
        assert_eq!(m.get_output("f").unwrap(), Value::Float(30.0));
    }

    #[test]
    fn boolean_default_condition_reuses_input_name_as_its_atom() {
        // A boolean's default condition atom IS the input's own name.
        // This must not be rejected as a duplicate against the input
        // declaration itself.
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        m.add_input("bool-in", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
    }

    #[test]
    fn event_name_colliding_with_an_atom_label_rejected() {
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        m.add_input("bool-in", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.create_default_condition("bool-in", ConditionKind::Eq).unwrap();
        assert!(m.add_event("bool-in").is_err());
    }

    #[test]
    fn reversed_boolean_edges_are_not_spuriously_rejected() {
        // `!b` then `b` out of the same source: mutually exclusive, so
        // the second add_edge must succeed even though the first already
        // claimed the source state.
        let m = Machine::new(&[(0, "INIT"), (1, "A"), (2, "B")]).unwrap();
        m.add_input("b", TypeTag::Bool, Value::Bool(false)).unwrap();
        m.create_default_condition("b", ConditionKind::Eq).unwrap();
        m.add_edge(0, 2, &["!b"]).unwrap();
        m.add_edge(0, 1, &["b"]).unwrap();
    }

    #[test]
    fn duplicate_input_name_rejected() {
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        m.add_input("x", TypeTag::Bool, Value::Bool(false)).unwrap();
        assert!(m.add_input("x", TypeTag::Int, Value::Int(0)).is_err());
    }

    #[test]
    fn add_input_rejects_a_default_of_the_wrong_type() {
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        assert!(matches!(
            m.add_input("x", TypeTag::Bool, Value::Int(0)),
            Err(ConfigError::InputTypeMismatch { .. })
        ));
    }

    #[test]
    fn add_output_rejects_a_default_of_the_wrong_type() {
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        assert!(matches!(
            m.add_output("y", TypeTag::Float, Value::Bool(true)),
            Err(ConfigError::OutputTypeMismatch { .. })
        ));
    }

    #[test]
    fn add_input_honors_a_nondefault_declared_default() {
        let m = Machine::new(&[(0, "INIT"), (1, "A")]).unwrap();
        m.add_input("bool-in", TypeTag::Bool, Value::Bool(true)).unwrap();
        assert_eq!(m.get_input("bool-in").unwrap(), Value::Bool(true));
    }

    #[test]
    fn set_running_false_stops_ticking() {
        let m = toggle_machine();
        m.set_running(true);
        m.scheduler.run_to_quiescence();
        let settled = m.get_state();

        m.set_running(false);
        m.set_input("bool-in", Value::Bool(true)).unwrap();
        assert!(!m.scheduler.has_pending());
        assert_eq!(m.get_state(), settled, "no tick should run while stopped");
    }
}
