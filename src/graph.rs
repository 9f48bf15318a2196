//! The compound state graph: leaves, groups, leaders, and parent links.
//!
//! States live in a single owning map keyed by id (design note:
//! "store states in a single owning container ... the leader link is an
//! id, not a borrow"), so cross-references (parent, leader, children) are
//! plain `StateId`s rather than borrows or `Rc` cycles.

use std::collections::HashMap;
use std::rc::Rc;
use std::cell::RefCell;

use crate::output::OutputSlot;
use crate::transition::Transition;
use crate::value::Value;

/// A state id. Non-negative ids are leaves drawn from the consumer's
/// enumeration; negative ids are runtime-allocated compound groups.
/// `-1` is reserved for the root "all" state.
pub type StateId = i32;

pub const ROOT: StateId = -1;

pub struct StateNode {
    pub id: StateId,
    pub name: Rc<str>,
    pub parent: Option<StateId>,
    /// The child entered when this (necessarily compound) state is
    /// targeted by a transition. `None` for leaves.
    pub leader: Option<StateId>,
    pub children: Vec<StateId>,
    /// Output bindings, one slot per declared output, indexed the same
    /// way as the machine's output declarations.
    pub outputs: Vec<OutputSlot>,
    /// Boxed values backing this state's own constant output bindings.
    /// Kept alongside `outputs` purely for parity with the source's
    /// explicit ownership bookkeeping; an `Rc` in `outputs` already keeps
    /// the box alive on its own.
    pub owned_values: Vec<Rc<RefCell<Value>>>,
    pub transitions: Vec<Transition>,
}

impl StateNode {
    pub fn is_group(&self) -> bool {
        self.id < 0
    }
}

#[derive(Default)]
pub struct StateGraph {
    states: HashMap<StateId, StateNode>,
    next_group_id: StateId,
}

impl StateGraph {
    /// Builds the graph's root "all" state. Leaves are added afterwards
    /// via [`StateGraph::add_leaf`].
    pub fn new() -> Self {
        let mut states = HashMap::new();
        states.insert(
            ROOT,
            StateNode {
                id: ROOT,
                name: Rc::from("all"),
                parent: None,
                leader: None,
                children: Vec::new(),
                outputs: Vec::new(),
                owned_values: Vec::new(),
                transitions: Vec::new(),
            },
        );
        StateGraph {
            states,
            next_group_id: -2,
        }
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.states.get(&id)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut StateNode> {
        self.states.get_mut(&id)
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn name_of(&self, id: StateId) -> Option<&str> {
        self.states.get(&id).map(|s| s.name.as_ref())
    }

    /// Adds a leaf under the root: "declaring the state
    /// enumeration populates one leaf per value ... and reparents each
    /// leaf under all".
    pub fn add_leaf(&mut self, id: StateId, name: &str) {
        debug_assert!(id >= 0, "leaf ids must be non-negative");
        self.states.insert(
            id,
            StateNode {
                id,
                name: Rc::from(name),
                parent: Some(ROOT),
                leader: None,
                children: Vec::new(),
                outputs: Vec::new(),
                owned_values: Vec::new(),
                transitions: Vec::new(),
            },
        );
        self.states.get_mut(&ROOT).unwrap().children.push(id);
    }

    /// Allocates the next (strictly decreasing, dense) group id.
    pub fn allocate_group_id(&mut self) -> StateId {
        let id = self.next_group_id;
        self.next_group_id -= 1;
        id
    }

    /// Creates a compound group with `children` (at least one), all of
    /// which must currently share a parent. The group replaces them at
    /// that parent and the first child becomes its leader.
    ///
    /// Returns the new group id, or `None` if the children's parents
    /// disagree or `children` is empty (configuration error, surfaced by
    /// the caller as [`crate::error::ConfigError`]).
    pub fn create_group(&mut self, name: &str, children: &[StateId]) -> Option<StateId> {
        let leader = *children.first()?;
        let common_parent = self.states.get(&leader)?.parent?;
        for &child in children {
            if self.states.get(&child)?.parent != Some(common_parent) {
                return None;
            }
        }

        let group_id = self.allocate_group_id();
        self.states.insert(
            group_id,
            StateNode {
                id: group_id,
                name: Rc::from(name),
                parent: Some(common_parent),
                leader: Some(leader),
                children: Vec::new(),
                outputs: Vec::new(),
                owned_values: Vec::new(),
                transitions: Vec::new(),
            },
        );

        // Detach children from their old parent, attach them (and the new
        // group itself) under that parent / the group respectively.
        if let Some(parent) = self.states.get_mut(&common_parent) {
            parent.children.retain(|c| !children.contains(c));
            parent.children.push(group_id);
        }
        for &child in children {
            if let Some(node) = self.states.get_mut(&child) {
                node.parent = Some(group_id);
            }
        }
        self.states.get_mut(&group_id).unwrap().children = children.to_vec();

        Some(group_id)
    }

    /// Follows `leader` links from `start` until a leaf is reached.
    /// Debug-asserts termination within the tree's depth, per invariant 2
    /// (the "leader termination" invariant).
    pub fn resolve_real(&self, start: StateId) -> StateId {
        let mut current = start;
        let mut steps = 0usize;
        while let Some(node) = self.states.get(&current) {
            match node.leader {
                Some(leader) => {
                    current = leader;
                    steps += 1;
                    debug_assert!(
                        steps <= self.states.len(),
                        "leader chain failed to terminate at a leaf"
                    );
                }
                None => return current,
            }
        }
        current
    }

    /// Ancestors of `id`, innermost first, NOT including `id` itself.
    pub fn ancestors(&self, id: StateId) -> Vec<StateId> {
        let mut out = Vec::new();
        let mut current = self.states.get(&id).and_then(|n| n.parent);
        while let Some(p) = current {
            out.push(p);
            current = self.states.get(&p).and_then(|n| n.parent);
        }
        out
    }

    /// `id` plus all of its descendants, pre-order.
    pub fn self_and_descendants(&self, id: StateId) -> Vec<StateId> {
        let mut out = vec![id];
        let mut frontier = vec![id];
        while let Some(cur) = frontier.pop() {
            if let Some(node) = self.states.get(&cur) {
                for &child in &node.children {
                    out.push(child);
                    frontier.push(child);
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateNode> {
        self.states.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StateNode> {
        self.states.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_leaves() -> StateGraph {
        let mut g = StateGraph::new();
        g.add_leaf(0, "INIT");
        g.add_leaf(1, "A");
        g.add_leaf(2, "B");
        g
    }

    #[test]
    fn leaves_start_under_root() {
        let g = graph_with_leaves();
        assert_eq!(g.get(0).unwrap().parent, Some(ROOT));
        assert_eq!(g.get(ROOT).unwrap().children, vec![0, 1, 2]);
    }

    #[test]
    fn create_group_reparents_children_and_sets_leader() {
        let mut g = graph_with_leaves();
        let gid = g.create_group("ab", &[1, 2]).unwrap();
        assert_eq!(g.get(gid).unwrap().leader, Some(1));
        assert_eq!(g.get(1).unwrap().parent, Some(gid));
        assert_eq!(g.get(2).unwrap().parent, Some(gid));
        assert_eq!(g.get(ROOT).unwrap().children, vec![0, gid]);
        assert_eq!(g.resolve_real(gid), 1);
    }

    #[test]
    fn create_group_rejects_mismatched_parents() {
        let mut g = graph_with_leaves();
        let _gid = g.create_group("ab", &[1, 2]).unwrap();
        // 0 is still under root; 1 has since moved under the new group.
        assert!(g.create_group("bad", &[0, 1]).is_none());
    }

    #[test]
    fn ancestors_and_descendants() {
        let mut g = graph_with_leaves();
        let gid = g.create_group("ab", &[1, 2]).unwrap();
        assert_eq!(g.ancestors(1), vec![gid, ROOT]);
        let mut desc = g.self_and_descendants(gid);
        desc.sort();
        assert_eq!(desc, vec![gid, 1, 2]);
    }
}
