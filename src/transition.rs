//! Guarded transitions and the static conflict checker.

use crate::atom::{is_disjoint, AtomId};
use crate::graph::{StateGraph, StateId};

/// A directed, guarded edge. `event` is `None` for a purely conditional
/// transition; otherwise the transition only fires while that event is
/// the tick's active event.
pub struct Transition {
    pub target: StateId,
    pub event: Option<AtomId>,
    /// The sorted conjunction of atoms that must all be active.
    pub conditions: Vec<AtomId>,
}

/// Computes the contradiction set for a candidate conjunction: the union,
/// over every atom in `conditions`, of that atom's `expand_no_overlap`
/// (already sorted/deduplicated by the caller's atom source).
pub fn contradiction_set(no_overlap_for: impl Fn(AtomId) -> Vec<AtomId>, conditions: &[AtomId]) -> Vec<AtomId> {
    let mut out = Vec::new();
    for &atom in conditions {
        out.extend(no_overlap_for(atom));
    }
    crate::atom::sort_dedup(&mut out);
    out
}

/// The conflict check: an edge from `src` with `event` and `contra`
/// (the new transition's contradiction set) conflicts with any existing
/// transition — among `src`'s own, `src`'s ancestors', and all of `src`'s
/// descendants' — that shares the same event field and whose own
/// condition set is *disjoint* from `contra`.
///
/// Returns the id of a conflicting state, if any, for use in the
/// diagnostic.
pub fn find_conflict(
    graph: &StateGraph,
    src: StateId,
    event: Option<AtomId>,
    contra: &[AtomId],
) -> Option<StateId> {
    let mut candidates = graph.ancestors(src);
    candidates.push(src);
    candidates.extend(graph.self_and_descendants(src));

    for state_id in candidates {
        let Some(node) = graph.get(state_id) else { continue };
        for existing in &node.transitions {
            if existing.event != event {
                continue;
            }
            if is_disjoint(&existing.conditions, contra) {
                return Some(state_id);
            }
        }
    }
    None
}

/// Walks from `start` up through ancestors (not siblings, not
/// descendants) looking for the first transition whose event matches
/// `event` and whose conditions are a subset of `active`.
pub fn find_applicable<'g>(
    graph: &'g StateGraph,
    start: StateId,
    event: Option<AtomId>,
    active: &[AtomId],
) -> Option<(StateId, &'g Transition)> {
    let mut chain = vec![start];
    chain.extend(graph.ancestors(start));
    for state_id in chain {
        let node = graph.get(state_id)?;
        for t in &node.transitions {
            if t.event == event && crate::atom::is_subset(active, &t.conditions) {
                return Some((state_id, t));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Interner;

    #[test]
    fn conflict_check_detects_disjoint_existing_transition() {
        let mut graph = StateGraph::new();
        graph.add_leaf(0, "INIT");
        graph.add_leaf(1, "A");

        let mut interner = Interner::new();
        let bool_atom = interner.intern("bool");

        graph.get_mut(0).unwrap().transitions.push(Transition {
            target: 1,
            event: None,
            conditions: vec![bool_atom],
        });

        // A brand-new transition whose contradiction set doesn't mention
        // `bool` at all (e.g. guarded by an unrelated atom) is disjoint
        // from the existing transition's own conditions ([bool]) and so
        // conflicts with it.
        let unrelated = interner.intern("enum::a");
        let contra = vec![unrelated];
        assert_eq!(find_conflict(&graph, 0, None, &contra), Some(0));
    }

    #[test]
    fn conflict_check_passes_when_contra_overlaps_existing() {
        let mut graph = StateGraph::new();
        graph.add_leaf(0, "INIT");
        graph.add_leaf(1, "A");

        let mut interner = Interner::new();
        let bool_atom = interner.intern("bool");
        graph.get_mut(0).unwrap().transitions.push(Transition {
            target: 1,
            event: None,
            conditions: vec![bool_atom],
        });

        let contra = vec![bool_atom];
        assert_eq!(find_conflict(&graph, 0, None, &contra), None);
    }
}
