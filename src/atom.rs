//! Symbolic atom interning.
//!
//! The source interns condition-atom and event names via a process-wide
//! quark table; two atoms are the same term iff their canonical string
//! forms match. Re-architected here as an interner owned by the machine:
//! atoms become small integers that compare and sort in interning order,
//! which is deterministic for a given sequence of configuration calls even
//! though it is not lexicographic.

use std::collections::HashMap;

/// An interned symbol: a condition atom (positive or negative) or an event
/// name. Atoms and events share one symbol space so name collisions
/// between them can be detected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomId(u32);

#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: HashMap<Box<str>, AtomId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning its existing id if already known.
    pub fn intern(&mut self, s: &str) -> AtomId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let id = AtomId(self.strings.len() as u32);
        self.strings.push(s.into());
        self.lookup.insert(s.into(), id);
        id
    }

    pub fn get(&self, s: &str) -> Option<AtomId> {
        self.lookup.get(s).copied()
    }

    pub fn resolve(&self, id: AtomId) -> &str {
        &self.strings[id.0 as usize]
    }
}

/// A sorted, deduplicated set of atoms: the representation used for both
/// an "active condition set" and a transition's guard conjunction.
pub fn sort_dedup(atoms: &mut Vec<AtomId>) {
    atoms.sort_unstable();
    atoms.dedup();
}

pub fn is_subset(superset: &[AtomId], subset: &[AtomId]) -> bool {
    subset.iter().all(|a| superset.binary_search(a).is_ok())
}

pub fn is_disjoint(a: &[AtomId], b: &[AtomId]) -> bool {
    !a.iter().any(|x| b.binary_search(x).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut i = Interner::new();
        let a = i.intern("bool-in");
        let b = i.intern("!bool-in");
        let a2 = i.intern("bool-in");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(i.resolve(a), "bool-in");
    }

    #[test]
    fn subset_and_disjoint() {
        let mut i = Interner::new();
        let a = i.intern("a");
        let b = i.intern("b");
        let c = i.intern("c");
        let mut active = vec![a, b];
        sort_dedup(&mut active);
        assert!(is_subset(&active, &[a]));
        assert!(!is_subset(&active, &[c]));
        assert!(is_disjoint(&active, &[c]));
        assert!(!is_disjoint(&active, &[b]));
    }
}
