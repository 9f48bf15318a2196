//! Condition algebra: atom expansion, activation, and the set operations
//! used by the conflict checker and the update engine.
//!
//! This module is deliberately free of any notion of "input" or "machine" —
//! it operates purely on atom indices and a [`ConditionKind`], so its
//! correctness (particularly [`expand_no_overlap`], the subtlest piece of
//! the whole engine) can be pinned down in isolation.

use crate::atom::AtomId;

/// How an input condition's labels relate to "the active one".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Exactly the active label is true; all others are false.
    Eq,
    /// Every label at or below the active one (by index) is true.
    Geq,
    /// Every label at or above the active one (by index) is true.
    Leq,
}

/// One input condition: a source input plus an ordered label set, with the
/// positive/negative atom forms already interned in label order.
pub struct Condition {
    pub input_index: usize,
    pub kind: ConditionKind,
    /// `positive[i]` / `negative[i]` are the atoms for label `i`.
    pub positive: Vec<AtomId>,
    pub negative: Vec<AtomId>,
    /// Converts an input value into the index of the currently active
    /// label, or `None` for the boolean "not active" (false) special case.
    pub reader: Box<dyn Fn(&crate::value::Value) -> Option<usize>>,
}

impl Condition {
    pub fn label_count(&self) -> usize {
        self.positive.len()
    }

    /// Reads the current input value and returns the "activation"
    /// expansion: the positive/negative atoms implied by the active label.
    pub fn expand_active(&self, value: &crate::value::Value) -> Vec<AtomId> {
        match (self.reader)(value) {
            Some(active) => expand_positive(self.kind, active, self.label_count(), self),
            None => {
                // Boolean EQ special case: the reader found no active label,
                // meaning the sole label's negative atom is the only truth.
                debug_assert_eq!(self.label_count(), 1);
                vec![self.negative[0]]
            }
        }
    }

    /// The "negation": the set of atoms whose disjunction is exactly
    /// equivalent to this atom being false. Used to build a transition's
    /// contradiction set for the conflict checker.
    pub fn expand_no_overlap(&self, idx: usize, positive: bool) -> Vec<AtomId> {
        no_overlap_atoms(self.kind, idx, positive, self.label_count(), self)
    }
}

/// `expand_positive` restricted to the raw booleans, so it can be unit
/// tested without a full [`Condition`].
fn expand_positive(kind: ConditionKind, active: usize, n: usize, atoms: &Condition) -> Vec<AtomId> {
    let mut out = Vec::with_capacity(n);
    for j in 0..n {
        let is_true = match kind {
            ConditionKind::Eq => j == active,
            ConditionKind::Geq => j <= active,
            ConditionKind::Leq => j >= active,
        };
        out.push(if is_true { atoms.positive[j] } else { atoms.negative[j] });
    }
    out
}

/// The disjunction of atoms known to imply `NOT(queried atom)`, over the
/// condition's own canonical atoms.
///
/// Write `a` for the (unknown) active label index and treat each kind's
/// positive/negative atoms as predicates over `a`:
///
/// - EQ: `positive(j) ⟺ a == j`, `negative(j) ⟺ a != j`.
/// - GEQ: `positive(j) ⟺ a >= j`, `negative(j) ⟺ a < j`.
/// - LEQ: `positive(j) ⟺ a <= j`, `negative(j) ⟺ a > j`.
///
/// For EQ, `NOT(positive(idx))` holds whenever some *other* label is
/// active (`positive(j)` for `j != idx`) — and, since `negative(idx)` is
/// by definition `a != idx`, it is itself already one more atom implying
/// the same thing, the only one that doesn't vanish when there's no other
/// label (`n == 1`, the boolean case). `NOT(negative(idx))` is exactly
/// `positive(idx)`, a single atom.
///
/// GEQ/LEQ are monotonic in `a`, so both directions reduce to a
/// contiguous range rather than a single point:
/// - GEQ: `NOT(positive(idx))` ⟺ `a < idx`, implied by `negative(j)` for
///   every `j <= idx` (smaller thresholds are strictly more restrictive).
///   `NOT(negative(idx))` ⟺ `a >= idx`, implied by `positive(j)` for
///   every `j >= idx`.
/// - LEQ: the mirror image — `NOT(positive(idx))` via `negative(j)` for
///   `j >= idx`; `NOT(negative(idx))` via `positive(j)` for `j <= idx`.
fn no_overlap_atoms(kind: ConditionKind, idx: usize, positive: bool, n: usize, atoms: &Condition) -> Vec<AtomId> {
    match (kind, positive) {
        (ConditionKind::Eq, true) => {
            let mut out: Vec<AtomId> = (0..n).filter(|&j| j != idx).map(|j| atoms.positive[j]).collect();
            out.push(atoms.negative[idx]);
            out
        }
        (ConditionKind::Eq, false) => vec![atoms.positive[idx]],
        (ConditionKind::Geq, true) => (0..=idx).map(|j| atoms.negative[j]).collect(),
        (ConditionKind::Geq, false) => (idx..n).map(|j| atoms.positive[j]).collect(),
        (ConditionKind::Leq, true) => (idx..n).map(|j| atoms.negative[j]).collect(),
        (ConditionKind::Leq, false) => (0..=idx).map(|j| atoms.positive[j]).collect(),
    }
}
