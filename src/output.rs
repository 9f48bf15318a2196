//! Output binding and resolution.
//!
//! A state's `outputs[i]` is either unset, an owned constant, or an alias
//! into an input's live value. Both cases are represented the same way —
//! a shared, mutable cell — so "the current output vector" can compare
//! references cheaply via `Rc::ptr_eq` without caring which kind of
//! binding produced the reference.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

pub type OutputCell = Rc<RefCell<Value>>;
pub type OutputSlot = Option<OutputCell>;

/// Resolves the current output vector for `real_leaf` by walking up
/// through its ancestors (root last): "each output slot takes
/// the first non-null reference it finds". The root is expected to be
/// fully populated with defaults so this always terminates with no
/// `None` entries (the "output coverage" invariant).
pub fn resolve_outputs<'a>(
    output_count: usize,
    chain: impl Iterator<Item = (StateId, OutputsRef<'a>)>,
) -> Vec<OutputCell> {
    let mut resolved: Vec<Option<OutputCell>> = vec![None; output_count];
    let mut remaining = output_count;
    for (_, outputs) in chain {
        if remaining == 0 {
            break;
        }
        for (i, slot) in outputs.0.iter().enumerate() {
            if resolved[i].is_none() {
                if let Some(cell) = slot {
                    resolved[i] = Some(cell.clone());
                    remaining -= 1;
                }
            }
        }
    }
    resolved
        .into_iter()
        .map(|c| c.expect("root state must provide a default for every output"))
        .collect()
}

/// A thin newtype so `resolve_outputs`'s iterator item reads clearly at
/// call sites (a `&[OutputSlot]` borrowed from a `StateNode`).
pub struct OutputsRef<'a>(pub &'a [OutputSlot]);

use crate::graph::StateId;

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(v: f64) -> OutputCell {
        Rc::new(RefCell::new(Value::Float(v)))
    }

    #[test]
    fn falls_back_through_chain() {
        let root_outputs = vec![Some(cell(0.0))];
        let mid_outputs: Vec<OutputSlot> = vec![None];
        let leaf_outputs = vec![Some(cell(5.0))];

        let chain = vec![
            (0, OutputsRef(&leaf_outputs)),
            (-2, OutputsRef(&mid_outputs)),
            (-1, OutputsRef(&root_outputs)),
        ];
        let resolved = resolve_outputs(1, chain.into_iter());
        assert_eq!(*resolved[0].borrow(), Value::Float(5.0));
    }

    #[test]
    fn falls_back_to_root_default_when_unset() {
        let root_outputs = vec![Some(cell(42.0))];
        let leaf_outputs: Vec<OutputSlot> = vec![None];
        let chain = vec![(0, OutputsRef(&leaf_outputs)), (-1, OutputsRef(&root_outputs))];
        let resolved = resolve_outputs(1, chain.into_iter());
        assert_eq!(*resolved[0].borrow(), Value::Float(42.0));
    }
}
