#![allow(dead_code)]

use std::collections::BTreeSet;

use crate::explanations::{index_conflict_sets, ConflictSet};
use crate::formulas::{FormulaId, FormulaStore};

pub(crate) fn store_with(count: usize) -> FormulaStore {
    let mut store = FormulaStore::new();
    for i in 0..count {
        store.intern(&format!("axiom {i}"));
    }
    store
}

pub(crate) fn conflict_set(ids: &[FormulaId], store: &FormulaStore) -> ConflictSet {
    let raw: BTreeSet<String> = ids.iter().map(|&id| store.text(id).unwrap().to_string()).collect();
    index_conflict_sets(&[raw], store).unwrap().remove(0)
}
