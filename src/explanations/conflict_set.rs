use crate::formulas::{FormulaId, FormulaStore};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// A minimal conflict set (MUPS): a set of formulas which together cause the
/// inconsistency and of which at least one has to be retracted.
///
/// A conflict set keeps, for each member, the formula identifier alongside
/// its text. Members are stored in ascending identifier order, but consumers
/// must not attach meaning to the order: a conflict set has set semantics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictSet {
    formulas: BTreeMap<FormulaId, String>,
}

impl ConflictSet {
    /// Returns the identifiers of the member formulas in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FormulaId> + '_ {
        self.formulas.keys().copied()
    }

    /// Returns the member identifiers as a set.
    pub fn id_set(&self) -> BTreeSet<FormulaId> {
        self.formulas.keys().copied().collect()
    }

    /// Returns `true` if the formula is a member of this conflict set.
    pub fn contains(&self, id: FormulaId) -> bool {
        self.formulas.contains_key(&id)
    }

    /// Returns the text of a member formula, if it is one.
    pub fn text(&self, id: FormulaId) -> Option<&str> {
        self.formulas.get(&id).map(String::as_str)
    }

    /// Returns the number of member formulas.
    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    /// Returns `true` if the conflict set has no members.
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Iterates over `(identifier, text)` pairs in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (FormulaId, &str)> {
        self.formulas.iter().map(|(&id, text)| (id, text.as_str()))
    }
}

/// Error raised when a conflict-set member cannot be resolved to a formula
/// identifier.
///
/// Since identifiers are derived from the same report as the conflict sets,
/// this indicates a broken contract between the loader and the indexing step
/// and is not recoverable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexingError {
    /// A conflict set contains a formula text unknown to the store.
    UnknownFormula(String),
}

impl Display for IndexingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormula(text) => {
                f.write_fmt(format_args!("Conflict-set member has no formula id: \"{text}\""))
            }
        }
    }
}

impl std::error::Error for IndexingError {}

/// Re-expresses text-based conflict sets as [`ConflictSet`]s keyed by formula
/// identifier.
///
/// Every member text is resolved against the store's reverse index. A member
/// without an identifier yields an [`IndexingError`].
///
/// # Example
///
/// Basic usage:
/// ```
/// # use std::collections::BTreeSet;
/// # use ontodiag::explanations::index_conflict_sets;
/// # use ontodiag::formulas::FormulaStore;
/// let mut store = FormulaStore::new();
/// store.intern("SubClassOf(A, B)");
/// store.intern("DisjointClasses(A, B)");
///
/// let raw: Vec<BTreeSet<String>> =
///     vec![["SubClassOf(A, B)", "DisjointClasses(A, B)"].iter().map(ToString::to_string).collect()];
/// let conflict_sets = index_conflict_sets(&raw, &store).unwrap();
///
/// assert_eq!(conflict_sets[0].ids().collect::<Vec<_>>(), vec![0, 1]);
/// assert_eq!(conflict_sets[0].text(1), Some("DisjointClasses(A, B)"));
/// ```
pub fn index_conflict_sets(
    raw_sets: &[BTreeSet<String>],
    store: &FormulaStore,
) -> Result<Vec<ConflictSet>, IndexingError> {
    let mut result = Vec::with_capacity(raw_sets.len());
    for raw in raw_sets {
        let mut formulas = BTreeMap::new();
        for text in raw {
            let id = store.id_of(text).ok_or_else(|| IndexingError::UnknownFormula(text.clone()))?;
            formulas.insert(id, text.clone());
        }
        result.push(ConflictSet { formulas });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::formulas::FormulaStore;

    use super::{index_conflict_sets, IndexingError};

    #[test]
    fn test_indexing() {
        let mut store = FormulaStore::new();
        store.intern("a");
        store.intern("b");
        store.intern("c");

        let raw: Vec<BTreeSet<String>> = vec![
            ["a", "b"].iter().map(ToString::to_string).collect(),
            ["c"].iter().map(ToString::to_string).collect(),
        ];
        let sets = index_conflict_sets(&raw, &store).unwrap();

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].id_set(), BTreeSet::from([0, 1]));
        assert_eq!(sets[0].text(0), Some("a"));
        assert_eq!(sets[0].text(2), None);
        assert!(sets[0].contains(1));
        assert!(!sets[0].contains(2));
        assert_eq!(sets[1].id_set(), BTreeSet::from([2]));
        assert_eq!(sets[1].len(), 1);
    }

    #[test]
    fn test_unknown_formula_is_fatal() {
        let mut store = FormulaStore::new();
        store.intern("a");

        let raw: Vec<BTreeSet<String>> = vec![["a", "ghost"].iter().map(ToString::to_string).collect()];
        let err = index_conflict_sets(&raw, &store).unwrap_err();
        assert_eq!(err, IndexingError::UnknownFormula("ghost".to_string()));
    }
}
