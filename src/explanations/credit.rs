use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use std::collections::BTreeMap;

use crate::explanations::ConflictSet;
use crate::formulas::{FormulaId, FormulaStore};
use crate::graphs::RelationGraph;

/// Credit weights assigned to the formulas of one loaded report.
///
/// The weight of a formula approximates its share of the collective
/// responsibility for the inconsistency (a Myerson-style value over the
/// conflict sets) and is used to break ties between minimum-cardinality
/// diagnoses. Weights are exact rationals; rounding happens only when a
/// weight becomes a solver objective coefficient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditWeights {
    weights: BTreeMap<FormulaId, BigRational>,
}

impl CreditWeights {
    /// Returns the exact weight of a formula.
    ///
    /// The identifier must come from the store the weights were computed
    /// for. Formulas occurring in no conflict set have weight zero.
    pub fn weight(&self, id: FormulaId) -> &BigRational {
        &self.weights[&id]
    }

    /// Returns the weight as a solver objective coefficient, rounded to two
    /// decimal digits. This is the only place where precision is given up.
    pub fn objective_coefficient(&self, id: FormulaId) -> f64 {
        let scaled = (self.weight(id) * BigRational::from_integer(BigInt::from(100))).round();
        scaled.to_f64().unwrap_or(0.0) / 100.0
    }

    /// Iterates over `(identifier, weight)` pairs in ascending identifier
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (FormulaId, &BigRational)> {
        self.weights.iter().map(|(&id, weight)| (id, weight))
    }

    /// Returns the number of weighted formulas.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if no formula carries a weight.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Computes one credit weight per formula of the store.
///
/// For every conflict set the subgraph induced by its members is decomposed
/// into strongly connected components. A formula in component `C` of a
/// conflict set with `m` components collects the contribution `1 / (|C| * m)`:
/// tightly coupled formulas share the credit of their component, and conflict
/// sets that fall apart into many components spread their credit thinner.
/// The final weight is the arithmetic mean of a formula's contributions over
/// all conflict sets it occurs in; formulas occurring in no conflict set get
/// weight zero.
///
/// All contributions are exact rationals, so recomputing the weights for the
/// same graph and conflict sets is deterministic.
///
/// # Example
///
/// A single conflict set of three formulas forming one strongly connected
/// cycle gives every formula the weight 1/3:
///
/// ```
/// # use std::collections::BTreeSet;
/// # use num_bigint::BigInt;
/// # use num_rational::BigRational;
/// # use ontodiag::explanations::{credit_weights, index_conflict_sets};
/// # use ontodiag::formulas::FormulaStore;
/// # use ontodiag::graphs::RelationGraph;
/// let mut store = FormulaStore::new();
/// for text in ["a", "b", "c"] {
///     store.intern(text);
/// }
/// let raw: Vec<BTreeSet<String>> = vec![["a", "b", "c"].iter().map(ToString::to_string).collect()];
/// let conflict_sets = index_conflict_sets(&raw, &store).unwrap();
///
/// let mut graph = RelationGraph::with_nodes(3);
/// graph.add_edge(0, 1);
/// graph.add_edge(1, 2);
/// graph.add_edge(2, 0);
///
/// let weights = credit_weights(&graph, &conflict_sets, &store);
/// let third = BigRational::new(BigInt::from(1), BigInt::from(3));
/// assert_eq!(weights.weight(0), &third);
/// ```
pub fn credit_weights(
    graph: &RelationGraph,
    conflict_sets: &[ConflictSet],
    store: &FormulaStore,
) -> CreditWeights {
    let mut contributions: BTreeMap<FormulaId, Vec<BigRational>> =
        store.ids().map(|id| (id, Vec::new())).collect();

    for conflict_set in conflict_sets {
        let induced = graph.subgraph(&conflict_set.id_set());
        let components = induced.strongly_connected_components();
        let component_count = BigInt::from(components.len());
        for component in &components {
            let share = BigRational::new(BigInt::one(), BigInt::from(component.len()) * &component_count);
            for &id in component {
                contributions.get_mut(&id).unwrap().push(share.clone());
            }
        }
    }

    let weights = contributions
        .into_iter()
        .map(|(id, shares)| {
            let weight = if shares.is_empty() {
                BigRational::zero()
            } else {
                let count = BigRational::from_integer(BigInt::from(shares.len()));
                shares.iter().sum::<BigRational>() / count
            };
            (id, weight)
        })
        .collect();
    CreditWeights { weights }
}
