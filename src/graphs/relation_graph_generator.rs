use fastrand::Rng;

use crate::explanations::ConflictSet;
use crate::formulas::FormulaStore;
use crate::graphs::RelationGraph;

/// A configuration for generating random relation graphs.
///
/// The following things can be configured:
/// - the seed -- the generator is fully deterministic for a fixed seed
/// - the density -- the probability with which each directed edge between
///   two distinct formulas is drawn
///
/// # Example
///
/// Basic usage:
/// ```
/// # use ontodiag::graphs::RelationGraphConfig;
/// let config = RelationGraphConfig::default().seed(7).density(0.25);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RelationGraphConfig {
    pub(crate) seed: u64,
    pub(crate) density: f64,
}

impl Default for RelationGraphConfig {
    fn default() -> Self {
        Self { seed: 42, density: 0.15 }
    }
}

impl RelationGraphConfig {
    /// Updates the seed, which will be used to generate pseudo-random edges.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Updates the edge probability. Values outside `[0, 1]` are effectively
    /// clamped by the draw: `0.0` yields no edges, `1.0` all permitted ones.
    #[must_use]
    pub const fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }
}

/// Generates a random directed relation graph over all formulas of the store.
///
/// Edges are drawn independently with the configured density, as in a
/// directed G(n,p) graph, but an edge is only kept if its two endpoints
/// occur together in at least one conflict set. Formulas that never share a
/// conflict set can therefore not be related, which keeps the induced
/// subgraphs of the conflict sets the only carriers of structure.
///
/// # Example
///
/// Basic usage:
/// ```
/// # use ontodiag::explanations::index_conflict_sets;
/// # use ontodiag::formulas::FormulaStore;
/// # use ontodiag::graphs::{generate_relation_graph, RelationGraphConfig};
/// # use std::collections::BTreeSet;
/// let mut store = FormulaStore::new();
/// store.intern("a");
/// store.intern("b");
/// let raw: Vec<BTreeSet<String>> = vec![["a", "b"].iter().map(ToString::to_string).collect()];
/// let conflict_sets = index_conflict_sets(&raw, &store).unwrap();
///
/// let config = RelationGraphConfig::default().density(1.0);
/// let graph = generate_relation_graph(&store, &conflict_sets, &config);
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub fn generate_relation_graph(
    store: &FormulaStore,
    conflict_sets: &[ConflictSet],
    config: &RelationGraphConfig,
) -> RelationGraph {
    let mut rng = Rng::with_seed(config.seed);
    let mut graph = RelationGraph::with_nodes(store.len());
    let id_sets: Vec<_> = conflict_sets.iter().map(ConflictSet::id_set).collect();

    for from in store.ids() {
        for to in store.ids() {
            if from == to {
                continue;
            }
            let drawn = rng.f64() < config.density;
            if drawn && id_sets.iter().any(|set| set.contains(&from) && set.contains(&to)) {
                graph.add_edge(from, to);
            }
        }
    }
    graph
}
