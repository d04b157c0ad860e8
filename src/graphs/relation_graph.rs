use crate::formulas::FormulaId;
use std::collections::{BTreeMap, BTreeSet};

/// A simple directed graph over formula identifiers.
///
/// The relation graph connects formulas of an ontology; conflict sets induce
/// subgraphs of it, whose strongly connected components drive the credit
/// allocation. Nodes and edges are kept in ordered sets, so iteration order
/// and all derived computations are deterministic.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct RelationGraph {
    nodes: BTreeSet<FormulaId>,
    edges: BTreeSet<(FormulaId, FormulaId)>,
}

impl RelationGraph {
    /// Creates an empty graph.
    pub const fn new() -> Self {
        Self { nodes: BTreeSet::new(), edges: BTreeSet::new() }
    }

    /// Creates a graph with nodes `0..count` and no edges.
    pub fn with_nodes(count: usize) -> Self {
        Self { nodes: (0..count).collect(), edges: BTreeSet::new() }
    }

    /// Adds a node to the graph.
    pub fn add_node(&mut self, node: FormulaId) {
        self.nodes.insert(node);
    }

    /// Adds a directed edge to the graph.
    pub fn add_edge(&mut self, from: FormulaId, to: FormulaId) {
        assert!(self.nodes.contains(&from), "Cannot find node with index {from}.");
        assert!(self.nodes.contains(&to), "Cannot find node with index {to}.");
        self.edges.insert((from, to));
    }

    /// Returns `true` if the graph contains the directed edge.
    pub fn has_edge(&self, from: FormulaId, to: FormulaId) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Returns the number of nodes of the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges of the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over the nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = FormulaId> + '_ {
        self.nodes.iter().copied()
    }

    /// Iterates over the edges in ascending `(from, to)` order.
    pub fn edges(&self) -> impl Iterator<Item = (FormulaId, FormulaId)> + '_ {
        self.edges.iter().copied()
    }

    /// Returns the subgraph induced by the given nodes: the intersection of
    /// the node set with `keep` and all edges with both endpoints kept.
    pub fn subgraph(&self, keep: &BTreeSet<FormulaId>) -> Self {
        let nodes: BTreeSet<FormulaId> = self.nodes.intersection(keep).copied().collect();
        let edges = self.edges.iter().filter(|(from, to)| nodes.contains(from) && nodes.contains(to)).copied().collect();
        Self { nodes, edges }
    }

    /// Returns a copy of the graph with the given nodes and all their
    /// incident edges removed.
    pub fn without_nodes(&self, removed: &[FormulaId]) -> Self {
        let removed: BTreeSet<FormulaId> = removed.iter().copied().collect();
        let nodes: BTreeSet<FormulaId> = self.nodes.difference(&removed).copied().collect();
        let edges = self.edges.iter().filter(|(from, to)| nodes.contains(from) && nodes.contains(to)).copied().collect();
        Self { nodes, edges }
    }

    /// Decomposes the graph into its strongly connected components: the
    /// maximal node sets in which every node reaches every other node along
    /// directed edges.
    ///
    /// Uses Tarjan's algorithm with an explicit work stack. Components are
    /// returned as ordered sets; their enumeration order is deterministic
    /// for a fixed graph.
    pub fn strongly_connected_components(&self) -> Vec<BTreeSet<FormulaId>> {
        let mut successors: BTreeMap<FormulaId, Vec<FormulaId>> =
            self.nodes.iter().map(|&node| (node, Vec::new())).collect();
        for &(from, to) in &self.edges {
            successors.get_mut(&from).unwrap().push(to);
        }

        let mut next_index = 0_usize;
        let mut indices: BTreeMap<FormulaId, usize> = BTreeMap::new();
        let mut lowlinks: BTreeMap<FormulaId, usize> = BTreeMap::new();
        let mut stack: Vec<FormulaId> = Vec::new();
        let mut on_stack: BTreeSet<FormulaId> = BTreeSet::new();
        let mut components: Vec<BTreeSet<FormulaId>> = Vec::new();

        for &root in &self.nodes {
            if indices.contains_key(&root) {
                continue;
            }
            let mut frames: Vec<(FormulaId, usize)> = vec![(root, 0)];
            indices.insert(root, next_index);
            lowlinks.insert(root, next_index);
            next_index += 1;
            stack.push(root);
            on_stack.insert(root);

            while let Some(&(node, position)) = frames.last() {
                if let Some(&successor) = successors[&node].get(position) {
                    frames.last_mut().unwrap().1 += 1;
                    if !indices.contains_key(&successor) {
                        indices.insert(successor, next_index);
                        lowlinks.insert(successor, next_index);
                        next_index += 1;
                        stack.push(successor);
                        on_stack.insert(successor);
                        frames.push((successor, 0));
                    } else if on_stack.contains(&successor) {
                        let candidate = indices[&successor];
                        if candidate < lowlinks[&node] {
                            lowlinks.insert(node, candidate);
                        }
                    }
                } else {
                    frames.pop();
                    if let Some(&(parent, _)) = frames.last() {
                        let candidate = lowlinks[&node];
                        if candidate < lowlinks[&parent] {
                            lowlinks.insert(parent, candidate);
                        }
                    }
                    if lowlinks[&node] == indices[&node] {
                        let mut component = BTreeSet::new();
                        loop {
                            let member = stack.pop().unwrap();
                            on_stack.remove(&member);
                            component.insert(member);
                            if member == node {
                                break;
                            }
                        }
                        components.push(component);
                    }
                }
            }
        }
        components
    }
}
