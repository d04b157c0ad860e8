mod relation_graph;
mod relation_graph_generator;

pub use relation_graph::*;
pub use relation_graph_generator::*;
