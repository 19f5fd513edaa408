//! Fixtures shared by the unit tests of this crate.

use crate::encoders::EncoderConfig;
use graphskip_data::{FeatureType, Graph, GraphBatch, GraphFeaturizer};

/// A triangle, a 4-path, a 5-star and a 3-path with two class labels.
pub fn toy_graphs() -> Vec<Graph> {
    vec![
        Graph::new(3, [(0, 1), (1, 2), (0, 2)], 0).unwrap(),
        Graph::new(4, [(0, 1), (1, 2), (2, 3)], 1).unwrap(),
        Graph::new(5, [(0, 1), (0, 2), (0, 3), (0, 4)], 1).unwrap(),
        Graph::new(3, [(0, 1), (1, 2)], 0).unwrap(),
    ]
}

pub fn degree_featurizer(graphs: &[Graph], max_num_nodes: usize) -> GraphFeaturizer {
    GraphFeaturizer::fit(FeatureType::Deg, max_num_nodes, graphs).unwrap()
}

pub fn toy_batch() -> GraphBatch {
    let graphs = toy_graphs();
    degree_featurizer(&graphs, 0).collate(&graphs).unwrap()
}

pub fn small_config(input_dim: usize, max_num_nodes: usize) -> EncoderConfig {
    EncoderConfig {
        input_dim,
        hidden_dim: 6,
        embedding_dim: 5,
        num_layers: 3,
        bn: true,
        bias: true,
        dropout: 0.0,
        max_num_nodes,
        s2s_steps: 3,
        num_pool: 1,
        assign_ratio: 0.5,
    }
}
