use super::normalized_adjacency;
use crate::features::{FeatureType, GraphFeaturizer};
use crate::graph::Graph;
use approx::assert_relative_eq;

#[test]
fn test_normalized_adjacency_path() {
    // 0 - 1 - 2, degrees 1, 2, 1
    let g = Graph::new(3, [(0, 1), (1, 2)], 0).unwrap();
    let adj = normalized_adjacency(&g);
    let w = 1.0 / 2.0f32.sqrt();
    let expected = [0.0, w, 0.0, w, 0.0, w, 0.0, w, 0.0];
    for (a, e) in adj.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = 1e-6);
    }
}

#[test]
fn test_isolated_node_row_stays_zero() {
    let g = Graph::new(3, [(0, 1)], 0).unwrap();
    let adj = normalized_adjacency(&g);
    assert!(adj[6..9].iter().all(|v| *v == 0.0));
    assert!(adj.iter().all(|v| v.is_finite()));
}

#[test]
fn test_collate_pads_and_keeps_labels() {
    let small = Graph::new(2, [(0, 1)], 1).unwrap();
    let large = Graph::new(3, [(0, 1), (1, 2), (0, 2)], 0).unwrap();
    let featurizer = GraphFeaturizer::fit(FeatureType::Deg, 0, [&small, &large]).unwrap();
    let batch = featurizer.collate([&small, &large]).unwrap();

    assert_eq!(batch.batch_size(), 2);
    assert_eq!(batch.max_num_nodes(), 3);
    assert_eq!(batch.adj.shape(), vec![2, 3, 3]);
    assert_eq!(batch.feats.shape(), vec![2, 3, 11]);
    assert_eq!(batch.num_nodes, vec![2, 3]);
    assert_eq!(batch.labels, vec![1, 0]);

    let adj = batch.adj.get_f32_data().unwrap();
    // The padded third node of the first graph has no entries.
    assert!(adj[6..9].iter().all(|v| *v == 0.0));
    assert!((0..3).all(|i| adj[i * 3 + 2] == 0.0));
    assert_relative_eq!(adj[1], 1.0, epsilon = 1e-6);
    // Triangle: every degree is 2.
    assert_relative_eq!(adj[9 + 1], 0.5, epsilon = 1e-6);

    let feats = batch.feats.get_f32_data().unwrap();
    assert_eq!(feats[1], 1.0);
    assert!(feats[22..33].iter().all(|v| *v == 0.0));
    assert_eq!(batch.assign_feats.get_f32_data().unwrap(), feats);
}

#[test]
fn test_collate_rejects_empty_and_oversized() {
    let g = Graph::new(2, [(0, 1)], 0).unwrap();
    let featurizer = GraphFeaturizer::fit(FeatureType::Default, 2, [&g]).unwrap();
    let none: Vec<&Graph> = Vec::new();
    assert!(featurizer.collate(none).is_err());
    let big = Graph::new(4, [(0, 1)], 0).unwrap();
    assert!(featurizer.collate([&big]).is_err());
}
