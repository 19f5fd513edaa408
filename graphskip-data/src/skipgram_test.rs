use super::{random_permutation, SkipgramSampler};
use crate::datasets::GraphDataset;
use crate::graph::Graph;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn dataset(n: usize) -> GraphDataset {
    // Graph i is a path on i + 2 nodes, so graphs are told apart by size.
    GraphDataset::new(
        (0..n)
            .map(|i| Graph::new(i + 2, (0..i + 1).map(|k| (k, k + 1)), i % 3).unwrap())
            .collect(),
    )
}

#[test]
fn test_negatives_exclude_target() {
    let ds = dataset(4);
    let sampler = SkipgramSampler::new(50, false).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let batch = sampler.sample(&[0, 2], &ds, &mut rng).unwrap();
    assert_eq!(batch.batch_size(), 2);
    assert_eq!(batch.negatives.len(), 100);
    for (b, &target) in batch.targets.iter().enumerate() {
        let target_nodes = target + 2;
        let negs = &batch.negatives[b * 50..(b + 1) * 50];
        assert!(negs.iter().all(|g| g.num_nodes != target_nodes));
        // Every other graph shows up among fifty draws.
        for other in (0..4).filter(|o| *o != target) {
            assert!(negs.iter().any(|g| g.num_nodes == other + 2));
        }
    }
}

#[test]
fn test_context_is_target_without_permutation() {
    let ds = dataset(3);
    let sampler = SkipgramSampler::new(1, false).unwrap();
    let batch = sampler.sample(&[1], &ds, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(batch.u, batch.v);
    assert_eq!(batch.u[0], ds.graphs()[1]);
}

#[test]
fn test_permuted_context_keeps_structure() {
    let ds = dataset(6);
    let sampler = SkipgramSampler::new(2, true).unwrap();
    assert!(sampler.permutate());
    let batch = sampler.sample(&[5], &ds, &mut StdRng::seed_from_u64(9)).unwrap();
    let (u, v) = (&batch.u[0], &batch.v[0]);
    assert_eq!(u.num_nodes, v.num_nodes);
    assert_eq!(u.edges.len(), v.edges.len());
    let mut du = u.degrees();
    let mut dv = v.degrees();
    du.sort_unstable();
    dv.sort_unstable();
    assert_eq!(du, dv);
    assert_eq!(u.label, v.label);
}

#[test]
fn test_sampler_errors() {
    assert!(SkipgramSampler::new(0, false).is_err());
    let sampler = SkipgramSampler::new(1, false).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(sampler.sample(&[0], &dataset(1), &mut rng).is_err());
    assert!(sampler.sample(&[7], &dataset(3), &mut rng).is_err());
}

#[test]
fn test_random_permutation_moves_labels_with_nodes() {
    let g = Graph::new(3, [(0, 1)], 0).unwrap().with_node_labels(vec![4, 5, 6]);
    let p = random_permutation(&g, &mut StdRng::seed_from_u64(2)).unwrap();
    let mut labels = p.node_labels.clone().unwrap();
    labels.sort_unstable();
    assert_eq!(labels, vec![4, 5, 6]);
    let isolated = p.degrees().iter().position(|d| *d == 0).unwrap();
    assert_eq!(p.node_labels.unwrap()[isolated], 6);
}
