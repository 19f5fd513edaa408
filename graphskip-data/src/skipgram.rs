//! Target, context and negative graph selection for the skip-gram objective.

use crate::datasets::{Dataset, GraphDataset};
use crate::error::DataError;
use crate::graph::Graph;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Graphs for one training step.
///
/// `u[b]` and `v[b]` are the target and context of the `b`-th example;
/// `negatives[b * neg_num + k]` is its `k`-th negative.
#[derive(Debug, Clone)]
pub struct SkipgramBatch {
    pub targets: Vec<usize>,
    pub u: Vec<Graph>,
    pub v: Vec<Graph>,
    pub negatives: Vec<Graph>,
    pub neg_num: usize,
}

impl SkipgramBatch {
    pub fn batch_size(&self) -> usize {
        self.targets.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SkipgramSampler {
    neg_num: usize,
    permutate: bool,
}

impl SkipgramSampler {
    pub fn new(neg_num: usize, permutate: bool) -> Result<Self, DataError> {
        if neg_num == 0 {
            return Err(DataError::Configuration(
                "number of negative samples must be positive".to_string(),
            ));
        }
        Ok(SkipgramSampler { neg_num, permutate })
    }

    pub fn neg_num(&self) -> usize {
        self.neg_num
    }

    pub fn permutate(&self) -> bool {
        self.permutate
    }

    /// Builds the skip-gram batch for `targets`, indices into `dataset`.
    ///
    /// The context of a target is the target graph itself, with its nodes
    /// randomly relabelled when permutation is enabled. Negatives are drawn
    /// uniformly with replacement from every other graph of `dataset`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        targets: &[usize],
        dataset: &GraphDataset,
        rng: &mut R,
    ) -> Result<SkipgramBatch, DataError> {
        let len = dataset.len();
        if len < 2 {
            return Err(DataError::Configuration(format!(
                "negative sampling needs at least 2 graphs, dataset has {}",
                len
            )));
        }
        let mut u = Vec::with_capacity(targets.len());
        let mut v = Vec::with_capacity(targets.len());
        let mut negatives = Vec::with_capacity(targets.len() * self.neg_num);
        for &target in targets {
            let (_, graph) = dataset.get(target)?;
            v.push(if self.permutate {
                random_permutation(&graph, rng)?
            } else {
                graph.clone()
            });
            u.push(graph);
            for _ in 0..self.neg_num {
                // Uniform over 0..len without `target`.
                let mut neg = rng.gen_range(0..len - 1);
                if neg >= target {
                    neg += 1;
                }
                negatives.push(dataset.get(neg)?.1);
            }
        }
        debug!(
            "skip-gram batch: {} targets, {} negatives",
            targets.len(),
            negatives.len()
        );
        Ok(SkipgramBatch {
            targets: targets.to_vec(),
            u,
            v,
            negatives,
            neg_num: self.neg_num,
        })
    }
}

/// `graph` with its nodes relabelled by a uniformly random permutation.
pub fn random_permutation<R: Rng + ?Sized>(graph: &Graph, rng: &mut R) -> Result<Graph, DataError> {
    let mut perm: Vec<usize> = (0..graph.num_nodes).collect();
    perm.shuffle(rng);
    graph.permuted(&perm)
}

#[cfg(test)]
#[path = "skipgram_test.rs"]
mod tests;
