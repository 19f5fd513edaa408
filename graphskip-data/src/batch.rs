//! Padded, dense batches of graphs ready for the encoders.

use crate::error::DataError;
use crate::features::GraphFeaturizer;
use crate::graph::Graph;
use graphskip_core::Tensor;
use log::debug;

/// A batch of `B` graphs padded to `N = max_num_nodes` nodes.
///
/// Rows and columns past `num_nodes[b]` are zero in every tensor.
#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// `[B, N, N]`, symmetrically normalised `D^-1/2 A D^-1/2`.
    pub adj: Tensor,
    /// `[B, N, F]` node features.
    pub feats: Tensor,
    /// `[B, N, F]` features fed to the soft-assignment network.
    pub assign_feats: Tensor,
    pub num_nodes: Vec<usize>,
    pub labels: Vec<usize>,
}

impl GraphBatch {
    pub fn batch_size(&self) -> usize {
        self.num_nodes.len()
    }

    /// Padded node count `N`.
    pub fn max_num_nodes(&self) -> usize {
        self.adj.shape()[1]
    }

    pub fn feat_dim(&self) -> usize {
        self.feats.shape()[2]
    }
}

/// `D^-1/2 A D^-1/2` of a single graph. Isolated nodes keep a zero row.
pub fn normalized_adjacency(graph: &Graph) -> Vec<f32> {
    let n = graph.num_nodes;
    let mut adj = graph.adjacency();
    let inv_sqrt: Vec<f32> = graph
        .degrees()
        .into_iter()
        .map(|d| if d == 0 { 0.0 } else { 1.0 / (d as f32).sqrt() })
        .collect();
    for i in 0..n {
        for j in 0..n {
            adj[i * n + j] *= inv_sqrt[i] * inv_sqrt[j];
        }
    }
    adj
}

impl GraphFeaturizer {
    /// Stacks `graphs` into a [`GraphBatch`] padded to [`max_num_nodes`](Self::max_num_nodes).
    pub fn collate<'a>(&self, graphs: impl IntoIterator<Item = &'a Graph>) -> Result<GraphBatch, DataError> {
        let graphs: Vec<&Graph> = graphs.into_iter().collect();
        if graphs.is_empty() {
            return Err(DataError::Configuration("cannot collate an empty batch".to_string()));
        }
        let b = graphs.len();
        let n = self.max_num_nodes();
        let f = self.feat_dim();
        let mut adj = vec![0.0; b * n * n];
        let mut feats = vec![0.0; b * n * f];
        for (k, graph) in graphs.iter().enumerate() {
            let m = graph.num_nodes;
            if m > n {
                return Err(DataError::GraphTooLarge {
                    num_nodes: m,
                    max_nodes: n,
                });
            }
            let local = normalized_adjacency(graph);
            for i in 0..m {
                let dst = k * n * n + i * n;
                adj[dst..dst + m].copy_from_slice(&local[i * m..(i + 1) * m]);
            }
            let x = self.node_features(graph)?;
            let dst = k * n * f;
            feats[dst..dst + m * f].copy_from_slice(&x);
        }
        debug!("collated {} graphs padded to {} nodes, {} features", b, n, f);
        let feats = Tensor::new(feats, vec![b, n, f])?;
        Ok(GraphBatch {
            adj: Tensor::new(adj, vec![b, n, n])?,
            assign_feats: feats.clone(),
            feats,
            num_nodes: graphs.iter().map(|g| g.num_nodes).collect(),
            labels: graphs.iter().map(|g| g.label).collect(),
        })
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
