//! In-memory undirected graph.

use crate::error::DataError;

/// An undirected graph with optional node labels and node attributes and a
/// graph-level class label.
///
/// Edges are stored once as `(min, max)` pairs, deduplicated. A self loop
/// `(u, u)` is kept and contributes a `1` on the adjacency diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub num_nodes: usize,
    pub edges: Vec<(usize, usize)>,
    pub node_labels: Option<Vec<usize>>,
    pub node_attrs: Option<Vec<Vec<f32>>>,
    pub label: usize,
}

impl Graph {
    /// Builds a graph, normalising and deduplicating `edges`.
    pub fn new(num_nodes: usize, edges: impl IntoIterator<Item = (usize, usize)>, label: usize) -> Result<Self, DataError> {
        let mut normalised: Vec<(usize, usize)> = Vec::new();
        for (u, v) in edges {
            if u >= num_nodes || v >= num_nodes {
                return Err(DataError::Configuration(format!(
                    "edge ({}, {}) references a node outside 0..{}",
                    u, v, num_nodes
                )));
            }
            normalised.push((u.min(v), u.max(v)));
        }
        normalised.sort_unstable();
        normalised.dedup();
        Ok(Graph {
            num_nodes,
            edges: normalised,
            node_labels: None,
            node_attrs: None,
            label,
        })
    }

    pub fn with_node_labels(mut self, labels: Vec<usize>) -> Self {
        self.node_labels = Some(labels);
        self
    }

    pub fn with_node_attrs(mut self, attrs: Vec<Vec<f32>>) -> Self {
        self.node_attrs = Some(attrs);
        self
    }

    /// Dense symmetric adjacency matrix, row-major `num_nodes x num_nodes`.
    pub fn adjacency(&self) -> Vec<f32> {
        let n = self.num_nodes;
        let mut adj = vec![0.0; n * n];
        for &(u, v) in &self.edges {
            adj[u * n + v] = 1.0;
            adj[v * n + u] = 1.0;
        }
        adj
    }

    /// Row sums of the adjacency matrix.
    pub fn degrees(&self) -> Vec<usize> {
        let mut deg = vec![0; self.num_nodes];
        for &(u, v) in &self.edges {
            deg[u] += 1;
            if u != v {
                deg[v] += 1;
            }
        }
        deg
    }

    /// Relabels node `i` as `perm[i]`. Structure, labels and attributes move
    /// with their node.
    pub fn permuted(&self, perm: &[usize]) -> Result<Graph, DataError> {
        let n = self.num_nodes;
        let mut seen = vec![false; n];
        if perm.len() != n || perm.iter().any(|&p| p >= n || std::mem::replace(&mut seen[p], true)) {
            return Err(DataError::Configuration(format!(
                "not a permutation of 0..{}",
                n
            )));
        }
        let mut graph = Graph::new(n, self.edges.iter().map(|&(u, v)| (perm[u], perm[v])), self.label)?;
        if let Some(labels) = &self.node_labels {
            let mut moved = vec![0; n];
            for (i, l) in labels.iter().enumerate() {
                moved[perm[i]] = *l;
            }
            graph.node_labels = Some(moved);
        }
        if let Some(attrs) = &self.node_attrs {
            let mut moved = vec![Vec::new(); n];
            for (i, a) in attrs.iter().enumerate() {
                moved[perm[i]] = a.clone();
            }
            graph.node_attrs = Some(moved);
        }
        Ok(graph)
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
