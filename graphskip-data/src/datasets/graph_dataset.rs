use super::traits::Dataset;
use crate::error::DataError;
use crate::graph::Graph;
use std::sync::Arc;

/// Shared, immutable list of graphs.
///
/// Items are `(index, graph)` pairs so that the skip-gram sampler can tell
/// a target apart from its candidate negatives.
#[derive(Debug, Clone, Default)]
pub struct GraphDataset {
    graphs: Arc<Vec<Graph>>,
}

impl GraphDataset {
    pub fn new(graphs: Vec<Graph>) -> Self {
        GraphDataset {
            graphs: Arc::new(graphs),
        }
    }

    /// Concatenation of several datasets, in order.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a GraphDataset>) -> Self {
        let graphs: Vec<Graph> = parts
            .into_iter()
            .flat_map(|d| d.graphs.iter().cloned())
            .collect();
        GraphDataset::new(graphs)
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn labels(&self) -> Vec<usize> {
        self.graphs.iter().map(|g| g.label).collect()
    }

    pub fn num_classes(&self) -> usize {
        self.graphs.iter().map(|g| g.label + 1).max().unwrap_or(0)
    }
}

impl Dataset for GraphDataset {
    type Item = (usize, Graph);

    fn get(&self, index: usize) -> Result<Self::Item, DataError> {
        self.graphs
            .get(index)
            .map(|g| (index, g.clone()))
            .ok_or(DataError::IndexOutOfBounds {
                index,
                len: self.graphs.len(),
            })
    }

    fn len(&self) -> usize {
        self.graphs.len()
    }
}

#[cfg(test)]
#[path = "graph_dataset_test.rs"]
mod tests;
