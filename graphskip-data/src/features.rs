//! Node feature construction.

use crate::error::DataError;
use crate::graph::Graph;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Degrees above this value share the last one-hot slot.
pub const MAX_DEGREE: usize = 10;

/// How node features are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureType {
    /// Node attributes when every graph has them, otherwise one-hot node
    /// labels, otherwise a constant `1`.
    #[default]
    Default,
    /// One-hot node index over `max_num_nodes`.
    Id,
    /// One-hot node degree, capped at [`MAX_DEGREE`].
    Deg,
}

impl FromStr for FeatureType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(FeatureType::Default),
            "id" => Ok(FeatureType::Id),
            "deg" => Ok(FeatureType::Deg),
            other => Err(DataError::Configuration(format!(
                "unknown feature type {:?} (expected default, id or deg)",
                other
            ))),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureType::Default => "default",
            FeatureType::Id => "id",
            FeatureType::Deg => "deg",
        };
        f.write_str(name)
    }
}

/// Which per-node inputs of the dataset [`FeatureType::Default`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInputs {
    pub labels: bool,
    pub attributes: bool,
}

impl Default for NodeInputs {
    fn default() -> Self {
        NodeInputs {
            labels: true,
            attributes: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Attributes(usize),
    NodeLabels(usize),
    Constant,
    Identity,
    Degree,
}

/// Turns graphs into fixed-width node feature matrices.
///
/// The padded size and feature width are fixed at construction from every
/// graph the featurizer will see, so that training and extension datasets
/// share the same encoder input shape.
#[derive(Debug, Clone)]
pub struct GraphFeaturizer {
    feature: FeatureType,
    max_num_nodes: usize,
    source: Source,
}

impl GraphFeaturizer {
    /// `max_num_nodes == 0` means "largest graph in `graphs`".
    pub fn fit<'a>(
        feature: FeatureType,
        max_num_nodes: usize,
        graphs: impl IntoIterator<Item = &'a Graph>,
    ) -> Result<Self, DataError> {
        Self::fit_with_inputs(feature, NodeInputs::default(), max_num_nodes, graphs)
    }

    /// Like [`fit`](Self::fit), but node labels or attributes switched off in
    /// `inputs` are never used as the default source.
    pub fn fit_with_inputs<'a>(
        feature: FeatureType,
        inputs: NodeInputs,
        max_num_nodes: usize,
        graphs: impl IntoIterator<Item = &'a Graph>,
    ) -> Result<Self, DataError> {
        let graphs: Vec<&Graph> = graphs.into_iter().collect();
        if graphs.is_empty() {
            return Err(DataError::Configuration(
                "cannot build features for an empty dataset".to_string(),
            ));
        }
        let largest = graphs.iter().map(|g| g.num_nodes).max().unwrap_or(0);
        let max_num_nodes = if max_num_nodes == 0 { largest } else { max_num_nodes };
        if largest > max_num_nodes {
            return Err(DataError::GraphTooLarge {
                num_nodes: largest,
                max_nodes: max_num_nodes,
            });
        }

        let source = match feature {
            FeatureType::Id => Source::Identity,
            FeatureType::Deg => Source::Degree,
            FeatureType::Default => {
                let attr_dims: Vec<Option<usize>> = graphs
                    .iter()
                    .map(|g| match &g.node_attrs {
                        Some(rows) => Some(rows.first().map_or(0, |r| r.len())),
                        None => None,
                    })
                    .collect();
                let attr_dim = attr_dims.iter().flatten().copied().max().unwrap_or(0);
                let num_labels = graphs
                    .iter()
                    .filter_map(|g| g.node_labels.as_ref())
                    .flat_map(|l| l.iter().copied())
                    .max()
                    .map(|m| m + 1);
                let all_labelled = graphs.iter().all(|g| g.node_labels.is_some());
                if inputs.attributes && attr_dim > 0 && attr_dims.iter().all(|d| d.is_some()) {
                    Source::Attributes(attr_dim)
                } else if let Some(k) = num_labels.filter(|_| inputs.labels && all_labelled) {
                    Source::NodeLabels(k)
                } else {
                    Source::Constant
                }
            }
        };
        debug!(
            "featurizer: feature={}, max_num_nodes={}, source={:?}",
            feature, max_num_nodes, source
        );
        Ok(GraphFeaturizer {
            feature,
            max_num_nodes,
            source,
        })
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature
    }

    /// Padded node count of every collated batch.
    pub fn max_num_nodes(&self) -> usize {
        self.max_num_nodes
    }

    /// Width of a node feature row.
    pub fn feat_dim(&self) -> usize {
        match self.source {
            Source::Attributes(d) | Source::NodeLabels(d) => d,
            Source::Constant => 1,
            Source::Identity => self.max_num_nodes,
            Source::Degree => MAX_DEGREE + 1,
        }
    }

    /// Row-major `num_nodes x feat_dim` features of `graph`.
    pub fn node_features(&self, graph: &Graph) -> Result<Vec<f32>, DataError> {
        let n = graph.num_nodes;
        if n > self.max_num_nodes {
            return Err(DataError::GraphTooLarge {
                num_nodes: n,
                max_nodes: self.max_num_nodes,
            });
        }
        let dim = self.feat_dim();
        let mut feats = vec![0.0; n * dim];
        match self.source {
            Source::Attributes(_) => {
                let rows = graph.node_attrs.as_ref().ok_or_else(|| {
                    DataError::Configuration("graph has no node attributes".to_string())
                })?;
                for (i, row) in rows.iter().enumerate().take(n) {
                    for (j, v) in row.iter().enumerate().take(dim) {
                        feats[i * dim + j] = *v;
                    }
                }
            }
            Source::NodeLabels(_) => {
                let labels = graph.node_labels.as_ref().ok_or_else(|| {
                    DataError::Configuration("graph has no node labels".to_string())
                })?;
                for (i, &l) in labels.iter().enumerate().take(n) {
                    if l < dim {
                        feats[i * dim + l] = 1.0;
                    }
                }
            }
            Source::Constant => feats.fill(1.0),
            Source::Identity => {
                for i in 0..n {
                    feats[i * dim + i] = 1.0;
                }
            }
            Source::Degree => {
                for (i, d) in graph.degrees().into_iter().enumerate() {
                    feats[i * dim + d.min(MAX_DEGREE)] = 1.0;
                }
            }
        }
        Ok(feats)
    }
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
