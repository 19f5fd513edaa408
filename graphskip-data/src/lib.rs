//! Graph benchmark data for graphskip: the in-memory [`Graph`] model, the TU
//! dataset reader, node featurisation with padded batch collation, the
//! `Dataset`/`Sampler`/`DataLoader` trio and skip-gram pair sampling.

pub mod batch;
pub mod dataloader;
pub mod datasets;
pub mod error;
pub mod features;
pub mod graph;
pub mod samplers;
pub mod skipgram;
pub mod tu;

pub use batch::GraphBatch;
pub use dataloader::DataLoader;
pub use datasets::{Dataset, GraphDataset};
pub use error::DataError;
pub use features::{FeatureType, GraphFeaturizer, NodeInputs};
pub use graph::Graph;
pub use skipgram::{SkipgramBatch, SkipgramSampler};
pub use tu::{extension_datasets, read_graphfile};
