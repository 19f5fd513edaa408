pub mod graph_dataset;
pub mod traits;

pub use graph_dataset::GraphDataset;
pub use traits::Dataset;
