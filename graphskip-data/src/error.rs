use graphskip_core::TensorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, featurising or batching graphs.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Required dataset file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("Malformed line {line} in {file}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Inconsistent dataset {dataset}: {message}")]
    Inconsistent { dataset: String, message: String },

    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Graph with {num_nodes} nodes does not fit the padded size {max_nodes}")]
    GraphTooLarge { num_nodes: usize, max_nodes: usize },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tensor(#[from] TensorError),
}
