use graphskip_core::TensorError;
use graphskip_data::DataError;
use thiserror::Error;

/// Errors raised by the encoders, the skip-gram model and training.
#[derive(Error, Debug)]
pub enum SkipgramError {
    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Batch mismatch: {0}")]
    BatchMismatch(String),

    #[error("Training diverged at epoch {epoch}: loss is {loss}")]
    Diverged { epoch: usize, loss: f32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
