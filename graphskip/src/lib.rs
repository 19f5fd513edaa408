//! Skip-gram training of whole-graph embeddings.
//!
//! A target graph and a context graph are encoded by two graph
//! convolutional encoders (`base`, `base-set2set` or `soft-assign`),
//! projected to a shared embedding space and scored by dot product against
//! uniformly drawn negative graphs. The [`Trainer`] runs the epoch loop and
//! periodically evaluates the learned embeddings with a k-fold logistic
//! regression.

pub mod config;
pub mod encoders;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod trainer;

#[cfg(test)]
mod testing;

pub use config::TrainConfig;
pub use encoders::{build_encoder, EncoderConfig, EncoderKind, GraphEncoder};
pub use error::SkipgramError;
pub use evaluate::{evaluate_embeddings, EvalOptions, EvalReport};
pub use model::GraphSkipgram;
pub use trainer::{load_datasets, EpochSummary, Trainer};
