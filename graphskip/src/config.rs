//! Training configuration.

use crate::encoders::{EncoderConfig, EncoderKind};
use crate::error::SkipgramError;
use graphskip_data::{FeatureType, NodeInputs};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

/// Everything a training run depends on. Serialised next to the run's
/// outputs so that a run can be reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub datadir: PathBuf,
    /// Benchmark name, e.g. `MUTAG`.
    pub dataset: String,
    /// Graphs with more nodes are dropped; `0` keeps every graph.
    pub max_num_nodes: usize,
    #[serde(with = "feature_type_name")]
    pub feature: FeatureType,
    /// Let `feature = default` use node labels.
    pub node_labels: bool,
    /// Let `feature = default` use node attributes.
    pub node_attrs: bool,
    pub lr: f32,
    /// Maximum global gradient norm.
    pub clip: Option<f32>,
    pub batch_size: usize,
    pub epochs: usize,
    pub log_interval: usize,
    pub hidden_dim: usize,
    pub embedding_dim: usize,
    pub num_gc_layers: usize,
    pub bn: bool,
    pub bias: bool,
    pub dropout: f32,
    pub method: EncoderKind,
    pub neg_sampling_num: usize,
    /// Use a node-permuted copy of the target as its context.
    pub permutate: bool,
    /// Also train on the extension datasets of `dataset`.
    pub extend: bool,
    pub logdir: Option<PathBuf>,
    pub seed: u64,
    pub s2s_steps: usize,
    pub num_pool: usize,
    pub assign_ratio: f32,
    pub lr_decay_step: Option<usize>,
    pub lr_decay_gamma: f32,
    pub eval_folds: usize,
    /// Averaged passes when extracting embeddings for evaluation.
    pub eval_permutations: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            datadir: PathBuf::from("data"),
            dataset: String::new(),
            max_num_nodes: 0,
            feature: FeatureType::Default,
            node_labels: true,
            node_attrs: true,
            lr: 0.001,
            clip: None,
            batch_size: 20,
            epochs: 100_000,
            log_interval: 100,
            hidden_dim: 50,
            embedding_dim: 100,
            num_gc_layers: 3,
            bn: true,
            bias: true,
            dropout: 0.0,
            method: EncoderKind::Base,
            neg_sampling_num: 20,
            permutate: false,
            extend: false,
            logdir: None,
            seed: 0,
            s2s_steps: 3,
            num_pool: 1,
            assign_ratio: 0.25,
            lr_decay_step: None,
            lr_decay_gamma: 0.1,
            eval_folds: 10,
            eval_permutations: 1,
        }
    }
}

impl TrainConfig {
    /// Checks the values that do not depend on the loaded data.
    pub fn validate(&self) -> Result<(), SkipgramError> {
        let fail = |msg: String| Err(SkipgramError::Configuration(msg));
        if self.dataset.is_empty() {
            return fail("no dataset name given".to_string());
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            return fail(format!("learning rate must be positive, got {}", self.lr));
        }
        if let Some(clip) = self.clip {
            if !(clip > 0.0) {
                return fail(format!("clip must be positive, got {}", clip));
            }
        }
        if self.batch_size == 0 || self.epochs == 0 || self.log_interval == 0 {
            return fail(format!(
                "batch size, epochs and log interval must be positive (got {}, {}, {})",
                self.batch_size, self.epochs, self.log_interval
            ));
        }
        if self.neg_sampling_num == 0 {
            return fail("number of negative samples must be positive".to_string());
        }
        if self.lr_decay_step == Some(0) || !(self.lr_decay_gamma > 0.0) {
            return fail(format!(
                "invalid learning rate decay (step {:?}, gamma {})",
                self.lr_decay_step, self.lr_decay_gamma
            ));
        }
        if self.eval_folds < 2 || self.eval_permutations == 0 {
            return fail(format!(
                "evaluation needs at least 2 folds and 1 pass (got {}, {})",
                self.eval_folds, self.eval_permutations
            ));
        }
        // Encoder-level checks that do not need the input width.
        self.encoder_config(1, 1).validate()
    }

    pub fn node_inputs(&self) -> NodeInputs {
        NodeInputs {
            labels: self.node_labels,
            attributes: self.node_attrs,
        }
    }

    /// Encoder hyperparameters for inputs of width `input_dim` padded to
    /// `max_num_nodes` nodes.
    pub fn encoder_config(&self, input_dim: usize, max_num_nodes: usize) -> EncoderConfig {
        EncoderConfig {
            input_dim,
            hidden_dim: self.hidden_dim,
            embedding_dim: self.embedding_dim,
            num_layers: self.num_gc_layers,
            bn: self.bn,
            bias: self.bias,
            dropout: self.dropout,
            max_num_nodes,
            s2s_steps: self.s2s_steps,
            num_pool: self.num_pool,
            assign_ratio: self.assign_ratio,
        }
    }

    /// Writes the configuration as pretty JSON to `dir/config.json`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SkipgramError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote configuration to {}", path.display());
        Ok(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SkipgramError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// (De)serialises a [`FeatureType`] by its command-line name.
mod feature_type_name {
    use graphskip_data::FeatureType;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(feature: &FeatureType, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(feature)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FeatureType, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
