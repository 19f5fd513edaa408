//! Graph encoders: padded node features and adjacency in, one vector per
//! graph out.
//!
//! Every encoder is built from [`GraphConv`] layers stacked by [`GcnStack`]
//! and differs in how node embeddings are read out into a graph embedding:
//!
//! * [`GcnEncoderGraph`] (`base`): concatenated per-layer max readout.
//! * [`GcnSet2SetEncoder`] (`base-set2set`): attention-based Set2Set readout.
//! * [`SoftPoolingGcnEncoder`] (`soft-assign`): learned soft clustering into
//!   coarser graphs, with a max readout at every level.

pub mod gcn;
pub mod graph_conv;
pub mod set2set;
pub mod soft_pool;

pub use gcn::{GcnEncoderGraph, GcnStack};
pub use graph_conv::{ConvOptions, GraphConv};
pub use set2set::{GcnSet2SetEncoder, LstmCell, Set2Set};
pub use soft_pool::SoftPoolingGcnEncoder;

use crate::error::SkipgramError;
use graphskip_core::nn::Parameter;
use graphskip_core::{Tensor, TensorError};
use graphskip_data::GraphBatch;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A network mapping a [`GraphBatch`] to a `[B, output_dim]` tensor.
pub trait GraphEncoder: fmt::Debug + Send + Sync {
    /// Encodes every graph of `batch`.
    ///
    /// `dropout_rng` is `Some` in training mode; `None` disables dropout.
    fn encode(&self, batch: &GraphBatch, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError>;

    /// Width of the graph embedding.
    fn output_dim(&self) -> usize;

    fn parameters(&self) -> Vec<&Parameter>;

    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}

/// Available encoder architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncoderKind {
    #[default]
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "base-set2set")]
    BaseSet2Set,
    #[serde(rename = "soft-assign")]
    SoftAssign,
}

impl FromStr for EncoderKind {
    type Err = SkipgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(EncoderKind::Base),
            "base-set2set" => Ok(EncoderKind::BaseSet2Set),
            "soft-assign" => Ok(EncoderKind::SoftAssign),
            other => Err(SkipgramError::Configuration(format!(
                "unknown method {:?} (expected base, base-set2set or soft-assign)",
                other
            ))),
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncoderKind::Base => "base",
            EncoderKind::BaseSet2Set => "base-set2set",
            EncoderKind::SoftAssign => "soft-assign",
        })
    }
}

/// Hyperparameters shared by all encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub embedding_dim: usize,
    /// Graph convolutions per stack, at least 2.
    pub num_layers: usize,
    pub bn: bool,
    pub bias: bool,
    pub dropout: f32,
    /// Padded node count of the batches, used by `soft-assign`.
    pub max_num_nodes: usize,
    /// Processing steps of the Set2Set readout.
    pub s2s_steps: usize,
    pub num_pool: usize,
    pub assign_ratio: f32,
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), SkipgramError> {
        let fail = |msg: String| Err(SkipgramError::Configuration(msg));
        if self.input_dim == 0 || self.hidden_dim == 0 || self.embedding_dim == 0 {
            return fail(format!(
                "encoder dimensions must be positive (input {}, hidden {}, embedding {})",
                self.input_dim, self.hidden_dim, self.embedding_dim
            ));
        }
        if self.num_layers < 2 {
            return fail(format!("need at least 2 graph convolution layers, got {}", self.num_layers));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return fail(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        if self.s2s_steps == 0 {
            return fail("Set2Set needs at least one processing step".to_string());
        }
        if !(self.assign_ratio > 0.0 && self.assign_ratio <= 1.0) {
            return fail(format!("assign ratio must be in (0, 1], got {}", self.assign_ratio));
        }
        Ok(())
    }

    /// Width of the concatenated per-layer node embeddings of one stack.
    pub fn concat_dim(&self) -> usize {
        self.hidden_dim * (self.num_layers - 1) + self.embedding_dim
    }

    pub(crate) fn conv_options(&self) -> ConvOptions {
        ConvOptions {
            add_self: false,
            bias: self.bias,
            dropout: self.dropout,
            normalize: true,
        }
    }
}

/// Builds an encoder of the given kind.
pub fn build_encoder<R: Rng + ?Sized>(
    kind: EncoderKind,
    config: &EncoderConfig,
    rng: &mut R,
) -> Result<Box<dyn GraphEncoder>, SkipgramError> {
    config.validate()?;
    Ok(match kind {
        EncoderKind::Base => Box::new(GcnEncoderGraph::new(config, rng)?),
        EncoderKind::BaseSet2Set => Box::new(GcnSet2SetEncoder::new(config, rng)?),
        EncoderKind::SoftAssign => Box::new(SoftPoolingGcnEncoder::new(config, rng)?),
    })
}

/// Short reborrow of an optional dropout RNG, so one generator can feed
/// several layers in turn.
pub fn reborrow_rng<'a>(rng: &'a mut Option<&mut dyn RngCore>) -> Option<&'a mut dyn RngCore> {
    rng.as_mut().map(|r| &mut **r as &mut dyn RngCore)
}

/// `[B, N, 1]` tensor holding `1` for the first `num_nodes[b]` rows of graph
/// `b` and `0` for padding.
pub fn node_mask(num_nodes: &[usize], max_num_nodes: usize) -> Result<Tensor, TensorError> {
    let mut mask = vec![0.0; num_nodes.len() * max_num_nodes];
    for (b, &n) in num_nodes.iter().enumerate() {
        let valid = n.min(max_num_nodes);
        mask[b * max_num_nodes..b * max_num_nodes + valid].fill(1.0);
    }
    Tensor::new(mask, vec![num_nodes.len(), max_num_nodes, 1])
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
