use super::gcn::GcnStack;
use super::{node_mask, EncoderConfig, GraphEncoder};
use crate::error::SkipgramError;
use graphskip_core::nn::module::prefixed;
use graphskip_core::nn::{init, Linear, Module, Parameter};
use graphskip_core::ops::cat;
use graphskip_core::tensor;
use graphskip_core::{Tensor, TensorError};
use graphskip_data::GraphBatch;
use log::debug;
use rand::{Rng, RngCore};

/// Single-layer LSTM cell with gates ordered input, forget, cell, output.
#[derive(Debug)]
pub struct LstmCell {
    input_to_hidden: Linear,
    hidden_to_hidden: Linear,
    hidden_dim: usize,
}

impl LstmCell {
    /// All weights and biases drawn from `U(-1/sqrt(hidden), 1/sqrt(hidden))`.
    pub fn new<R: Rng + ?Sized>(input_dim: usize, hidden_dim: usize, rng: &mut R) -> Result<Self, TensorError> {
        let input_to_hidden = Linear::new(input_dim, 4 * hidden_dim, true, rng)?;
        let hidden_to_hidden = Linear::new(hidden_dim, 4 * hidden_dim, true, rng)?;
        let bound = 1.0 / (hidden_dim as f32).sqrt();
        for p in input_to_hidden.parameters().into_iter().chain(hidden_to_hidden.parameters()) {
            init::uniform_(p, -bound, bound, rng)?;
        }
        Ok(LstmCell {
            input_to_hidden,
            hidden_to_hidden,
            hidden_dim,
        })
    }

    /// One step on `x [B, input_dim]` from state `(h, c)`, both `[B, hidden]`.
    /// Returns the new `(h, c)`.
    pub fn step(&self, x: &Tensor, h: &Tensor, c: &Tensor) -> Result<(Tensor, Tensor), TensorError> {
        let d = self.hidden_dim;
        let gates = self.input_to_hidden.forward(x)?.add(&self.hidden_to_hidden.forward(h)?)?;
        let input_gate = gates.narrow(1, 0, d)?.sigmoid()?;
        let forget_gate = gates.narrow(1, d, d)?.sigmoid()?;
        let cell_gate = gates.narrow(1, 2 * d, d)?.tanh()?;
        let output_gate = gates.narrow(1, 3 * d, d)?.sigmoid()?;
        let c_next = forget_gate.mul(c)?.add(&input_gate.mul(&cell_gate)?)?;
        let h_next = output_gate.mul(&c_next.tanh()?)?;
        Ok((h_next, c_next))
    }

    pub fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("input_to_hidden", self.input_to_hidden.named_parameters());
        named.extend(prefixed("hidden_to_hidden", self.hidden_to_hidden.named_parameters()));
        named
    }
}

/// Set2Set readout over a padded set of `input_dim` vectors.
///
/// Each step queries the set with the LSTM output `q`, attends over the valid
/// rows with a softmax of `<x_i, q>`, and feeds `q* = [q, r]` back into the
/// LSTM. The final `q*` goes through `ReLU(Linear(2d -> d))`.
#[derive(Debug)]
pub struct Set2Set {
    lstm: LstmCell,
    pred: Linear,
    input_dim: usize,
    steps: usize,
}

impl Set2Set {
    pub fn new<R: Rng + ?Sized>(input_dim: usize, steps: usize, rng: &mut R) -> Result<Self, TensorError> {
        if steps == 0 {
            return Err(TensorError::ConfigurationError(
                "Set2Set needs at least one processing step".to_string(),
            ));
        }
        Ok(Set2Set {
            lstm: LstmCell::new(2 * input_dim, input_dim, rng)?,
            pred: Linear::new(2 * input_dim, input_dim, true, rng)?,
            input_dim,
            steps,
        })
    }

    /// `embedding` is `[B, N, input_dim]`; only the first `counts[b]` rows of
    /// set `b` are attended to. Returns `[B, input_dim]`.
    pub fn forward(&self, embedding: &Tensor, counts: &[usize]) -> Result<Tensor, TensorError> {
        let batch = counts.len();
        let d = self.input_dim;
        let mut h = tensor::zeros(&[batch, d])?;
        let mut c = tensor::zeros(&[batch, d])?;
        let mut q_star = tensor::zeros(&[batch, 2 * d])?;
        for _ in 0..self.steps {
            let (q, c_next) = self.lstm.step(&q_star, &h, &c)?;
            let scores = embedding.matmul(&q.unsqueeze(2)?)?.squeeze(2)?;
            let attention = scores.masked_softmax_rows(counts)?;
            let readout = attention.unsqueeze(1)?.matmul(embedding)?.squeeze(1)?;
            q_star = cat(&[q.clone(), readout], 1)?;
            h = q;
            c = c_next;
        }
        self.pred.forward(&q_star)?.relu()
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    pub fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("lstm", self.lstm.named_parameters());
        named.extend(prefixed("pred", self.pred.named_parameters()));
        named
    }
}

/// The `base-set2set` encoder: concatenated GCN node embeddings read out by
/// [`Set2Set`].
#[derive(Debug)]
pub struct GcnSet2SetEncoder {
    gcn: GcnStack,
    s2s: Set2Set,
}

impl GcnSet2SetEncoder {
    pub fn new<R: Rng + ?Sized>(config: &EncoderConfig, rng: &mut R) -> Result<Self, SkipgramError> {
        let gcn = GcnStack::new(
            config.input_dim,
            config.hidden_dim,
            config.embedding_dim,
            config.num_layers,
            config.bn,
            config.conv_options(),
            rng,
        )?;
        let s2s = Set2Set::new(gcn.concat_dim(), config.s2s_steps, rng)?;
        debug!(
            "base-set2set encoder: {} layers, {} steps, output dim {}",
            gcn.num_layers(),
            config.s2s_steps,
            gcn.concat_dim()
        );
        Ok(GcnSet2SetEncoder { gcn, s2s })
    }
}

impl GraphEncoder for GcnSet2SetEncoder {
    fn encode(&self, batch: &GraphBatch, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError> {
        let mask = node_mask(&batch.num_nodes, batch.max_num_nodes())?;
        let nodes = self.gcn.node_embeddings(&batch.feats, &batch.adj, Some(&mask), dropout_rng)?;
        Ok(self.s2s.forward(&nodes, &batch.num_nodes)?)
    }

    fn output_dim(&self) -> usize {
        self.s2s.input_dim
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = self.gcn.parameters();
        params.extend(self.s2s.parameters());
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("gcn", self.gcn.named_parameters());
        named.extend(prefixed("s2s", self.s2s.named_parameters()));
        named
    }
}

#[cfg(test)]
#[path = "set2set_test.rs"]
mod tests;
