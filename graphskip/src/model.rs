//! The skip-gram model over graph encoders.

use crate::encoders::{build_encoder, reborrow_rng, EncoderConfig, EncoderKind, GraphEncoder};
use crate::error::SkipgramError;
use graphskip_core::autograd::no_grad;
use graphskip_core::nn::module::prefixed;
use graphskip_core::nn::{init, Linear, Module, Parameter};
use graphskip_core::ops::cat;
use graphskip_core::Tensor;
use graphskip_data::skipgram::random_permutation;
use graphskip_data::{Graph, GraphBatch, GraphFeaturizer};
use log::debug;
use rand::{Rng, RngCore};

/// Target (`u`) and context (`v`) encoders, each followed by a linear
/// projection to `embedding_dim`.
///
/// The `u` projection weight starts from `U(-1.5/D, 1.5/D)` and the `v`
/// projection weight from zero, so every context graph initially maps to the
/// `v` bias.
#[derive(Debug)]
pub struct GraphSkipgram {
    u_encoder: Box<dyn GraphEncoder>,
    v_encoder: Box<dyn GraphEncoder>,
    u_embeddings: Linear,
    v_embeddings: Linear,
    embedding_dim: usize,
    neg_sampling_num: usize,
}

impl GraphSkipgram {
    pub fn new<R: Rng + ?Sized>(
        kind: EncoderKind,
        config: &EncoderConfig,
        neg_sampling_num: usize,
        rng: &mut R,
    ) -> Result<Self, SkipgramError> {
        if neg_sampling_num == 0 {
            return Err(SkipgramError::Configuration(
                "number of negative samples must be positive".to_string(),
            ));
        }
        let u_encoder = build_encoder(kind, config, rng)?;
        let v_encoder = build_encoder(kind, config, rng)?;
        let embedding_dim = config.embedding_dim;
        let u_embeddings = Linear::new(u_encoder.output_dim(), embedding_dim, true, rng)?;
        let v_embeddings = Linear::new(v_encoder.output_dim(), embedding_dim, true, rng)?;
        let range = 1.5 / embedding_dim as f32;
        init::uniform_(&u_embeddings.weight, -range, range, rng)?;
        init::zeros_(&v_embeddings.weight);

        let model = GraphSkipgram {
            u_encoder,
            v_encoder,
            u_embeddings,
            v_embeddings,
            embedding_dim,
            neg_sampling_num,
        };
        debug!(
            "GraphSkipgram({}): encoder output {}, embedding {}, {} parameters",
            kind,
            model.u_encoder.output_dim(),
            embedding_dim,
            model.num_parameters()
        );
        Ok(model)
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn neg_sampling_num(&self) -> usize {
        self.neg_sampling_num
    }

    /// Projected target embeddings `[B, D]`.
    pub fn embed_u(&self, batch: &GraphBatch, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError> {
        Ok(self.u_embeddings.forward(&self.u_encoder.encode(batch, dropout_rng)?)?)
    }

    /// Projected context embeddings `[B, D]`.
    pub fn embed_v(&self, batch: &GraphBatch, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError> {
        Ok(self.v_embeddings.forward(&self.v_encoder.encode(batch, dropout_rng)?)?)
    }

    /// Negative-sampling loss of a batch of `B` targets, their contexts and
    /// `B * K` negatives laid out target-major:
    ///
    /// `-(1/B) * sum_b [ logsig(<u_b, v_b>) + logsig(-sum_k <n_bk, u_b>) ]`
    pub fn forward(
        &self,
        u_pos: &GraphBatch,
        v_pos: &GraphBatch,
        v_neg: &GraphBatch,
        mut dropout_rng: Option<&mut dyn RngCore>,
    ) -> Result<Tensor, SkipgramError> {
        let batch_size = u_pos.batch_size();
        let k = self.neg_sampling_num;
        if v_pos.batch_size() != batch_size || v_neg.batch_size() != batch_size * k {
            return Err(SkipgramError::BatchMismatch(format!(
                "{} targets need {} contexts and {} negatives, got {} and {}",
                batch_size,
                batch_size,
                batch_size * k,
                v_pos.batch_size(),
                v_neg.batch_size()
            )));
        }

        let embed_u = self.embed_u(u_pos, reborrow_rng(&mut dropout_rng))?;
        let embed_v = self.embed_v(v_pos, reborrow_rng(&mut dropout_rng))?;
        let score = embed_u.mul(&embed_v)?.sum_dim(1, false)?;
        let log_target = score.log_sigmoid()?;

        let neg_embed_v = self
            .embed_v(v_neg, dropout_rng)?
            .reshape(vec![batch_size, k, self.embedding_dim])?;
        let neg_score = neg_embed_v
            .matmul(&embed_u.unsqueeze(2)?)?
            .reshape(vec![batch_size, k])?
            .sum_dim(1, false)?;
        let sum_log_sampled = neg_score.neg()?.log_sigmoid()?;

        let loss = log_target
            .add(&sum_log_sampled)?
            .sum_all()?
            .mul_scalar(-1.0 / batch_size as f32)?;
        Ok(loss)
    }

    /// `[G, D]` target embeddings of `graphs`, computed without recording
    /// gradients and averaged over `permutations` passes. The first pass
    /// uses the graphs as given, later passes randomly relabel their nodes.
    pub fn embeddings<R: Rng + ?Sized>(
        &self,
        graphs: &[Graph],
        featurizer: &GraphFeaturizer,
        batch_size: usize,
        permutations: usize,
        rng: &mut R,
    ) -> Result<Tensor, SkipgramError> {
        if graphs.is_empty() || batch_size == 0 || permutations == 0 {
            return Err(SkipgramError::Configuration(format!(
                "cannot embed {} graphs in batches of {} over {} permutations",
                graphs.len(),
                batch_size,
                permutations
            )));
        }
        let _guard = no_grad();
        let mut total: Option<Tensor> = None;
        for pass in 0..permutations {
            let mut chunks = Vec::with_capacity(graphs.len().div_ceil(batch_size));
            for chunk in graphs.chunks(batch_size) {
                let batch = if pass == 0 {
                    featurizer.collate(chunk)?
                } else {
                    let permuted = chunk
                        .iter()
                        .map(|g| random_permutation(g, &mut *rng))
                        .collect::<Result<Vec<_>, _>>()?;
                    featurizer.collate(&permuted)?
                };
                chunks.push(self.embed_u(&batch, None)?);
            }
            let pass_embeddings = cat(&chunks, 0)?;
            total = Some(match total {
                Some(t) => t.add(&pass_embeddings)?,
                None => pass_embeddings,
            });
        }
        let total = total.ok_or_else(|| SkipgramError::Configuration("no embedding pass ran".to_string()))?;
        Ok(total.mul_scalar(1.0 / permutations as f32)?)
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    pub fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("u_encoder", self.u_encoder.named_parameters());
        named.extend(prefixed("v_encoder", self.v_encoder.named_parameters()));
        named.extend(prefixed("u_embeddings", self.u_embeddings.named_parameters()));
        named.extend(prefixed("v_embeddings", self.v_embeddings.named_parameters()));
        named
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
