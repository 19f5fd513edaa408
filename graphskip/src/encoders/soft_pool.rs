use super::gcn::GcnStack;
use super::{node_mask, reborrow_rng, EncoderConfig, GraphEncoder};
use crate::error::SkipgramError;
use graphskip_core::nn::module::prefixed;
use graphskip_core::nn::{Linear, Module, Parameter};
use graphskip_core::ops::cat;
use graphskip_core::Tensor;
use graphskip_data::GraphBatch;
use log::debug;
use rand::{Rng, RngCore};

/// Number of clusters after pooling `num_nodes` nodes.
pub fn pooled_size(num_nodes: usize, ratio: f32) -> usize {
    ((num_nodes as f32 * ratio).floor() as usize).max(1)
}

#[derive(Debug)]
struct PoolLevel {
    assign_gcn: GcnStack,
    assign_pred: Linear,
    embed_gcn: GcnStack,
    assign_dim: usize,
}

/// The `soft-assign` encoder (differentiable pooling).
///
/// An assignment GCN produces a soft cluster matrix `S [B, N, K]` (row
/// softmax, padding rows zeroed). Node embeddings `Z` and adjacency `A` are
/// pooled to `S^T Z` and `S^T A S`, and a second GCN runs on the coarse
/// graph. The graph embedding concatenates the max readouts taken before
/// pooling and after every level.
#[derive(Debug)]
pub struct SoftPoolingGcnEncoder {
    gcn: GcnStack,
    levels: Vec<PoolLevel>,
}

impl SoftPoolingGcnEncoder {
    pub fn new<R: Rng + ?Sized>(config: &EncoderConfig, rng: &mut R) -> Result<Self, SkipgramError> {
        if config.max_num_nodes == 0 {
            return Err(SkipgramError::Configuration(
                "soft-assign needs the padded node count of the batches".to_string(),
            ));
        }
        let options = config.conv_options();
        let gcn = GcnStack::new(
            config.input_dim,
            config.hidden_dim,
            config.embedding_dim,
            config.num_layers,
            config.bn,
            options,
            rng,
        )?;
        let pred_dim = gcn.concat_dim();

        let mut levels = Vec::with_capacity(config.num_pool);
        let mut assign_input_dim = config.input_dim;
        let mut assign_dim = pooled_size(config.max_num_nodes, config.assign_ratio);
        for _ in 0..config.num_pool {
            let assign_gcn = GcnStack::new(
                assign_input_dim,
                config.hidden_dim,
                assign_dim,
                config.num_layers,
                config.bn,
                options,
                rng,
            )?;
            let assign_pred = Linear::new(assign_gcn.concat_dim(), assign_dim, true, rng)?;
            let embed_gcn = GcnStack::new(
                pred_dim,
                config.hidden_dim,
                config.embedding_dim,
                config.num_layers,
                config.bn,
                options,
                rng,
            )?;
            levels.push(PoolLevel {
                assign_gcn,
                assign_pred,
                embed_gcn,
                assign_dim,
            });
            assign_input_dim = pred_dim;
            assign_dim = pooled_size(assign_dim, config.assign_ratio);
        }
        debug!(
            "soft-assign encoder: clusters per level {:?}, output dim {}",
            levels.iter().map(|l| l.assign_dim).collect::<Vec<_>>(),
            pred_dim * (config.num_pool + 1)
        );
        Ok(SoftPoolingGcnEncoder { gcn, levels })
    }

    /// Cluster count of every pooling level.
    pub fn assign_dims(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.assign_dim).collect()
    }
}

impl GraphEncoder for SoftPoolingGcnEncoder {
    fn encode(&self, batch: &GraphBatch, mut dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError> {
        let b = batch.batch_size();
        let mask = node_mask(&batch.num_nodes, batch.max_num_nodes())?;
        let mut z = self
            .gcn
            .node_embeddings(&batch.feats, &batch.adj, Some(&mask), reborrow_rng(&mut dropout_rng))?;
        let mut readouts = vec![z.masked_max_rows(&batch.num_nodes)?];

        let mut adj = batch.adj.clone();
        let mut assign_x = batch.assign_feats.clone();
        for (i, level) in self.levels.iter().enumerate() {
            let level_mask = if i == 0 { Some(&mask) } else { None };
            let assign_nodes = level.assign_gcn.node_embeddings(
                &assign_x,
                &adj,
                level_mask,
                reborrow_rng(&mut dropout_rng),
            )?;
            let mut s = level.assign_pred.forward(&assign_nodes)?.softmax_last()?;
            if let Some(m) = level_mask {
                s = s.mul(m)?;
            }
            let s_t = s.transpose_last()?;
            let x = s_t.matmul(&z)?;
            adj = s_t.matmul(&adj)?.matmul(&s)?;
            z = level
                .embed_gcn
                .node_embeddings(&x, &adj, None, reborrow_rng(&mut dropout_rng))?;
            readouts.push(z.masked_max_rows(&vec![level.assign_dim; b])?);
            assign_x = x;
        }
        Ok(cat(&readouts, 1)?)
    }

    fn output_dim(&self) -> usize {
        self.gcn.concat_dim() * (self.levels.len() + 1)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("gcn", self.gcn.named_parameters());
        for (i, level) in self.levels.iter().enumerate() {
            named.extend(prefixed(&format!("assign_gcn.{}", i), level.assign_gcn.named_parameters()));
            named.extend(prefixed(&format!("assign_pred.{}", i), level.assign_pred.named_parameters()));
            named.extend(prefixed(&format!("embed_gcn.{}", i), level.embed_gcn.named_parameters()));
        }
        named
    }
}

#[cfg(test)]
#[path = "soft_pool_test.rs"]
mod tests;
