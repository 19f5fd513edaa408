use super::graph_conv::{ConvOptions, GraphConv};
use super::{reborrow_rng, EncoderConfig, GraphEncoder};
use crate::error::SkipgramError;
use graphskip_core::nn::module::prefixed;
use graphskip_core::nn::Parameter;
use graphskip_core::ops::cat;
use graphskip_core::{Tensor, TensorError};
use graphskip_data::GraphBatch;
use log::debug;
use rand::{Rng, RngCore};

/// `conv_first -> (num_layers - 2) conv blocks -> conv_last`, with ReLU and
/// batch norm after every layer but the last.
#[derive(Debug)]
pub struct GcnStack {
    conv_first: GraphConv,
    conv_block: Vec<GraphConv>,
    conv_last: GraphConv,
    bn: bool,
}

impl GcnStack {
    /// Only the intermediate blocks use `options.dropout`.
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_dim: usize,
        embedding_dim: usize,
        num_layers: usize,
        bn: bool,
        options: ConvOptions,
        rng: &mut R,
    ) -> Result<Self, TensorError> {
        if num_layers < 2 {
            return Err(TensorError::ConfigurationError(format!(
                "a GCN stack needs at least 2 layers, got {}",
                num_layers
            )));
        }
        let conv_first = GraphConv::new(input_dim, hidden_dim, options.without_dropout(), rng)?;
        let conv_block = (0..num_layers - 2)
            .map(|_| GraphConv::new(hidden_dim, hidden_dim, options, rng))
            .collect::<Result<Vec<_>, _>>()?;
        let conv_last = GraphConv::new(hidden_dim, embedding_dim, options.without_dropout(), rng)?;
        Ok(GcnStack {
            conv_first,
            conv_block,
            conv_last,
            bn,
        })
    }

    pub fn num_layers(&self) -> usize {
        self.conv_block.len() + 2
    }

    /// Width of [`node_embeddings`](Self::node_embeddings).
    pub fn concat_dim(&self) -> usize {
        self.conv_first.out_dim() * (self.num_layers() - 1) + self.conv_last.out_dim()
    }

    /// Output of every layer, each `[B, N, dim]`.
    pub fn layer_outputs(
        &self,
        x: &Tensor,
        adj: &Tensor,
        mut dropout_rng: Option<&mut dyn RngCore>,
    ) -> Result<Vec<Tensor>, TensorError> {
        let mut outputs = Vec::with_capacity(self.num_layers());
        let mut h = x.clone();
        for conv in std::iter::once(&self.conv_first).chain(self.conv_block.iter()) {
            h = conv.forward(&h, adj, reborrow_rng(&mut dropout_rng))?.relu()?;
            if self.bn {
                h = h.batch_norm_channels()?;
            }
            outputs.push(h.clone());
        }
        outputs.push(self.conv_last.forward(&h, adj, dropout_rng)?);
        Ok(outputs)
    }

    /// All layer outputs concatenated along the feature axis, `[B, N, concat_dim]`.
    /// Padding rows are zeroed when a `[B, N, 1]` mask is given.
    pub fn node_embeddings(
        &self,
        x: &Tensor,
        adj: &Tensor,
        mask: Option<&Tensor>,
        dropout_rng: Option<&mut dyn RngCore>,
    ) -> Result<Tensor, TensorError> {
        let all = cat(&self.layer_outputs(x, adj, dropout_rng)?, 2)?;
        match mask {
            Some(m) => all.mul(m),
            None => Ok(all),
        }
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.convs().flat_map(|c| c.parameters()).collect()
    }

    pub fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = prefixed("conv_first", self.conv_first.named_parameters());
        for (i, conv) in self.conv_block.iter().enumerate() {
            named.extend(prefixed(&format!("conv_block.{}", i), conv.named_parameters()));
        }
        named.extend(prefixed("conv_last", self.conv_last.named_parameters()));
        named
    }

    fn convs(&self) -> impl Iterator<Item = &GraphConv> {
        std::iter::once(&self.conv_first)
            .chain(self.conv_block.iter())
            .chain(std::iter::once(&self.conv_last))
    }
}

/// The `base` encoder: a GCN stack whose per-layer max readouts over the
/// valid nodes are concatenated.
#[derive(Debug)]
pub struct GcnEncoderGraph {
    gcn: GcnStack,
}

impl GcnEncoderGraph {
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
        debug!("base encoder: {} layers, output dim {}", gcn.num_layers(), gcn.concat_dim());
        Ok(GcnEncoderGraph { gcn })
    }
}

impl GraphEncoder for GcnEncoderGraph {
    fn encode(&self, batch: &GraphBatch, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, SkipgramError> {
        let readouts = self
            .gcn
            .layer_outputs(&batch.feats, &batch.adj, dropout_rng)?
            .iter()
            .map(|h| h.masked_max_rows(&batch.num_nodes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cat(&readouts, 1)?)
    }

    fn output_dim(&self) -> usize {
        self.gcn.concat_dim()
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.gcn.parameters()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.gcn.named_parameters()
    }
}

#[cfg(test)]
#[path = "gcn_test.rs"]
mod tests;
