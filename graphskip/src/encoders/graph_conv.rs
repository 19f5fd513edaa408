use graphskip_core::nn::{init, Parameter};
use graphskip_core::tensor;
use graphskip_core::{Tensor, TensorError};
use rand::{Rng, RngCore};

/// Per-layer switches of a [`GraphConv`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvOptions {
    /// Adds the layer input to the aggregated neighbourhood.
    pub add_self: bool,
    pub bias: bool,
    /// Dropout probability on the layer input, training only.
    pub dropout: f32,
    /// L2-normalises every output node row.
    pub normalize: bool,
}

impl ConvOptions {
    pub fn without_dropout(self) -> Self {
        ConvOptions { dropout: 0.0, ..self }
    }
}

/// Dense graph convolution `y = (A x [+ x]) W + b` on padded batches.
#[derive(Debug)]
pub struct GraphConv {
    /// `[in_dim, out_dim]`
    pub weight: Parameter,
    pub bias: Option<Parameter>,
    options: ConvOptions,
    in_dim: usize,
    out_dim: usize,
}

impl GraphConv {
    /// Xavier-uniform weight with ReLU gain and a zero bias.
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        options: ConvOptions,
        rng: &mut R,
    ) -> Result<Self, TensorError> {
        let weight = tensor::zeros(&[in_dim, out_dim])?;
        init::xavier_uniform_(&weight, init::calculate_gain("relu")?, rng)?;
        let bias = if options.bias {
            let b = tensor::zeros(&[out_dim])?;
            init::zeros_(&b);
            Some(Parameter::new(b, Some("bias".to_string())))
        } else {
            None
        };
        Ok(GraphConv {
            weight: Parameter::new(weight, Some("weight".to_string())),
            bias,
            options,
            in_dim,
            out_dim,
        })
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub fn options(&self) -> ConvOptions {
        self.options
    }

    /// `x` is `[B, N, in_dim]`, `adj` is `[B, N, N]`.
    pub fn forward(&self, x: &Tensor, adj: &Tensor, dropout_rng: Option<&mut dyn RngCore>) -> Result<Tensor, TensorError> {
        let x = match dropout_rng {
            Some(rng) if self.options.dropout > 0.001 => x.dropout(self.options.dropout, rng)?,
            _ => x.clone(),
        };
        let mut y = adj.matmul(&x)?;
        if self.options.add_self {
            y = y.add(&x)?;
        }
        let mut y = y.matmul(&self.weight)?;
        if let Some(b) = &self.bias {
            y = y.add(b)?;
        }
        if self.options.normalize {
            y = y.l2_normalize_last()?;
        }
        Ok(y)
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        params.extend(self.bias.as_ref());
        params
    }

    pub fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = vec![("weight".to_string(), &self.weight)];
        if let Some(b) = &self.bias {
            named.push(("bias".to_string(), b));
        }
        named
    }
}

#[cfg(test)]
#[path = "graph_conv_test.rs"]
mod tests;
