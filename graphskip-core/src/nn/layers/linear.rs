use crate::error::TensorError;
use crate::nn::init;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Applies a linear transformation to the incoming data: `y = x W^T + b`.
///
/// Accepts `[N, in]` and `[B, N, in]` inputs.
#[derive(Debug)]
pub struct Linear {
    pub weight: Parameter,
    pub bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a new Linear layer with weight `[out_features, in_features]`.
    ///
    /// Weight and bias are drawn from `U(-1/sqrt(in), 1/sqrt(in))`.
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
        rng: &mut R,
    ) -> Result<Self, TensorError> {
        if in_features == 0 || out_features == 0 {
            return Err(TensorError::ConfigurationError(format!(
                "Linear needs non-zero features, got {} -> {}",
                in_features, out_features
            )));
        }
        let bound = 1.0 / (in_features as f32).sqrt();
        let weight_tensor = tensor::zeros(&[out_features, in_features])?;
        init::uniform_(&weight_tensor, -bound, bound, rng)?;
        let weight = Parameter::new(weight_tensor, Some("weight".to_string()));

        let bias = if has_bias {
            let bias_tensor = tensor::zeros(&[out_features])?;
            init::uniform_(&bias_tensor, -bound, bound, rng)?;
            Some(Parameter::new(bias_tensor, Some("bias".to_string())))
        } else {
            None
        };

        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TensorError> {
        let shape = input.shape();
        if shape.last() != Some(&self.in_features) {
            return Err(TensorError::ShapeMismatch {
                expected: vec![self.in_features],
                actual: shape,
                operation: "Linear::forward".to_string(),
            });
        }
        let output = input.matmul(&self.weight.transpose_last()?)?;
        match &self.bias {
            Some(b) => output.add(b),
            None => Ok(output),
        }
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        if let Some(b) = &self.bias {
            params.push(b);
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut named = vec![("weight".to_string(), &self.weight)];
        if let Some(b) = &self.bias {
            named.push(("bias".to_string(), b));
        }
        named
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
