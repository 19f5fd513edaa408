//! In-place parameter initializers.
//!
//! These write directly into the tensor's storage and are not recorded by
//! autograd, so they are meant for leaf parameters before training.

use crate::error::TensorError;
use crate::tensor::Tensor;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Recommended gain for the given non-linearity.
pub fn calculate_gain(nonlinearity: &str) -> Result<f32, TensorError> {
    match nonlinearity {
        "linear" | "conv1d" | "sigmoid" => Ok(1.0),
        "tanh" => Ok(5.0 / 3.0),
        "relu" => Ok(2.0f32.sqrt()),
        "leaky_relu" => Ok((2.0f32 / (1.0 + 0.01 * 0.01)).sqrt()),
        other => Err(TensorError::ConfigurationError(format!(
            "unsupported nonlinearity for calculate_gain: {}",
            other
        ))),
    }
}

/// `(fan_in, fan_out)` of a weight of at least two dimensions.
fn fans(tensor: &Tensor) -> Result<(usize, usize), TensorError> {
    let shape = tensor.shape();
    if shape.len() < 2 {
        return Err(TensorError::UnsupportedOperation(format!(
            "fan in and fan out need at least 2 dimensions, got {:?}",
            shape
        )));
    }
    let receptive: usize = shape[2..].iter().product();
    Ok((shape[1] * receptive, shape[0] * receptive))
}

/// Fills the tensor with values from `U(a, b)`.
pub fn uniform_<R: Rng + ?Sized>(tensor: &Tensor, a: f32, b: f32, rng: &mut R) -> Result<(), TensorError> {
    if !(a < b) {
        return Err(TensorError::ConfigurationError(format!(
            "uniform_ requires a < b, got [{}, {})",
            a, b
        )));
    }
    let dist = Uniform::new(a, b);
    tensor.update_data(|buf| buf.iter_mut().for_each(|v| *v = dist.sample(&mut *rng)));
    Ok(())
}

/// Glorot uniform initialisation: `U(-bound, bound)` with
/// `bound = gain * sqrt(6 / (fan_in + fan_out))`.
pub fn xavier_uniform_<R: Rng + ?Sized>(tensor: &Tensor, gain: f32, rng: &mut R) -> Result<(), TensorError> {
    let (fan_in, fan_out) = fans(tensor)?;
    let bound = gain * (6.0 / (fan_in + fan_out) as f32).sqrt();
    uniform_(tensor, -bound, bound, rng)
}

pub fn constant_(tensor: &Tensor, value: f32) {
    tensor.update_data(|buf| buf.fill(value));
}

pub fn zeros_(tensor: &Tensor) {
    constant_(tensor, 0.0);
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
