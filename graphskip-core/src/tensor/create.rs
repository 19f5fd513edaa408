// src/tensor/create.rs

use crate::error::TensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use std::sync::{Arc, RwLock};

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, TensorError> {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, TensorError> {
    full(shape, 1.0)
}

/// Creates a new tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, TensorError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a 0-dimensional tensor.
pub fn scalar(value: f32) -> Tensor {
    Tensor {
        data: Arc::new(RwLock::new(TensorData {
            buffer: vec![value],
            shape: vec![],
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })),
    }
}

/// Creates a new tensor filled with zeros, having the same shape as `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, TensorError> {
    zeros(&tensor.shape())
}

/// Samples every element from `U(low, high)`.
pub fn rand_uniform<R: Rng + ?Sized>(
    shape: &[usize],
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<Tensor, TensorError> {
    if !(low < high) {
        return Err(TensorError::ConfigurationError(format!(
            "rand_uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    let numel = shape.iter().product();
    let dist = Uniform::new(low, high);
    let data: Vec<f32> = (0..numel).map(|_| dist.sample(rng)).collect();
    Tensor::new(data, shape.to_vec())
}

/// Samples every element from `N(mean, std^2)`.
pub fn randn<R: Rng + ?Sized>(
    shape: &[usize],
    mean: f32,
    std: f32,
    rng: &mut R,
) -> Result<Tensor, TensorError> {
    let dist = Normal::new(mean, std).map_err(|e| {
        TensorError::ConfigurationError(format!("Invalid normal distribution: {}", e))
    })?;
    let numel = shape.iter().product();
    let data: Vec<f32> = (0..numel).map(|_| dist.sample(rng)).collect();
    Tensor::new(data, shape.to_vec())
}
