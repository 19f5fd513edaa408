//! Softmax, batch normalisation, row L2 normalisation and dropout.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;
use rand::Rng;

/// Softmax over contiguous rows of length `width`, restricted to the first
/// `valid[r]` entries of row `r`. Entries past the valid prefix are zero.
fn softmax_rows(data: &[f32], width: usize, valid: impl Fn(usize) -> usize) -> Vec<f32> {
    let mut out = vec![0.0; data.len()];
    if width == 0 {
        return out;
    }
    for (r, (row, out_row)) in data.chunks(width).zip(out.chunks_mut(width)).enumerate() {
        let n = valid(r).min(width);
        if n == 0 {
            continue;
        }
        let max = row[..n].iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mut total = 0.0;
        for (o, x) in out_row[..n].iter_mut().zip(&row[..n]) {
            *o = (x - max).exp();
            total += *o;
        }
        for o in out_row[..n].iter_mut() {
            *o /= total;
        }
    }
    out
}

#[derive(Debug)]
struct SoftmaxBackward {
    input: Tensor,
    output_values: Vec<f32>,
    width: usize,
}

impl BackwardOp for SoftmaxBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.get_f32_data()?;
        let y = &self.output_values;
        let mut grad = vec![0.0; y.len()];
        for ((g_row, y_row), out_row) in g
            .chunks(self.width)
            .zip(y.chunks(self.width))
            .zip(grad.chunks_mut(self.width))
        {
            let dot: f32 = g_row.iter().zip(y_row).map(|(a, b)| a * b).sum();
            for ((o, gi), yi) in out_row.iter_mut().zip(g_row).zip(y_row) {
                *o = yi * (gi - dot);
            }
        }
        Ok(vec![Some(Tensor::new(grad, self.input.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn record_softmax(input: &Tensor, out: Vec<f32>, width: usize) -> Result<Tensor, TensorError> {
    let result = Tensor::new(out.clone(), input.shape())?;
    if needs_grad(&[input]) {
        attach(
            &result,
            SoftmaxBackward {
                input: input.clone(),
                output_values: out,
                width,
            },
        );
    }
    Ok(result)
}

pub fn softmax_last_op(input: &Tensor) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    let width = *shape.last().ok_or(TensorError::InvalidDimension { dim: 0, rank: 0 })?;
    let out = softmax_rows(&input.get_f32_data()?, width, |_| width);
    record_softmax(input, out, width)
}

/// Softmax over the last dimension of a `[B, N]` tensor, using only the
/// first `counts[b]` entries of each row.
pub fn masked_softmax_rows_op(input: &Tensor, counts: &[usize]) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    if shape.len() != 2 || shape[0] != counts.len() {
        return Err(TensorError::ShapeMismatch {
            expected: vec![counts.len(), 0],
            actual: shape,
            operation: "masked_softmax_rows".to_string(),
        });
    }
    let width = shape[1];
    let out = softmax_rows(&input.get_f32_data()?, width, |r| counts[r]);
    record_softmax(input, out, width)
}

const BN_EPS: f32 = 1e-5;

#[derive(Debug)]
struct BatchNormBackward {
    input: Tensor,
    normalized: Vec<f32>,
    inv_std: Vec<f32>,
}

impl BackwardOp for BatchNormBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let shape = self.input.shape();
        let (batch, channels, len) = (shape[0], shape[1], shape[2]);
        let m = (batch * len) as f32;
        let g = grad_output.get_f32_data()?;
        let mut grad = vec![0.0; g.len()];
        for c in 0..channels {
            let idx = |b: usize, l: usize| (b * channels + c) * len + l;
            let mut sum_g = 0.0;
            let mut sum_g_xhat = 0.0;
            for b in 0..batch {
                for l in 0..len {
                    let i = idx(b, l);
                    sum_g += g[i];
                    sum_g_xhat += g[i] * self.normalized[i];
                }
            }
            let scale = self.inv_std[c] / m;
            for b in 0..batch {
                for l in 0..len {
                    let i = idx(b, l);
                    grad[i] = scale * (m * g[i] - sum_g - self.normalized[i] * sum_g_xhat);
                }
            }
        }
        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Batch normalisation of a `[B, C, L]` tensor using the statistics of the
/// current batch: every channel `c` is normalised over its `B * L` values
/// (biased variance, eps `1e-5`, identity affine).
pub fn batch_norm_channels_op(input: &Tensor) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    if shape.len() != 3 {
        return Err(TensorError::ShapeMismatch {
            expected: vec![0, 0, 0],
            actual: shape,
            operation: "batch_norm_channels".to_string(),
        });
    }
    let (batch, channels, len) = (shape[0], shape[1], shape[2]);
    let data = input.get_f32_data()?;
    let m = (batch * len).max(1) as f32;
    let mut normalized = vec![0.0; data.len()];
    let mut inv_std = vec![0.0; channels];
    for c in 0..channels {
        let idx = |b: usize, l: usize| (b * channels + c) * len + l;
        let mut mean = 0.0;
        for b in 0..batch {
            for l in 0..len {
                mean += data[idx(b, l)];
            }
        }
        mean /= m;
        let mut var = 0.0;
        for b in 0..batch {
            for l in 0..len {
                let d = data[idx(b, l)] - mean;
                var += d * d;
            }
        }
        var /= m;
        inv_std[c] = 1.0 / (var + BN_EPS).sqrt();
        for b in 0..batch {
            for l in 0..len {
                let i = idx(b, l);
                normalized[i] = (data[i] - mean) * inv_std[c];
            }
        }
    }
    let result = Tensor::new(normalized.clone(), shape)?;
    if needs_grad(&[input]) {
        attach(
            &result,
            BatchNormBackward {
                input: input.clone(),
                normalized,
                inv_std,
            },
        );
    }
    Ok(result)
}

const L2_EPS: f32 = 1e-12;

#[derive(Debug)]
struct L2NormalizeBackward {
    input: Tensor,
    output_values: Vec<f32>,
    norms: Vec<f32>,
    width: usize,
}

impl BackwardOp for L2NormalizeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.get_f32_data()?;
        let mut grad = vec![0.0; g.len()];
        for (r, ((g_row, y_row), out_row)) in g
            .chunks(self.width)
            .zip(self.output_values.chunks(self.width))
            .zip(grad.chunks_mut(self.width))
            .enumerate()
        {
            let norm = self.norms[r];
            if norm > L2_EPS {
                let dot: f32 = g_row.iter().zip(y_row).map(|(a, b)| a * b).sum();
                for ((o, gi), yi) in out_row.iter_mut().zip(g_row).zip(y_row) {
                    *o = (gi - yi * dot) / norm;
                }
            } else {
                for (o, gi) in out_row.iter_mut().zip(g_row) {
                    *o = gi / L2_EPS;
                }
            }
        }
        Ok(vec![Some(Tensor::new(grad, self.input.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Divides every row of the last dimension by `max(||row||_2, 1e-12)`.
/// All-zero rows stay zero.
pub fn l2_normalize_last_op(input: &Tensor) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    let width = *shape.last().ok_or(TensorError::InvalidDimension { dim: 0, rank: 0 })?;
    let data = input.get_f32_data()?;
    let mut out = vec![0.0; data.len()];
    let mut norms = Vec::with_capacity(if width == 0 { 0 } else { data.len() / width });
    if width > 0 {
        for (row, out_row) in data.chunks(width).zip(out.chunks_mut(width)) {
            let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            let denom = norm.max(L2_EPS);
            for (o, x) in out_row.iter_mut().zip(row) {
                *o = x / denom;
            }
            norms.push(norm);
        }
    }
    let result = Tensor::new(out.clone(), shape)?;
    if needs_grad(&[input]) {
        attach(
            &result,
            L2NormalizeBackward {
                input: input.clone(),
                output_values: out,
                norms,
                width,
            },
        );
    }
    Ok(result)
}

#[derive(Debug)]
struct DropoutBackward {
    input: Tensor,
    mask: Vec<f32>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g: Vec<f32> = grad_output
            .get_f32_data()?
            .iter()
            .zip(&self.mask)
            .map(|(g, m)| g * m)
            .collect();
        Ok(vec![Some(Tensor::new(g, self.input.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Inverted dropout: zeroes each element with probability `p` and scales
/// the survivors by `1 / (1 - p)`. Returns the input unchanged when `p == 0`.
pub fn dropout_op<R: Rng + ?Sized>(input: &Tensor, p: f32, rng: &mut R) -> Result<Tensor, TensorError> {
    if !(0.0..1.0).contains(&p) {
        return Err(TensorError::ConfigurationError(format!(
            "dropout probability must be in [0, 1), got {}",
            p
        )));
    }
    if p == 0.0 {
        return Ok(input.clone());
    }
    let keep = 1.0 / (1.0 - p);
    let mask: Vec<f32> = (0..input.numel())
        .map(|_| if rng.gen::<f32>() < p { 0.0 } else { keep })
        .collect();
    let out: Vec<f32> = input
        .get_f32_data()?
        .iter()
        .zip(&mask)
        .map(|(x, m)| x * m)
        .collect();
    let result = Tensor::new(out, input.shape())?;
    if needs_grad(&[input]) {
        attach(
            &result,
            DropoutBackward {
                input: input.clone(),
                mask,
            },
        );
    }
    Ok(result)
}

impl Tensor {
    /// Softmax over the last dimension.
    pub fn softmax_last(&self) -> Result<Tensor, TensorError> {
        softmax_last_op(self)
    }

    pub fn masked_softmax_rows(&self, counts: &[usize]) -> Result<Tensor, TensorError> {
        masked_softmax_rows_op(self, counts)
    }

    pub fn batch_norm_channels(&self) -> Result<Tensor, TensorError> {
        batch_norm_channels_op(self)
    }

    /// Unit L2 norm along the last dimension.
    pub fn l2_normalize_last(&self) -> Result<Tensor, TensorError> {
        l2_normalize_last_op(self)
    }

    pub fn dropout<R: Rng + ?Sized>(&self, p: f32, rng: &mut R) -> Result<Tensor, TensorError> {
        dropout_op(self, p, rng)
    }
}

#[cfg(test)]
#[path = "normalization_test.rs"]
mod tests;
