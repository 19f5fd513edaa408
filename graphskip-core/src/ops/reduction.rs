//! Reductions: full sums, per-dimension sums and maxima.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;

fn reduced_shape(shape: &[usize], dim: usize, keep_dim: bool) -> Vec<usize> {
    let mut out = shape.to_vec();
    if keep_dim {
        out[dim] = 1;
    } else {
        out.remove(dim);
    }
    out
}

fn split_at_dim(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer: usize = shape[..dim].iter().product();
    let inner: usize = shape[dim + 1..].iter().product();
    (outer, shape[dim], inner)
}

#[derive(Debug)]
struct SumAllBackward {
    input: Tensor,
    scale: f32,
}

impl BackwardOp for SumAllBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.item()? * self.scale;
        Ok(vec![Some(Tensor::new(
            vec![g; self.input.numel()],
            self.input.shape(),
        )?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn scaled_total(input: &Tensor, scale: f32) -> Result<Tensor, TensorError> {
    let total: f32 = input.get_f32_data()?.iter().sum();
    let result = Tensor::new(vec![total * scale], vec![])?;
    if needs_grad(&[input]) {
        attach(
            &result,
            SumAllBackward {
                input: input.clone(),
                scale,
            },
        );
    }
    Ok(result)
}

pub fn sum_all_op(input: &Tensor) -> Result<Tensor, TensorError> {
    scaled_total(input, 1.0)
}

pub fn mean_all_op(input: &Tensor) -> Result<Tensor, TensorError> {
    let n = input.numel();
    if n == 0 {
        return Err(TensorError::UnsupportedOperation(
            "mean of an empty tensor".to_string(),
        ));
    }
    scaled_total(input, 1.0 / n as f32)
}

#[derive(Debug)]
struct SumDimBackward {
    input: Tensor,
    dim: usize,
}

impl BackwardOp for SumDimBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let shape = self.input.shape();
        let (outer, size, inner) = split_at_dim(&shape, self.dim);
        let g = grad_output.get_f32_data()?;
        let mut grad = vec![0.0; outer * size * inner];
        for o in 0..outer {
            for s in 0..size {
                for i in 0..inner {
                    grad[(o * size + s) * inner + i] = g[o * inner + i];
                }
            }
        }
        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub fn sum_dim_op(input: &Tensor, dim: usize, keep_dim: bool) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    if dim >= shape.len() {
        return Err(TensorError::InvalidDimension {
            dim,
            rank: shape.len(),
        });
    }
    let (outer, size, inner) = split_at_dim(&shape, dim);
    let data = input.get_f32_data()?;
    let mut out = vec![0.0; outer * inner];
    for o in 0..outer {
        for s in 0..size {
            for i in 0..inner {
                out[o * inner + i] += data[(o * size + s) * inner + i];
            }
        }
    }
    let result = Tensor::new(out, reduced_shape(&shape, dim, keep_dim))?;
    if needs_grad(&[input]) {
        attach(
            &result,
            SumDimBackward {
                input: input.clone(),
                dim,
            },
        );
    }
    Ok(result)
}

/// Routes each output gradient back to the element that produced it.
/// `sources[j]` is the flat input index of output element `j`, or `None` for
/// outputs that were filled with a constant.
#[derive(Debug)]
struct GatherBackward {
    input: Tensor,
    sources: Vec<Option<usize>>,
}

impl BackwardOp for GatherBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.get_f32_data()?;
        let mut grad = vec![0.0; self.input.numel()];
        for (gj, src) in g.iter().zip(&self.sources) {
            if let Some(idx) = src {
                grad[*idx] += gj;
            }
        }
        Ok(vec![Some(Tensor::new(grad, self.input.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub fn max_dim_op(input: &Tensor, dim: usize, keep_dim: bool) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    if dim >= shape.len() {
        return Err(TensorError::InvalidDimension {
            dim,
            rank: shape.len(),
        });
    }
    let (outer, size, inner) = split_at_dim(&shape, dim);
    if size == 0 {
        return Err(TensorError::UnsupportedOperation(
            "max over an empty dimension".to_string(),
        ));
    }
    let data = input.get_f32_data()?;
    let mut out = Vec::with_capacity(outer * inner);
    let mut sources = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        for i in 0..inner {
            let mut best = (o * size) * inner + i;
            for s in 1..size {
                let idx = (o * size + s) * inner + i;
                if data[idx] > data[best] {
                    best = idx;
                }
            }
            out.push(data[best]);
            sources.push(Some(best));
        }
    }
    let result = Tensor::new(out, reduced_shape(&shape, dim, keep_dim))?;
    if needs_grad(&[input]) {
        attach(
            &result,
            GatherBackward {
                input: input.clone(),
                sources,
            },
        );
    }
    Ok(result)
}

/// Max over the rows of `[B, N, F]` node features, considering only the
/// first `counts[b]` rows of each batch element. Batch elements with no
/// valid rows produce zeros.
pub fn masked_max_rows_op(input: &Tensor, counts: &[usize]) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    if shape.len() != 3 || counts.len() != shape[0] {
        return Err(TensorError::ShapeMismatch {
            expected: vec![counts.len(), 0, 0],
            actual: shape,
            operation: "masked_max_rows".to_string(),
        });
    }
    let (batch, rows, feats) = (shape[0], shape[1], shape[2]);
    let data = input.get_f32_data()?;
    let mut out = Vec::with_capacity(batch * feats);
    let mut sources = Vec::with_capacity(batch * feats);
    for (b, &count) in counts.iter().enumerate() {
        let valid = count.min(rows);
        for f in 0..feats {
            if valid == 0 {
                out.push(0.0);
                sources.push(None);
                continue;
            }
            let mut best = b * rows * feats + f;
            for r in 1..valid {
                let idx = (b * rows + r) * feats + f;
                if data[idx] > data[best] {
                    best = idx;
                }
            }
            out.push(data[best]);
            sources.push(Some(best));
        }
    }
    let result = Tensor::new(out, vec![batch, feats])?;
    if needs_grad(&[input]) {
        attach(
            &result,
            GatherBackward {
                input: input.clone(),
                sources,
            },
        );
    }
    Ok(result)
}

impl Tensor {
    /// Sum of all elements as a 0-dimensional tensor.
    pub fn sum_all(&self) -> Result<Tensor, TensorError> {
        sum_all_op(self)
    }

    pub fn mean_all(&self) -> Result<Tensor, TensorError> {
        mean_all_op(self)
    }

    pub fn sum_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor, TensorError> {
        sum_dim_op(self, dim, keep_dim)
    }

    /// Maximum along `dim`. Ties go to the first occurrence, which is also
    /// where the gradient flows.
    pub fn max_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor, TensorError> {
        max_dim_op(self, dim, keep_dim)
    }

    pub fn masked_max_rows(&self, counts: &[usize]) -> Result<Tensor, TensorError> {
        masked_max_rows_op(self, counts)
    }
}

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
