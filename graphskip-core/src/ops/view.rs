//! Shape manipulation: reshape, (un)squeeze, narrow and concatenation.
//!
//! Tensors are always contiguous, so every op here produces a fresh buffer.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;

/// Splits `shape` around `dim` into `(outer, size, inner)` element counts.
fn split_at_dim(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer: usize = shape[..dim].iter().product();
    let inner: usize = shape[dim + 1..].iter().product();
    (outer, shape[dim], inner)
}

fn check_dim(dim: usize, rank: usize) -> Result<(), TensorError> {
    if dim >= rank {
        return Err(TensorError::InvalidDimension { dim, rank });
    }
    Ok(())
}

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        Ok(vec![Some(Tensor::new(
            grad_output.get_f32_data()?,
            self.input.shape(),
        )?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub fn reshape_op(input: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, TensorError> {
    let numel: usize = new_shape.iter().product();
    if numel != input.numel() {
        return Err(TensorError::ShapeMismatch {
            expected: input.shape(),
            actual: new_shape,
            operation: "reshape".to_string(),
        });
    }
    let result = Tensor::new(input.get_f32_data()?, new_shape)?;
    if needs_grad(&[input]) {
        attach(&result, ReshapeBackward { input: input.clone() });
    }
    Ok(result)
}

#[derive(Debug)]
struct NarrowBackward {
    input: Tensor,
    dim: usize,
    start: usize,
    length: usize,
}

impl BackwardOp for NarrowBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let shape = self.input.shape();
        let (outer, size, inner) = split_at_dim(&shape, self.dim);
        let g = grad_output.get_f32_data()?;
        let mut grad = vec![0.0; outer * size * inner];
        let chunk = self.length * inner;
        for o in 0..outer {
            let dst = o * size * inner + self.start * inner;
            grad[dst..dst + chunk].copy_from_slice(&g[o * chunk..(o + 1) * chunk]);
        }
        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub fn narrow_op(input: &Tensor, dim: usize, start: usize, length: usize) -> Result<Tensor, TensorError> {
    let shape = input.shape();
    check_dim(dim, shape.len())?;
    if start + length > shape[dim] {
        return Err(TensorError::ConfigurationError(format!(
            "narrow: range {}..{} out of bounds for dimension {} of size {}",
            start,
            start + length,
            dim,
            shape[dim]
        )));
    }
    let (outer, size, inner) = split_at_dim(&shape, dim);
    let data = input.get_f32_data()?;
    let chunk = length * inner;
    let mut out = Vec::with_capacity(outer * chunk);
    for o in 0..outer {
        let src = o * size * inner + start * inner;
        out.extend_from_slice(&data[src..src + chunk]);
    }
    let mut out_shape = shape;
    out_shape[dim] = length;
    let result = Tensor::new(out, out_shape)?;
    if needs_grad(&[input]) {
        attach(
            &result,
            NarrowBackward {
                input: input.clone(),
                dim,
                start,
                length,
            },
        );
    }
    Ok(result)
}

#[derive(Debug)]
struct CatBackward {
    inputs: Vec<Tensor>,
    dim: usize,
}

impl BackwardOp for CatBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let mut offset = 0;
        let mut grads = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let len = input.shape()[self.dim];
            if input.requires_grad() {
                grads.push(Some(narrow_op(grad_output, self.dim, offset, len)?));
            } else {
                grads.push(None);
            }
            offset += len;
        }
        Ok(grads)
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.inputs.clone()
    }
}

pub fn cat_op(tensors: &[Tensor], dim: usize) -> Result<Tensor, TensorError> {
    let first = tensors.first().ok_or(TensorError::EmptyTensorList)?;
    let base_shape = first.shape();
    check_dim(dim, base_shape.len())?;
    for t in &tensors[1..] {
        let s = t.shape();
        let compatible = s.len() == base_shape.len()
            && s.iter()
                .zip(&base_shape)
                .enumerate()
                .all(|(d, (a, b))| d == dim || a == b);
        if !compatible {
            return Err(TensorError::IncompatibleShapes {
                shape1: base_shape.clone(),
                shape2: s,
                operation: "cat".to_string(),
            });
        }
    }

    let (outer, _, inner) = split_at_dim(&base_shape, dim);
    let datas: Vec<Vec<f32>> = tensors
        .iter()
        .map(|t| t.get_f32_data())
        .collect::<Result<_, _>>()?;
    let sizes: Vec<usize> = tensors.iter().map(|t| t.shape()[dim]).collect();
    let total: usize = sizes.iter().sum();

    let mut out = Vec::with_capacity(outer * total * inner);
    for o in 0..outer {
        for (data, size) in datas.iter().zip(&sizes) {
            let chunk = size * inner;
            out.extend_from_slice(&data[o * chunk..(o + 1) * chunk]);
        }
    }
    let mut out_shape = base_shape;
    out_shape[dim] = total;
    let result = Tensor::new(out, out_shape)?;

    let refs: Vec<&Tensor> = tensors.iter().collect();
    if needs_grad(&refs) {
        attach(
            &result,
            CatBackward {
                inputs: tensors.to_vec(),
                dim,
            },
        );
    }
    Ok(result)
}

impl Tensor {
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, TensorError> {
        reshape_op(self, new_shape)
    }

    /// Inserts a dimension of size 1 at `dim`.
    pub fn unsqueeze(&self, dim: usize) -> Result<Tensor, TensorError> {
        let mut shape = self.shape();
        if dim > shape.len() {
            return Err(TensorError::InvalidDimension {
                dim,
                rank: shape.len(),
            });
        }
        shape.insert(dim, 1);
        reshape_op(self, shape)
    }

    /// Removes `dim`, which must have size 1.
    pub fn squeeze(&self, dim: usize) -> Result<Tensor, TensorError> {
        let mut shape = self.shape();
        check_dim(dim, shape.len())?;
        if shape[dim] != 1 {
            return Err(TensorError::ShapeMismatch {
                expected: vec![1],
                actual: vec![shape[dim]],
                operation: "squeeze".to_string(),
            });
        }
        shape.remove(dim);
        reshape_op(self, shape)
    }

    /// Returns `length` consecutive slices of `dim` starting at `start`.
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Result<Tensor, TensorError> {
        narrow_op(self, dim, start, length)
    }
}

/// Concatenates tensors along `dim`. All other dimensions must agree.
pub fn cat(tensors: &[Tensor], dim: usize) -> Result<Tensor, TensorError> {
    cat_op(tensors, dim)
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
