//! Element-wise arithmetic with broadcasting.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::broadcast_utils::{broadcast_index_map, broadcast_shapes, reduce_to_shape};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryKind {
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryKind::Add => a + b,
            BinaryKind::Sub => a - b,
            BinaryKind::Mul => a * b,
            BinaryKind::Div => a / b,
        }
    }
}

#[derive(Debug)]
struct BinaryBackward {
    kind: BinaryKind,
    lhs: Tensor,
    rhs: Tensor,
    out_shape: Vec<usize>,
}

impl BackwardOp for BinaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.get_f32_data()?;
        let lhs_shape = self.lhs.shape();
        let rhs_shape = self.rhs.shape();
        let a = self.lhs.get_f32_data()?;
        let b = self.rhs.get_f32_data()?;
        let a_map = broadcast_index_map(&lhs_shape, &self.out_shape);
        let b_map = broadcast_index_map(&rhs_shape, &self.out_shape);

        let (ga, gb): (Vec<f32>, Vec<f32>) = match self.kind {
            BinaryKind::Add => (g.clone(), g),
            BinaryKind::Sub => (g.clone(), g.iter().map(|v| -v).collect()),
            BinaryKind::Mul => (
                g.iter().zip(&b_map).map(|(gi, &j)| gi * b[j]).collect(),
                g.iter().zip(&a_map).map(|(gi, &j)| gi * a[j]).collect(),
            ),
            BinaryKind::Div => (
                g.iter().zip(&b_map).map(|(gi, &j)| gi / b[j]).collect(),
                g.iter()
                    .zip(a_map.iter().zip(&b_map))
                    .map(|(gi, (&i, &j))| -gi * a[i] / (b[j] * b[j]))
                    .collect(),
            ),
        };

        let grad_lhs = if self.lhs.requires_grad() {
            Some(Tensor::new(reduce_to_shape(&ga, &lhs_shape, &self.out_shape), lhs_shape)?)
        } else {
            None
        };
        let grad_rhs = if self.rhs.requires_grad() {
            Some(Tensor::new(reduce_to_shape(&gb, &rhs_shape, &self.out_shape), rhs_shape)?)
        } else {
            None
        };
        Ok(vec![grad_lhs, grad_rhs])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.lhs.clone(), self.rhs.clone()]
    }
}

fn binary_op(a: &Tensor, b: &Tensor, kind: BinaryKind) -> Result<Tensor, TensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    let out_shape = broadcast_shapes(&a_shape, &b_shape)?;

    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let out: Vec<f32> = if a_shape == b_shape {
        a_data.iter().zip(&b_data).map(|(x, y)| kind.apply(*x, *y)).collect()
    } else {
        let a_map = broadcast_index_map(&a_shape, &out_shape);
        let b_map = broadcast_index_map(&b_shape, &out_shape);
        a_map
            .iter()
            .zip(&b_map)
            .map(|(&i, &j)| kind.apply(a_data[i], b_data[j]))
            .collect()
    };

    let result = Tensor::new(out, out_shape.clone())?;
    if needs_grad(&[a, b]) {
        attach(
            &result,
            BinaryBackward {
                kind,
                lhs: a.clone(),
                rhs: b.clone(),
                out_shape,
            },
        );
    }
    Ok(result)
}

pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    binary_op(a, b, BinaryKind::Add)
}

pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    binary_op(a, b, BinaryKind::Sub)
}

pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    binary_op(a, b, BinaryKind::Mul)
}

pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    binary_op(a, b, BinaryKind::Div)
}

/// `y = x * scale + shift`, the affine map behind `neg`, `mul_scalar` and
/// `add_scalar`.
#[derive(Debug)]
struct AffineScalarBackward {
    input: Tensor,
    scale: f32,
}

impl BackwardOp for AffineScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g: Vec<f32> = grad_output.get_f32_data()?.iter().map(|v| v * self.scale).collect();
        Ok(vec![Some(Tensor::new(g, grad_output.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn affine_scalar_op(input: &Tensor, scale: f32, shift: f32) -> Result<Tensor, TensorError> {
    let out: Vec<f32> = input.get_f32_data()?.iter().map(|v| v * scale + shift).collect();
    let result = Tensor::new(out, input.shape())?;
    if needs_grad(&[input]) {
        attach(&result, AffineScalarBackward { input: input.clone(), scale });
    }
    Ok(result)
}

pub fn neg_op(input: &Tensor) -> Result<Tensor, TensorError> {
    affine_scalar_op(input, -1.0, 0.0)
}

pub fn mul_scalar_op(input: &Tensor, scalar: f32) -> Result<Tensor, TensorError> {
    affine_scalar_op(input, scalar, 0.0)
}

pub fn add_scalar_op(input: &Tensor, scalar: f32) -> Result<Tensor, TensorError> {
    affine_scalar_op(input, 1.0, scalar)
}

impl Tensor {
    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        add_op(self, other)
    }

    pub fn sub(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        sub_op(self, other)
    }

    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        mul_op(self, other)
    }

    pub fn div(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        div_op(self, other)
    }

    pub fn neg(&self) -> Result<Tensor, TensorError> {
        neg_op(self)
    }

    pub fn mul_scalar(&self, scalar: f32) -> Result<Tensor, TensorError> {
        mul_scalar_op(self, scalar)
    }

    pub fn add_scalar(&self, scalar: f32) -> Result<Tensor, TensorError> {
        add_scalar_op(self, scalar)
    }
}

#[cfg(test)]
#[path = "arithmetic_test.rs"]
mod tests;
