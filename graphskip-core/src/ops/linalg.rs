//! Matrix products over the last two dimensions.
//!
//! `matmul` accepts `[n, k] @ [k, m]`, `[B, n, k] @ [B, k, m]` and the mixed
//! forms where one side is a rank-2 matrix shared across the batch
//! (`[B, n, k] @ [k, m]` is how a dense layer is applied to node features).

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;

/// `out[n, m] += a[n, k] @ b[k, m]`, all row-major.
fn gemm_acc(a: &[f32], b: &[f32], out: &mut [f32], n: usize, k: usize, m: usize) {
    for i in 0..n {
        let a_row = &a[i * k..(i + 1) * k];
        let out_row = &mut out[i * m..(i + 1) * m];
        for (p, &a_ip) in a_row.iter().enumerate() {
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b[p * m..(p + 1) * m];
            for (o, &b_pj) in out_row.iter_mut().zip(b_row) {
                *o += a_ip * b_pj;
            }
        }
    }
}

fn transpose_block(src: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut dst = vec![0.0; src.len()];
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
    dst
}

#[derive(Debug, Clone)]
struct MatmulDims {
    batch: usize,
    n: usize,
    k: usize,
    m: usize,
    a_batched: bool,
    b_batched: bool,
}

impl MatmulDims {
    fn resolve(a: &[usize], b: &[usize]) -> Result<Self, TensorError> {
        let mismatch = || TensorError::IncompatibleShapes {
            shape1: a.to_vec(),
            shape2: b.to_vec(),
            operation: "matmul".to_string(),
        };
        let (a_batch, n, k) = match a.len() {
            2 => (None, a[0], a[1]),
            3 => (Some(a[0]), a[1], a[2]),
            _ => return Err(mismatch()),
        };
        let (b_batch, kb, m) = match b.len() {
            2 => (None, b[0], b[1]),
            3 => (Some(b[0]), b[1], b[2]),
            _ => return Err(mismatch()),
        };
        if k != kb {
            return Err(mismatch());
        }
        let batch = match (a_batch, b_batch) {
            (Some(x), Some(y)) if x != y => return Err(mismatch()),
            (Some(x), _) | (None, Some(x)) => x,
            (None, None) => 1,
        };
        Ok(MatmulDims {
            batch,
            n,
            k,
            m,
            a_batched: a_batch.is_some(),
            b_batched: b_batch.is_some(),
        })
    }

    fn out_shape(&self) -> Vec<usize> {
        if self.a_batched || self.b_batched {
            vec![self.batch, self.n, self.m]
        } else {
            vec![self.n, self.m]
        }
    }
}

#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    dims: MatmulDims,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let MatmulDims {
            batch,
            n,
            k,
            m,
            a_batched,
            b_batched,
        } = self.dims.clone();
        let g = grad_output.get_f32_data()?;
        let a = self.a.get_f32_data()?;
        let b = self.b.get_f32_data()?;

        let grad_a = if self.a.requires_grad() {
            // dA = G @ B^T
            let mut ga = vec![0.0; if a_batched { batch * n * k } else { n * k }];
            for bi in 0..batch {
                let b_off = if b_batched { bi * k * m } else { 0 };
                let bt = transpose_block(&b[b_off..b_off + k * m], k, m);
                let a_off = if a_batched { bi * n * k } else { 0 };
                gemm_acc(
                    &g[bi * n * m..(bi + 1) * n * m],
                    &bt,
                    &mut ga[a_off..a_off + n * k],
                    n,
                    m,
                    k,
                );
            }
            Some(Tensor::new(ga, self.a.shape())?)
        } else {
            None
        };

        let grad_b = if self.b.requires_grad() {
            // dB = A^T @ G
            let mut gb = vec![0.0; if b_batched { batch * k * m } else { k * m }];
            for bi in 0..batch {
                let a_off = if a_batched { bi * n * k } else { 0 };
                let at = transpose_block(&a[a_off..a_off + n * k], n, k);
                let b_off = if b_batched { bi * k * m } else { 0 };
                gemm_acc(
                    &at,
                    &g[bi * n * m..(bi + 1) * n * m],
                    &mut gb[b_off..b_off + k * m],
                    k,
                    n,
                    m,
                );
            }
            Some(Tensor::new(gb, self.b.shape())?)
        } else {
            None
        };

        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    let dims = MatmulDims::resolve(&a.shape(), &b.shape())?;
    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let (n, k, m) = (dims.n, dims.k, dims.m);

    let mut out = vec![0.0; dims.batch * n * m];
    for bi in 0..dims.batch {
        let a_off = if dims.a_batched { bi * n * k } else { 0 };
        let b_off = if dims.b_batched { bi * k * m } else { 0 };
        gemm_acc(
            &a_data[a_off..a_off + n * k],
            &b_data[b_off..b_off + k * m],
            &mut out[bi * n * m..(bi + 1) * n * m],
            n,
            k,
            m,
        );
    }

    let result = Tensor::new(out, dims.out_shape())?;
    if needs_grad(&[a, b]) {
        attach(
            &result,
            MatmulBackward {
                a: a.clone(),
                b: b.clone(),
                dims,
            },
        );
    }
    Ok(result)
}

#[derive(Debug)]
struct TransposeBackward {
    input: Tensor,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        Ok(vec![Some(swap_last_two(grad_output)?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn swap_last_two(t: &Tensor) -> Result<Tensor, TensorError> {
    let shape = t.shape();
    let rank = shape.len();
    if rank < 2 {
        return Err(TensorError::InvalidDimension { dim: 1, rank });
    }
    let (rows, cols) = (shape[rank - 2], shape[rank - 1]);
    let block = rows * cols;
    let data = t.get_f32_data()?;
    let mut out = Vec::with_capacity(data.len());
    if block > 0 {
        for chunk in data.chunks(block) {
            out.extend(transpose_block(chunk, rows, cols));
        }
    }
    let mut out_shape = shape;
    out_shape.swap(rank - 2, rank - 1);
    Tensor::new(out, out_shape)
}

pub fn transpose_last_op(input: &Tensor) -> Result<Tensor, TensorError> {
    let result = swap_last_two(input)?;
    if needs_grad(&[input]) {
        attach(&result, TransposeBackward { input: input.clone() });
    }
    Ok(result)
}

impl Tensor {
    /// Matrix product over the last two dimensions. See the module docs for
    /// the accepted rank combinations.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        matmul_op(self, other)
    }

    /// Swaps the last two dimensions, copying the values.
    pub fn transpose_last(&self) -> Result<Tensor, TensorError> {
        transpose_last_op(self)
    }
}

#[cfg(test)]
#[path = "linalg_test.rs"]
mod tests;
