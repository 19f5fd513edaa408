use crate::autograd::BackwardOp;
use crate::error::TensorError;
use crate::tensor::Tensor;
use std::fmt::Debug;
use std::sync::Arc;

/// Internal storage and metadata for a Tensor.
///
/// Holds a contiguous, row-major `f32` buffer together with its shape and
/// the autograd bookkeeping. It is wrapped in `Arc<RwLock<TensorData>>` by
/// [`Tensor`] so that clones share both the values and the gradient slot.
#[derive(Debug)]
pub struct TensorData {
    /// Flattened values in row-major order.
    pub(crate) buffer: Vec<f32>,
    /// The shape (dimensions) of the tensor. Empty for scalars.
    pub(crate) shape: Vec<usize>,

    /// Flag indicating if the tensor requires gradient computation.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, populated by `backward()` on leaf tensors.
    pub(crate) grad: Option<Tensor>,
    /// The operation that produced this tensor. Leaves have `None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates a new `TensorData` from a flat buffer and a shape.
    ///
    /// # Errors
    /// Returns `TensorError::TensorCreationError` if the length of `buffer` does
    /// not match the number of elements implied by `shape`.
    pub fn new(buffer: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorError> {
        let numel: usize = shape.iter().product();
        if buffer.len() != numel {
            return Err(TensorError::TensorCreationError {
                data_len: buffer.len(),
                shape,
            });
        }
        Ok(TensorData {
            buffer,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }
}
