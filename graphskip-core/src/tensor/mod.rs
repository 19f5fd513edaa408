// src/tensor/mod.rs

use crate::error::TensorError;
use crate::tensor_data::TensorData;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod autograd_methods;
pub mod broadcast_utils;
pub mod create;

pub use create::{full, ones, rand_uniform, randn, scalar, zeros, zeros_like};

/// Represents a multi-dimensional array of `f32` values.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Multiple `Tensor` handles can point to the same
///     underlying data (cheap clones). Parameters held by a layer and by an
///     optimizer are the same tensor.
/// 2.  **Interior Mutability:** Metadata (`requires_grad`, `grad`) and, for
///     optimizers and initializers, the values themselves can be modified
///     through an immutable handle.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given data and shape.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a leaf tensor that requires gradients.
    pub fn new_with_grad(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorError> {
        let tensor = Self::new(data_vec, shape)?;
        tensor.write_data().requires_grad = true;
        Ok(tensor)
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns a copy of the values in row-major order.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, TensorError> {
        Ok(self.read_data().buffer.clone())
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<f32, TensorError> {
        let guard = self.read_data();
        if guard.buffer.len() != 1 {
            return Err(TensorError::ShapeMismatch {
                expected: vec![],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.buffer[0])
    }

    /// Returns a new leaf tensor holding a copy of the values, detached from
    /// any computation graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor {
            data: Arc::new(RwLock::new(TensorData {
                buffer: guard.buffer.clone(),
                shape: guard.shape.clone(),
                requires_grad: false,
                grad: None,
                grad_fn: None,
            })),
        }
    }

    /// Overwrites the values in place. Used by initializers and optimizers,
    /// which act on leaf parameters outside of the computation graph.
    pub(crate) fn update_data<F>(&self, f: F)
    where
        F: FnOnce(&mut [f32]),
    {
        let mut guard = self.write_data();
        f(&mut guard.buffer);
    }

    /// Replaces all values with `values`, which must have the same length.
    pub fn copy_from_slice(&self, values: &[f32]) -> Result<(), TensorError> {
        let mut guard = self.write_data();
        if guard.buffer.len() != values.len() {
            return Err(TensorError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: vec![values.len()],
                operation: "copy_from_slice".to_string(),
            });
        }
        guard.buffer.copy_from_slice(values);
        Ok(())
    }

    /// Stable identity of the shared storage, used as a graph node key.
    pub(crate) fn node_id(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        let preview: Vec<f32> = guard.buffer.iter().take(8).copied().collect();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("data", &preview)
            .field("truncated", &(guard.buffer.len() > 8))
            .field("requires_grad", &guard.requires_grad)
            .field("has_grad_fn", &guard.grad_fn.is_some())
            .finish()
    }
}
