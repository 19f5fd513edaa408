use crate::autograd::graph::topological_sort;
use crate::autograd::{no_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::sync::Arc;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), TensorError> {
        let mut guard = self.write_data();
        if requires_grad && guard.grad_fn.is_some() {
            log::warn!("Setting requires_grad=true on a non-leaf tensor; gradients will not accumulate on it.");
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a handle to the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Clears the gradient tensor associated with this tensor.
    pub fn clear_grad(&self) {
        self.write_data().grad = None;
    }

    /// Returns the backward node that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// True for tensors created by the user rather than by an operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Accumulates `grad_to_add` into this tensor's `grad` field.
    pub fn acc_grad(&self, grad_to_add: Tensor) -> Result<(), TensorError> {
        let incoming = grad_to_add.read_data().buffer.clone();
        let mut guard = self.write_data();
        if incoming.len() != guard.buffer.len() {
            return Err(TensorError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: grad_to_add.shape(),
                operation: "acc_grad".to_string(),
            });
        }
        match guard.grad.as_ref() {
            Some(existing) => {
                existing.update_data(|values| {
                    for (v, g) in values.iter_mut().zip(incoming.iter()) {
                        *v += *g;
                    }
                });
            }
            None => {
                let shape = guard.shape.clone();
                guard.grad = Some(Tensor::new(incoming, shape)?);
            }
        }
        Ok(())
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// Computes the gradient of this tensor with respect to every graph leaf
    /// that requires grad and accumulates it into the leaf's `grad`.
    ///
    /// # Arguments
    /// * `gradient`: initial dL/dself. When `None`, this tensor must hold a
    ///   single element and the initial gradient is `1.0`.
    ///
    /// # Errors
    /// * `BackwardNonScalar` if `gradient` is `None` and the tensor has more
    ///   than one element.
    /// * `ShapeMismatch` if `gradient` does not have this tensor's shape.
    /// * Any error raised by a `BackwardOp`.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), TensorError> {
        if !self.requires_grad() {
            log::debug!("backward() called on a tensor that does not require grad; nothing to do.");
            return Ok(());
        }

        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(TensorError::ShapeMismatch {
                        expected: self.shape(),
                        actual: g.shape(),
                        operation: "backward".to_string(),
                    });
                }
                g
            }
            None => {
                if self.numel() != 1 {
                    return Err(TensorError::BackwardNonScalar);
                }
                Tensor::new(vec![1.0], self.shape())?
            }
        };

        // Gradients are plain values; nothing computed here is recorded.
        let _guard = no_grad();

        let mut pending: HashMap<usize, Tensor> = HashMap::new();
        pending.insert(self.node_id(), grad_init);

        for node in topological_sort(self) {
            let Some(grad) = pending.remove(&node.node_id()) else {
                continue;
            };

            let Some(op) = node.grad_fn() else {
                node.acc_grad(grad)?;
                continue;
            };

            let input_grads = op.backward(&grad)?;
            let inputs = op.inputs();
            if input_grads.len() != inputs.len() {
                return Err(TensorError::BackwardError(format!(
                    "BackwardOp returned {} gradients, but expected {} (for op: {:?})",
                    input_grads.len(),
                    inputs.len(),
                    op
                )));
            }

            for (input, maybe_grad) in inputs.into_iter().zip(input_grads) {
                let Some(g) = maybe_grad else { continue };
                if !input.requires_grad() {
                    continue;
                }
                match pending.remove(&input.node_id()) {
                    Some(existing) => {
                        // Gradient handles may be shared between inputs, so
                        // the sum goes into a fresh buffer.
                        let summed: Vec<f32> = {
                            let a = existing.read_data();
                            let b = g.read_data();
                            a.buffer.iter().zip(b.buffer.iter()).map(|(x, y)| x + y).collect()
                        };
                        pending.insert(input.node_id(), Tensor::new(summed, input.shape())?);
                    }
                    None => {
                        pending.insert(input.node_id(), g);
                    }
                }
            }
        }

        Ok(())
    }
}
