use crate::error::TensorError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` must have an associated
/// `BackwardOp` implementation. It is stored in the output tensor's `grad_fn`
/// field and is used during `backward()` to propagate gradients according to
/// the chain rule.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs given the gradient of
    /// its output (dL/dOutput).
    ///
    /// The returned vector must be ordered exactly like [`BackwardOp::inputs`].
    /// An entry may be `None` when the corresponding input does not require
    /// a gradient. Each gradient has the shape of its input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError>;

    /// Returns the input tensors that participated in the forward operation.
    fn inputs(&self) -> Vec<Tensor>;
}
