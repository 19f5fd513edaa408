//! Reverse-mode automatic differentiation.
//!
//! Every differentiable operation stores a [`BackwardOp`] in its output's
//! `grad_fn`. `Tensor::backward` sorts the recorded graph topologically and
//! walks it from the output towards the leaves.

pub mod backward_op;
pub mod grad_check;
pub mod grad_mode;
pub mod graph;

pub use backward_op::BackwardOp;
pub use grad_mode::{is_grad_enabled, no_grad, NoGradGuard};

use crate::tensor::Tensor;
use std::sync::Arc;

/// Returns true when an operation over `inputs` has to be recorded.
pub(crate) fn needs_grad(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Marks `output` as produced by `op`.
pub(crate) fn attach<B: BackwardOp + 'static>(output: &Tensor, op: B) {
    let mut guard = output.write_data();
    guard.requires_grad = true;
    guard.grad_fn = Some(Arc::new(op));
}
