//! # Tensor Operations Module (`ops`)
//!
//! Operations are grouped by functionality. Each one has a `xxx_op` function
//! that computes the forward result and, when gradients are being tracked,
//! records a `Backward` struct implementing
//! [`BackwardOp`](crate::autograd::BackwardOp) on the output. The same
//! operations are exposed as methods on [`Tensor`](crate::tensor::Tensor).
//!
//! - [`arithmetic`]: broadcasting element-wise arithmetic and scalar ops.
//! - [`activation`]: element-wise non-linearities.
//! - [`linalg`]: matrix products and transposition.
//! - [`view`]: reshape, (un)squeeze, narrow, cat.
//! - [`reduction`]: sums and maxima, including the padded-row max readout.
//! - [`normalization`]: softmax, batch norm, dropout.
//! - [`loss`]: cross-entropy over logits.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod loss;
pub mod normalization;
pub mod reduction;
pub mod view;

pub use loss::nll_softmax_op as nll_softmax;
pub use view::cat;
