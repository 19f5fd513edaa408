//! f32 CPU tensors with reverse-mode automatic differentiation, the layers
//! and optimizers built on them.

pub mod autograd;
pub mod ops;
pub mod tensor;
pub mod tensor_data;

pub mod nn;
pub mod optim;
pub mod utils;

pub use tensor::Tensor;

pub mod error;
pub use error::TensorError;
