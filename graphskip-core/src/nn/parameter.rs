use crate::tensor::Tensor;
use std::fmt;
use std::ops::Deref;

/// A wrapper around a Tensor indicating it is a learnable parameter of a Module.
/// Parameters always have `requires_grad` set to `true`.
///
/// Cloning a `Parameter` is shallow: the clone shares values and gradient
/// with the original, which is how optimizers update the weights a layer
/// reads.
#[derive(Clone)]
pub struct Parameter {
    pub tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Creates a new named Parameter from a leaf Tensor.
    pub fn new(tensor: Tensor, name: Option<String>) -> Self {
        {
            let mut guard = tensor.write_data();
            guard.requires_grad = true;
        }
        Parameter { tensor, name }
    }

    pub fn new_unnamed(tensor: Tensor) -> Self {
        Self::new(tensor, None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.tensor
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter(name={:?}, shape={:?})",
            self.name,
            self.tensor.shape()
        )
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
