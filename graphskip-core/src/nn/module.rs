use crate::error::TensorError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for neural network layers operating on a single tensor.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    fn forward(&self, input: &Tensor) -> Result<Tensor, TensorError>;

    /// Returns all learnable parameters of the module, including those of
    /// sub-modules.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Returns the parameters with hierarchical names (`"layer1.weight"`).
    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    /// Number of scalar values over all parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}

/// Prefixes the names reported by a child module with `prefix.`.
pub fn prefixed<'a>(
    prefix: &str,
    named: Vec<(String, &'a Parameter)>,
) -> Vec<(String, &'a Parameter)> {
    named
        .into_iter()
        .map(|(name, p)| (format!("{}.{}", prefix, name), p))
        .collect()
}
