use crate::autograd::no_grad;
use crate::error::TensorError;
use crate::tensor::Tensor;
use approx::relative_eq;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(TensorError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(TensorError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(#[from] TensorError),
    #[error("Input tensor {input_index} requires grad but has no gradient after backward pass.")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Gradient check input tensor must be a leaf node (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },
}

/// Checks analytical gradients against central finite differences.
///
/// The scalar being differentiated is `sum(func(inputs) * output_grad)`, so
/// `output_grad` plays the role of dL/dOutput. Only inputs with
/// `requires_grad` are checked.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if input.requires_grad() && !input.is_leaf() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
        input.clear_grad();
    }

    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    output
        .backward(Some(output_grad.clone()))
        .map_err(GradCheckError::BackwardPassError)?;

    let weights = output_grad.get_f32_data()?;
    let weighted_loss = |inputs: &[Tensor]| -> Result<f64, GradCheckError> {
        let out = func(inputs).map_err(GradCheckError::ForwardPassError)?;
        let values = out.get_f32_data()?;
        Ok(values
            .iter()
            .zip(weights.iter())
            .map(|(v, w)| *v as f64 * *w as f64)
            .sum())
    };

    for (input_index, input) in inputs.iter().enumerate() {
        if !input.requires_grad() {
            continue;
        }
        let analytical = input
            .grad()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index })?
            .get_f32_data()?;

        let _guard = no_grad();
        let original = input.get_f32_data()?;
        for element_index in 0..original.len() {
            let mut perturbed = original.clone();
            perturbed[element_index] = (original[element_index] as f64 + epsilon) as f32;
            input.copy_from_slice(&perturbed)?;
            let loss_plus = weighted_loss(inputs)?;

            perturbed[element_index] = (original[element_index] as f64 - epsilon) as f32;
            input.copy_from_slice(&perturbed)?;
            let loss_minus = weighted_loss(inputs)?;

            input.copy_from_slice(&original)?;

            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_grad = analytical[element_index] as f64;
            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                });
            }
        }
    }
    Ok(())
}
