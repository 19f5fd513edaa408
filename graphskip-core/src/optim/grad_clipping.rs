use crate::error::TensorError;
use crate::nn::parameter::Parameter;

/// Clips every gradient element into `[-clip_value, clip_value]`, in place.
pub fn clip_grad_value_<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
    clip_value: f32,
) -> Result<(), TensorError> {
    if clip_value < 0.0 {
        return Err(TensorError::ConfigurationError(
            "clip_value must be non-negative".to_string(),
        ));
    }
    for param in parameters {
        if let Some(grad) = param.grad() {
            grad.update_data(|buf| {
                buf.iter_mut()
                    .for_each(|g| *g = g.clamp(-clip_value, clip_value))
            });
        }
    }
    Ok(())
}

/// Clips the overall norm of the gradients, in place.
///
/// The gradients are viewed as a single concatenated vector; if its
/// `norm_type`-norm exceeds `max_norm` every gradient is scaled by
/// `max_norm / (total_norm + 1e-6)`. Returns the norm before clipping.
pub fn clip_grad_norm_<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
    max_norm: f32,
    norm_type: f32,
) -> Result<f32, TensorError> {
    if max_norm < 0.0 {
        return Err(TensorError::ConfigurationError(
            "max_norm must be non-negative".to_string(),
        ));
    }
    if norm_type <= 0.0 {
        return Err(TensorError::ConfigurationError(
            "norm_type must be positive".to_string(),
        ));
    }

    let grads: Vec<_> = parameters.into_iter().filter_map(|p| p.grad()).collect();
    let total_norm = if norm_type.is_infinite() {
        grads
            .iter()
            .flat_map(|g| g.read_data().buffer().to_vec())
            .fold(0.0f32, |acc, v| acc.max(v.abs()))
    } else {
        let total_pow: f32 = grads
            .iter()
            .map(|g| {
                g.read_data()
                    .buffer()
                    .iter()
                    .map(|v| v.abs().powf(norm_type))
                    .sum::<f32>()
            })
            .sum();
        total_pow.powf(1.0 / norm_type)
    };

    if !total_norm.is_finite() {
        log::warn!("clip_grad_norm_: non-finite gradient norm {}", total_norm);
        return Ok(total_norm);
    }
    if total_norm > max_norm {
        let clip_coef = max_norm / (total_norm + 1e-6);
        for grad in &grads {
            grad.update_data(|buf| buf.iter_mut().for_each(|g| *g *= clip_coef));
        }
    }
    Ok(total_norm)
}

#[cfg(test)]
#[path = "grad_clipping_test.rs"]
mod tests;
