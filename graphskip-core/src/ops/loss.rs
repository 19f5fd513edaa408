//! Classification loss used by the embedding evaluator.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;

#[derive(Debug)]
struct NllSoftmaxBackward {
    logits: Tensor,
    probs: Vec<f32>,
    targets: Vec<usize>,
    classes: usize,
}

impl BackwardOp for NllSoftmaxBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let scale = grad_output.item()? / self.targets.len() as f32;
        let mut grad: Vec<f32> = self.probs.iter().map(|p| p * scale).collect();
        for (row, &t) in self.targets.iter().enumerate() {
            grad[row * self.classes + t] -= scale;
        }
        Ok(vec![Some(Tensor::new(grad, self.logits.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.logits.clone()]
    }
}

/// Mean cross-entropy between `[B, C]` logits and integer class targets.
pub fn nll_softmax_op(logits: &Tensor, targets: &[usize]) -> Result<Tensor, TensorError> {
    let shape = logits.shape();
    if shape.len() != 2 || shape[0] != targets.len() || targets.is_empty() {
        return Err(TensorError::ShapeMismatch {
            expected: vec![targets.len(), 0],
            actual: shape,
            operation: "nll_softmax".to_string(),
        });
    }
    let classes = shape[1];
    if let Some(bad) = targets.iter().find(|t| **t >= classes) {
        return Err(TensorError::InvalidDimension {
            dim: *bad,
            rank: classes,
        });
    }

    let data = logits.get_f32_data()?;
    let mut probs = vec![0.0; data.len()];
    let mut total = 0.0;
    for (row, &t) in targets.iter().enumerate() {
        let x = &data[row * classes..(row + 1) * classes];
        let max = x.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let log_z = max + x.iter().map(|v| (v - max).exp()).sum::<f32>().ln();
        total += log_z - x[t];
        for (p, v) in probs[row * classes..(row + 1) * classes].iter_mut().zip(x) {
            *p = (v - log_z).exp();
        }
    }

    let result = Tensor::new(vec![total / targets.len() as f32], vec![])?;
    if needs_grad(&[logits]) {
        attach(
            &result,
            NllSoftmaxBackward {
                logits: logits.clone(),
                probs,
                targets: targets.to_vec(),
                classes,
            },
        );
    }
    Ok(result)
}

#[cfg(test)]
#[path = "loss_test.rs"]
mod tests;
