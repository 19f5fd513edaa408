use super::AdamOptimizer;
use crate::error::TensorError;
use crate::nn::Parameter;
use crate::optim::{Optimizer, ParamGroup};
use crate::tensor::Tensor;
use approx::assert_relative_eq;

fn param(values: Vec<f32>) -> Parameter {
    let n = values.len();
    Parameter::new(Tensor::new(values, vec![n]).unwrap(), Some("p".to_string()))
}

#[test]
fn test_adam_rejects_bad_config() {
    let p = param(vec![1.0]);
    assert!(matches!(
        AdamOptimizer::new(vec![p.clone()], 0.0, 0.9, 0.999, 1e-8, 0.0, false),
        Err(TensorError::ConfigurationError(_))
    ));
    assert!(AdamOptimizer::new(vec![p.clone()], 1e-3, 1.0, 0.999, 1e-8, 0.0, false).is_err());
    assert!(AdamOptimizer::new(vec![p.clone()], 1e-3, 0.9, 0.999, 0.0, 0.0, false).is_err());
    assert!(AdamOptimizer::new(vec![p], 1e-3, 0.9, 0.999, 1e-8, -1.0, false).is_err());
}

#[test]
fn test_adam_first_step_moves_by_lr() -> Result<(), TensorError> {
    // With bias correction the first update is lr * sign(grad).
    let p = param(vec![1.0, -2.0]);
    let mut opt = AdamOptimizer::with_lr(vec![p.clone()], 0.1)?;
    p.mul(&p)?.sum_all()?.backward(None)?;
    opt.step()?;
    let data = p.get_f32_data()?;
    assert_relative_eq!(data[0], 0.9, epsilon = 1e-5);
    assert_relative_eq!(data[1], -1.9, epsilon = 1e-5);
    assert_eq!(opt.iterations(), 1);
    Ok(())
}

#[test]
fn test_adam_minimises_quadratic() -> Result<(), TensorError> {
    let p = param(vec![3.0, -4.0]);
    let mut opt = AdamOptimizer::with_lr(vec![p.clone()], 0.1)?;
    for _ in 0..300 {
        opt.zero_grad();
        p.mul(&p)?.sum_all()?.backward(None)?;
        opt.step()?;
    }
    assert!(p.get_f32_data()?.iter().all(|v| v.abs() < 0.5));
    Ok(())
}

#[test]
fn test_adam_skips_params_without_grad() -> Result<(), TensorError> {
    let p = param(vec![1.0]);
    let mut opt = AdamOptimizer::with_lr(vec![p.clone()], 0.1)?;
    opt.step()?;
    assert_eq!(p.get_f32_data()?, vec![1.0]);
    Ok(())
}

#[test]
fn test_adam_param_group_inherits_defaults() -> Result<(), TensorError> {
    let mut opt = AdamOptimizer::with_lr(vec![param(vec![0.0])], 0.01)?;
    let mut group = ParamGroup::new(vec![param(vec![1.0])]);
    group.set_lr(0.5);
    opt.add_param_group(group);
    assert_eq!(opt.param_groups().len(), 2);
    assert_eq!(opt.param_groups()[1].lr(), Some(0.5));
    assert_eq!(opt.param_groups()[1].options.betas, Some((0.9, 0.999)));
    Ok(())
}
