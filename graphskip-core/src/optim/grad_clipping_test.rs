use super::{clip_grad_norm_, clip_grad_value_};
use crate::error::TensorError;
use crate::nn::Parameter;
use crate::tensor::Tensor;
use approx::assert_relative_eq;

/// A parameter whose gradient equals `grad`.
fn param_with_grad(grad: Vec<f32>) -> Result<Parameter, TensorError> {
    let n = grad.len();
    let p = Parameter::new_unnamed(Tensor::new(vec![0.0; n], vec![n])?);
    p.backward(Some(Tensor::new(grad, vec![n])?))?;
    Ok(p)
}

#[test]
fn test_clip_grad_value() -> Result<(), TensorError> {
    let p = param_with_grad(vec![-3.0, 0.5, 2.0])?;
    clip_grad_value_([&p], 1.0)?;
    assert_eq!(p.grad().unwrap().get_f32_data()?, vec![-1.0, 0.5, 1.0]);
    assert!(clip_grad_value_([&p], -1.0).is_err());
    Ok(())
}

#[test]
fn test_clip_grad_norm_scales_all_params() -> Result<(), TensorError> {
    let a = param_with_grad(vec![3.0])?;
    let b = param_with_grad(vec![4.0])?;
    let params = vec![a.clone(), b.clone()];
    let norm = clip_grad_norm_(params.iter(), 1.0, 2.0)?;
    assert_relative_eq!(norm, 5.0, epsilon = 1e-6);
    assert_relative_eq!(a.grad().unwrap().item()?, 0.6, epsilon = 1e-5);
    assert_relative_eq!(b.grad().unwrap().item()?, 0.8, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_clip_grad_norm_below_threshold_is_noop() -> Result<(), TensorError> {
    let a = param_with_grad(vec![0.3, 0.4])?;
    let norm = clip_grad_norm_([&a], 10.0, 2.0)?;
    assert_relative_eq!(norm, 0.5, epsilon = 1e-6);
    assert_eq!(a.grad().unwrap().get_f32_data()?, vec![0.3, 0.4]);
    Ok(())
}

#[test]
fn test_clip_grad_norm_skips_missing_grads_and_validates() -> Result<(), TensorError> {
    let no_grad = Parameter::new_unnamed(Tensor::new(vec![1.0], vec![1])?);
    assert_relative_eq!(clip_grad_norm_([&no_grad], 1.0, 2.0)?, 0.0);
    assert!(clip_grad_norm_([&no_grad], -1.0, 2.0).is_err());
    assert!(clip_grad_norm_([&no_grad], 1.0, 0.0).is_err());
    Ok(())
}
