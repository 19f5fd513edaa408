use super::cat;
use crate::autograd::grad_check::check_grad;
use crate::error::TensorError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad, ramp};

#[test]
fn test_reshape_and_squeeze() -> Result<(), TensorError> {
    let x = create_test_tensor(ramp(6, 0.0, 1.0), vec![2, 3]);
    assert_eq!(x.reshape(vec![3, 2])?.shape(), vec![3, 2]);
    assert_eq!(x.unsqueeze(0)?.shape(), vec![1, 2, 3]);
    assert_eq!(x.unsqueeze(2)?.shape(), vec![2, 3, 1]);
    assert_eq!(x.unsqueeze(1)?.squeeze(1)?.shape(), vec![2, 3]);
    assert!(matches!(x.reshape(vec![4, 2]), Err(TensorError::ShapeMismatch { .. })));
    assert!(x.squeeze(0).is_err());
    Ok(())
}

#[test]
fn test_narrow_middle_dim() -> Result<(), TensorError> {
    let x = create_test_tensor(ramp(12, 0.0, 1.0), vec![2, 3, 2]);
    let y = x.narrow(1, 1, 2)?;
    check_tensor_near(&y, &[2, 2, 2], &[2.0, 3.0, 4.0, 5.0, 8.0, 9.0, 10.0, 11.0], 1e-6);
    assert!(x.narrow(1, 2, 2).is_err());
    Ok(())
}

#[test]
fn test_cat_last_dim() -> Result<(), TensorError> {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = create_test_tensor(vec![5.0, 6.0], vec![2, 1]);
    let c = cat(&[a, b], 1)?;
    check_tensor_near(&c, &[2, 3], &[1.0, 2.0, 5.0, 3.0, 4.0, 6.0], 1e-6);
    Ok(())
}

#[test]
fn test_cat_rejects_mismatch_and_empty() {
    let a = create_test_tensor(vec![0.0; 4], vec![2, 2]);
    let b = create_test_tensor(vec![0.0; 3], vec![3, 1]);
    assert!(matches!(cat(&[a, b], 1), Err(TensorError::IncompatibleShapes { .. })));
    assert!(matches!(cat(&[], 0), Err(TensorError::EmptyTensorList)));
}

#[test]
fn test_view_ops_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let a = create_test_tensor_with_grad(ramp(6, -1.0, 0.5), vec![2, 3]);
    let b = create_test_tensor_with_grad(ramp(4, 0.25, 0.5), vec![2, 2]);
    let g = create_test_tensor(ramp(10, 1.0, -0.2), vec![2, 5]);
    check_grad(|t| cat(&[t[0].clone(), t[1].clone()], 1), &[a.clone(), b], &g, 1e-3, 1e-2)?;

    let gn = create_test_tensor(ramp(4, 0.5, 0.5), vec![2, 2]);
    check_grad(|t| t[0].narrow(1, 1, 2), &[a.clone()], &gn, 1e-3, 1e-2)?;

    let gr = create_test_tensor(ramp(6, 0.1, 0.3), vec![3, 2]);
    check_grad(|t| t[0].reshape(vec![3, 2]), &[a], &gr, 1e-3, 1e-2)?;
    Ok(())
}
