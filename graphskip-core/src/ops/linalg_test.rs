use crate::autograd::grad_check::check_grad;
use crate::error::TensorError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad, ramp};

#[test]
fn test_matmul_2d() -> Result<(), TensorError> {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let b = create_test_tensor(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]);
    let c = a.matmul(&b)?;
    check_tensor_near(&c, &[2, 2], &[58.0, 64.0, 139.0, 154.0], 1e-5);
    Ok(())
}

#[test]
fn test_matmul_batched_with_shared_weight() -> Result<(), TensorError> {
    // Two batches of the identity applied to the same weight.
    let a = create_test_tensor(vec![1.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 2.0], vec![2, 2, 2]);
    let w = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let c = a.matmul(&w)?;
    check_tensor_near(
        &c,
        &[2, 2, 2],
        &[1.0, 2.0, 3.0, 4.0, 2.0, 4.0, 6.0, 8.0],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_matmul_shape_errors() {
    let a = create_test_tensor(vec![0.0; 6], vec![2, 3]);
    let b = create_test_tensor(vec![0.0; 4], vec![2, 2]);
    assert!(matches!(a.matmul(&b), Err(TensorError::IncompatibleShapes { .. })));

    let x = create_test_tensor(vec![0.0; 12], vec![2, 2, 3]);
    let y = create_test_tensor(vec![0.0; 18], vec![3, 3, 2]);
    assert!(x.matmul(&y).is_err());
}

#[test]
fn test_matmul_grad_check_variants() -> Result<(), Box<dyn std::error::Error>> {
    let a2 = create_test_tensor_with_grad(ramp(6, -0.8, 0.3), vec![2, 3]);
    let b2 = create_test_tensor_with_grad(ramp(12, 0.4, -0.1), vec![3, 4]);
    let g2 = create_test_tensor(ramp(8, 1.0, 0.1), vec![2, 4]);
    check_grad(|t| t[0].matmul(&t[1]), &[a2, b2.clone()], &g2, 1e-3, 1e-2)?;

    let a3 = create_test_tensor_with_grad(ramp(12, -1.0, 0.2), vec![2, 2, 3]);
    let g3 = create_test_tensor(ramp(16, 0.5, -0.05), vec![2, 2, 4]);
    check_grad(|t| t[0].matmul(&t[1]), &[a3.clone(), b2], &g3, 1e-3, 1e-2)?;

    let b3 = create_test_tensor_with_grad(ramp(24, 0.3, 0.05), vec![2, 3, 4]);
    check_grad(|t| t[0].matmul(&t[1]), &[a3, b3], &g3, 1e-3, 1e-2)?;
    Ok(())
}

#[test]
fn test_transpose_last() -> Result<(), Box<dyn std::error::Error>> {
    let x = create_test_tensor_with_grad(ramp(12, 0.0, 1.0), vec![2, 2, 3]);
    let t = x.transpose_last()?;
    assert_eq!(t.shape(), vec![2, 3, 2]);
    check_tensor_near(
        &t,
        &[2, 3, 2],
        &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0, 6.0, 9.0, 7.0, 10.0, 8.0, 11.0],
        1e-6,
    );
    let g = create_test_tensor(ramp(12, 1.0, 0.5), vec![2, 3, 2]);
    check_grad(|t| t[0].transpose_last(), &[x], &g, 1e-3, 1e-2)?;
    Ok(())
}
