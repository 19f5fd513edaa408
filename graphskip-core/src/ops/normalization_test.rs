use crate::autograd::grad_check::check_grad;
use crate::error::TensorError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad, ramp};
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_softmax_last_rows_sum_to_one() -> Result<(), TensorError> {
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 1000.0, 1000.0, 1000.0], vec![2, 3]);
    let y = x.softmax_last()?.get_f32_data()?;
    assert_relative_eq!(y[..3].iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    assert_relative_eq!(y[0], 0.09003057, epsilon = 1e-6);
    for v in &y[3..] {
        assert_relative_eq!(*v, 1.0 / 3.0, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_masked_softmax_rows() -> Result<(), TensorError> {
    let x = create_test_tensor(vec![0.0, 0.0, 50.0, 1.0, 2.0, 3.0], vec![2, 3]);
    let y = x.masked_softmax_rows(&[2, 0])?;
    check_tensor_near(&y, &[2, 3], &[0.5, 0.5, 0.0, 0.0, 0.0, 0.0], 1e-6);
    assert!(x.masked_softmax_rows(&[1]).is_err());
    Ok(())
}

#[test]
fn test_softmax_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let x = create_test_tensor_with_grad(ramp(8, -1.0, 0.35), vec![2, 4]);
    let g = create_test_tensor(ramp(8, 1.0, -0.3), vec![2, 4]);
    check_grad(|t| t[0].softmax_last(), &[x.clone()], &g, 1e-3, 1e-2)?;
    check_grad(|t| t[0].masked_softmax_rows(&[3, 1]), &[x], &g, 1e-3, 1e-2)?;
    Ok(())
}

#[test]
fn test_batch_norm_channels_statistics() -> Result<(), TensorError> {
    let x = create_test_tensor(ramp(24, -3.0, 0.7), vec![2, 3, 4]);
    let y = x.batch_norm_channels()?.get_f32_data()?;
    for c in 0..3 {
        let vals: Vec<f32> = (0..2)
            .flat_map(|b| (0..4).map(move |l| (b, l)))
            .map(|(b, l)| y[(b * 3 + c) * 4 + l])
            .collect();
        let mean = vals.iter().sum::<f32>() / vals.len() as f32;
        let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / vals.len() as f32;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-5);
        assert_relative_eq!(var, 1.0, epsilon = 1e-3);
    }
    Ok(())
}

#[test]
fn test_batch_norm_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let values: Vec<f32> = ramp(12, 0.0, 1.0).iter().map(|v| (v * 1.7).sin() * 2.0).collect();
    let x = create_test_tensor_with_grad(values, vec![2, 2, 3]);
    let g = create_test_tensor(ramp(12, 0.3, 0.2), vec![2, 2, 3]);
    check_grad(|t| t[0].batch_norm_channels(), &[x], &g, 1e-3, 2e-2)?;
    Ok(())
}

#[test]
fn test_dropout_scaling_and_identity() -> Result<(), TensorError> {
    let mut rng = StdRng::seed_from_u64(7);
    let x = create_test_tensor_with_grad(vec![1.0; 1000], vec![1000]);
    let same = x.dropout(0.0, &mut rng)?;
    check_tensor_near(&same, &[1000], &[1.0; 1000], 0.0);

    let y = x.dropout(0.5, &mut rng)?;
    let data = y.get_f32_data()?;
    assert!(data.iter().all(|v| *v == 0.0 || (*v - 2.0).abs() < 1e-6));
    let kept = data.iter().filter(|v| **v > 0.0).count();
    assert!(kept > 400 && kept < 600);

    y.sum_all()?.backward(None)?;
    let grad = x.grad().unwrap().get_f32_data()?;
    assert_eq!(grad, data);
    assert!(x.dropout(1.0, &mut rng).is_err());
    Ok(())
}

#[test]
fn test_l2_normalize_last() -> Result<(), Box<dyn std::error::Error>> {
    let x = create_test_tensor(vec![3.0, 4.0, 0.0, 0.0], vec![2, 2]);
    check_tensor_near(&x.l2_normalize_last()?, &[2, 2], &[0.6, 0.8, 0.0, 0.0], 1e-6);

    let x = create_test_tensor_with_grad(ramp(12, -1.1, 0.27), vec![2, 2, 3]);
    let g = create_test_tensor(ramp(12, 0.4, -0.15), vec![2, 2, 3]);
    check_grad(|t| t[0].l2_normalize_last(), &[x], &g, 1e-3, 2e-2)?;
    Ok(())
}
