use super::*;
use crate::tensor;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_calculate_gain() -> Result<(), TensorError> {
    assert_relative_eq!(calculate_gain("relu")?, std::f32::consts::SQRT_2);
    assert_relative_eq!(calculate_gain("linear")?, 1.0);
    assert!(calculate_gain("gelu").is_err());
    Ok(())
}

#[test]
fn test_xavier_uniform_bounds() -> Result<(), TensorError> {
    let mut rng = StdRng::seed_from_u64(0);
    let w = tensor::zeros(&[30, 50])?;
    let gain = calculate_gain("relu")?;
    xavier_uniform_(&w, gain, &mut rng)?;
    let bound = gain * (6.0f32 / 80.0).sqrt();
    let data = w.get_f32_data()?;
    assert!(data.iter().all(|v| v.abs() <= bound));
    assert!(data.iter().any(|v| *v != 0.0));
    Ok(())
}

#[test]
fn test_xavier_rejects_vectors() -> Result<(), TensorError> {
    let mut rng = StdRng::seed_from_u64(0);
    let b = tensor::zeros(&[5])?;
    assert!(xavier_uniform_(&b, 1.0, &mut rng).is_err());
    Ok(())
}

#[test]
fn test_constant_and_zeros() -> Result<(), TensorError> {
    let t = tensor::ones(&[3])?;
    constant_(&t, 0.5);
    assert_eq!(t.get_f32_data()?, vec![0.5; 3]);
    zeros_(&t);
    assert_eq!(t.get_f32_data()?, vec![0.0; 3]);
    Ok(())
}

#[test]
fn test_uniform_range() -> Result<(), TensorError> {
    let mut rng = StdRng::seed_from_u64(3);
    let t = tensor::zeros(&[200])?;
    uniform_(&t, -0.015, 0.015, &mut rng)?;
    assert!(t.get_f32_data()?.iter().all(|v| (-0.015..0.015).contains(v)));
    assert!(uniform_(&t, 1.0, 1.0, &mut rng).is_err());
    Ok(())
}
