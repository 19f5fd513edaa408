use super::{ConvOptions, GraphConv};
use approx::assert_relative_eq;
use graphskip_core::{Tensor, TensorError};
use rand::rngs::StdRng;
use rand::SeedableRng;

const PLAIN: ConvOptions = ConvOptions {
    add_self: false,
    bias: true,
    dropout: 0.0,
    normalize: false,
};

fn conv_with_identity_weight(options: ConvOptions) -> GraphConv {
    let conv = GraphConv::new(2, 2, options, &mut StdRng::seed_from_u64(0)).unwrap();
    conv.weight.copy_from_slice(&[1.0, 0.0, 0.0, 1.0]).unwrap();
    conv
}

#[test]
fn test_aggregates_neighbours() -> Result<(), TensorError> {
    let conv = conv_with_identity_weight(PLAIN);
    let adj = Tensor::new(vec![0.0, 1.0, 1.0, 0.0], vec![1, 2, 2])?;
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 2, 2])?;
    let y = conv.forward(&x, &adj, None)?;
    assert_eq!(y.shape(), vec![1, 2, 2]);
    assert_eq!(y.get_f32_data()?, vec![3.0, 4.0, 1.0, 2.0]);

    let with_self = conv_with_identity_weight(ConvOptions { add_self: true, ..PLAIN });
    assert_eq!(with_self.forward(&x, &adj, None)?.get_f32_data()?, vec![4.0, 6.0, 4.0, 6.0]);
    Ok(())
}

#[test]
fn test_normalized_rows_have_unit_norm() -> Result<(), TensorError> {
    let conv = conv_with_identity_weight(ConvOptions { normalize: true, ..PLAIN });
    let adj = Tensor::new(vec![1.0, 0.0, 0.0, 0.0], vec![1, 2, 2])?;
    let x = Tensor::new(vec![3.0, 4.0, 5.0, 6.0], vec![1, 2, 2])?;
    let y = conv.forward(&x, &adj, None)?.get_f32_data()?;
    assert_relative_eq!(y[0], 0.6, epsilon = 1e-6);
    assert_relative_eq!(y[1], 0.8, epsilon = 1e-6);
    // Rows without neighbours stay zero.
    assert_eq!(&y[2..], &[0.0, 0.0]);
    Ok(())
}

#[test]
fn test_initialisation_and_parameters() {
    let mut rng = StdRng::seed_from_u64(4);
    let conv = GraphConv::new(6, 4, PLAIN, &mut rng).unwrap();
    let bound = 2.0f32.sqrt() * (6.0f32 / 10.0).sqrt();
    assert!(conv.weight.get_f32_data().unwrap().iter().all(|w| w.abs() <= bound));
    assert_eq!(conv.bias.as_ref().unwrap().get_f32_data().unwrap(), vec![0.0; 4]);
    assert_eq!(conv.parameters().len(), 2);
    assert_eq!((conv.in_dim(), conv.out_dim()), (6, 4));

    let no_bias = GraphConv::new(6, 4, ConvOptions { bias: false, ..PLAIN }, &mut rng).unwrap();
    assert_eq!(no_bias.named_parameters().len(), 1);
}

#[test]
fn test_dropout_only_in_training() -> Result<(), TensorError> {
    let conv = conv_with_identity_weight(ConvOptions { dropout: 0.5, ..PLAIN });
    let adj = Tensor::new(vec![1.0, 0.0, 0.0, 1.0], vec![1, 2, 2])?;
    let x = Tensor::new(vec![1.0; 4], vec![1, 2, 2])?;
    assert_eq!(conv.forward(&x, &adj, None)?.get_f32_data()?, vec![1.0; 4]);

    let mut rng = StdRng::seed_from_u64(1);
    let y = conv.forward(&x, &adj, Some(&mut rng))?.get_f32_data()?;
    assert!(y.iter().all(|v| *v == 0.0 || *v == 2.0));
    Ok(())
}
