use graphskip_core::ops::cat;
use graphskip_core::{tensor, TensorError};

mod common;
use common::create_test_tensor;

#[test]
fn test_graph_readout_pipeline_gradients() -> Result<(), TensorError> {
    // Node features of two padded graphs, pushed through a dense layer,
    // normalised and read out with a masked max, like a GCN layer does.
    let x = tensor::Tensor::new_with_grad((0..12).map(|v| v as f32 * 0.1).collect(), vec![2, 3, 2])?;
    let adj = create_test_tensor(
        vec![
            0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ],
        vec![2, 3, 3],
    );
    let w = tensor::Tensor::new_with_grad(vec![1.0, -1.0, 0.5, 2.0], vec![2, 2])?;
    let h = adj.matmul(&x)?.add(&x)?.matmul(&w)?.relu()?;
    let h = h.batch_norm_channels()?;
    let pooled = h.masked_max_rows(&[2, 1])?;
    let readout = cat(&[pooled.clone(), pooled], 1)?;
    assert_eq!(readout.shape(), vec![2, 4]);
    readout.sum_all()?.backward(None)?;
    assert_eq!(w.grad().unwrap().shape(), vec![2, 2]);
    assert_eq!(x.grad().unwrap().shape(), vec![2, 3, 2]);
    assert!(w.grad().unwrap().get_f32_data()?.iter().all(|v| v.is_finite()));
    Ok(())
}
