use crate::error::TensorError;

/// Computes contiguous row-major strides for `shape`.
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = acc;
        acc *= shape[i];
    }
    strides
}

/// Computes the broadcast shape of two shapes (NumPy rules, right-aligned).
pub fn broadcast_shapes(shape1: &[usize], shape2: &[usize]) -> Result<Vec<usize>, TensorError> {
    let rank = shape1.len().max(shape2.len());
    let mut out = vec![0; rank];
    for i in 0..rank {
        let d1 = if i < rank - shape1.len() { 1 } else { shape1[i - (rank - shape1.len())] };
        let d2 = if i < rank - shape2.len() { 1 } else { shape2[i - (rank - shape2.len())] };
        out[i] = if d1 == d2 {
            d1
        } else if d1 == 1 {
            d2
        } else if d2 == 1 {
            d1
        } else {
            return Err(TensorError::BroadcastError {
                shape1: shape1.to_vec(),
                shape2: shape2.to_vec(),
            });
        };
    }
    Ok(out)
}

/// For every element of a tensor of shape `out_shape`, the linear index of
/// the element of an `in_shape` tensor that broadcasts onto it.
///
/// `in_shape` must be broadcastable to `out_shape`.
pub fn broadcast_index_map(in_shape: &[usize], out_shape: &[usize]) -> Vec<usize> {
    let numel: usize = out_shape.iter().product();
    let offset = out_shape.len() - in_shape.len();
    let in_strides = contiguous_strides(in_shape);
    let mut map = Vec::with_capacity(numel);
    let mut index = vec![0usize; out_shape.len()];
    for _ in 0..numel {
        let mut linear = 0;
        for (d, &size) in in_shape.iter().enumerate() {
            if size != 1 {
                linear += index[d + offset] * in_strides[d];
            }
        }
        map.push(linear);
        // Advance the multi-index (row-major).
        for d in (0..out_shape.len()).rev() {
            index[d] += 1;
            if index[d] < out_shape[d] {
                break;
            }
            index[d] = 0;
        }
    }
    map
}

/// Sums a gradient of shape `out_shape` back down to `in_shape`, undoing a
/// broadcast.
pub fn reduce_to_shape(grad: &[f32], in_shape: &[usize], out_shape: &[usize]) -> Vec<f32> {
    if in_shape == out_shape {
        return grad.to_vec();
    }
    let in_numel: usize = in_shape.iter().product();
    let mut reduced = vec![0.0; in_numel];
    for (g, idx) in grad.iter().zip(broadcast_index_map(in_shape, out_shape)) {
        reduced[idx] += *g;
    }
    reduced
}
