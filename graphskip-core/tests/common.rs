use graphskip_core::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Shared by several integration test crates; not every crate uses every helper.
#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
