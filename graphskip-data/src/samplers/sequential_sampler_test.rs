use super::*;

#[test]
fn test_sequential_sampler_order() {
    let sampler = SequentialSampler::new();
    assert_eq!(sampler.iter(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(sampler.len(4), 4);
    assert_eq!(sampler.iter(0).count(), 0);
}
