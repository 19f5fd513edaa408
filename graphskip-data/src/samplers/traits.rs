use std::fmt::Debug;

/// Defines the order in which a `DataLoader` visits dataset indices.
pub trait Sampler: Debug + Send + Sync {
    /// Returns a fresh iterator over indices in `0..dataset_len`.
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync>;

    /// Number of indices yielded by [`iter`](Sampler::iter).
    fn len(&self, dataset_len: usize) -> usize;
}
