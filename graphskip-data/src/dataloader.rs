//! Batching of dataset items in sampler order.
//!
//! ```rust
//! use graphskip_data::dataloader::DataLoader;
//! use graphskip_data::datasets::GraphDataset;
//! use graphskip_data::samplers::SequentialSampler;
//! use graphskip_data::Graph;
//!
//! let graphs = (0..5).map(|_| Graph::new(2, [(0, 1)], 0)).collect::<Result<Vec<_>, _>>()?;
//! let loader = DataLoader::new(GraphDataset::new(graphs), 2, SequentialSampler::new(), false, None);
//! let sizes: Vec<usize> = loader.map(|b| b.map(|b| b.len())).collect::<Result<_, _>>()?;
//! assert_eq!(sizes, vec![2, 2, 1]);
//! # Ok::<(), graphskip_data::DataError>(())
//! ```

use crate::datasets::Dataset;
use crate::error::DataError;
use crate::samplers::Sampler;

/// Post-processes the items of a batch before they are yielded.
pub type CollateFn<D> =
    Box<dyn Fn(Vec<<D as Dataset>::Item>) -> Result<Vec<<D as Dataset>::Item>, DataError> + Send + Sync>;

/// Iterates over a dataset in batches of `batch_size` items.
///
/// One pass over the sampler is one epoch; call [`reset`](DataLoader::reset)
/// to draw a new order for the next one.
pub struct DataLoader<D: Dataset, S: Sampler> {
    pub dataset: D,
    pub batch_size: usize,
    pub sampler: S,
    /// Skip the trailing batch when it holds fewer than `batch_size` items.
    pub drop_last: bool,
    pub collate_fn: Option<CollateFn<D>>,
    indices_iter: Box<dyn Iterator<Item = usize> + Send + Sync>,
}

impl<D: Dataset, S: Sampler> DataLoader<D, S> {
    pub fn new(dataset: D, batch_size: usize, sampler: S, drop_last: bool, collate_fn: Option<CollateFn<D>>) -> Self {
        let indices_iter = sampler.iter(dataset.len());
        Self {
            dataset,
            batch_size: batch_size.max(1),
            sampler,
            drop_last,
            collate_fn,
            indices_iter,
        }
    }

    /// Restarts the epoch with a fresh iterator from the sampler.
    pub fn reset(&mut self) {
        self.indices_iter = self.sampler.iter(self.dataset.len());
    }

    /// Number of batches in one epoch.
    pub fn num_batches(&self) -> usize {
        let n = self.sampler.len(self.dataset.len());
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }
}

impl<D: Dataset, S: Sampler> Iterator for DataLoader<D, S> {
    type Item = Result<Vec<<D as Dataset>::Item>, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.batch_size);
        for idx in self.indices_iter.by_ref().take(self.batch_size) {
            match self.dataset.get(idx) {
                Ok(item) => batch.push(item),
                Err(e) => return Some(Err(e)),
            }
        }
        if batch.is_empty() || (self.drop_last && batch.len() < self.batch_size) {
            return None;
        }
        match self.collate_fn {
            Some(ref collate_fn) => Some(collate_fn(batch)),
            None => Some(Ok(batch)),
        }
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
