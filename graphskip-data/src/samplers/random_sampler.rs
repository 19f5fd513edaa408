use super::traits::Sampler;
use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Samples indices in random order, optionally with replacement.
///
/// Each call to [`Sampler::iter`] draws a new order from the sampler's own
/// generator, so a seeded sampler reproduces the same sequence of epochs.
#[derive(Debug)]
pub struct RandomSampler {
    replacement: bool,
    num_samples: Option<usize>,
    rng: Mutex<StdRng>,
}

impl RandomSampler {
    /// `num_samples` defaults to the dataset size.
    pub fn new(replacement: bool, num_samples: Option<usize>) -> Self {
        Self::with_rng(replacement, num_samples, StdRng::from_entropy())
    }

    pub fn seeded(replacement: bool, num_samples: Option<usize>, seed: u64) -> Self {
        Self::with_rng(replacement, num_samples, StdRng::seed_from_u64(seed))
    }

    fn with_rng(replacement: bool, num_samples: Option<usize>, rng: StdRng) -> Self {
        RandomSampler {
            replacement,
            num_samples,
            rng: Mutex::new(rng),
        }
    }
}

impl Sampler for RandomSampler {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        if dataset_len == 0 {
            return Box::new(std::iter::empty());
        }
        let count = self.num_samples.unwrap_or(dataset_len);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        if self.replacement {
            let indices: Vec<usize> = (0..count).map(|_| rng.gen_range(0..dataset_len)).collect();
            return Box::new(indices.into_iter());
        }
        if count > dataset_len {
            warn!(
                "RandomSampler: num_samples ({}) > dataset_len ({}) without replacement, yielding nothing",
                count, dataset_len
            );
            return Box::new(std::iter::empty());
        }
        let mut indices: Vec<usize> = (0..dataset_len).collect();
        indices.shuffle(&mut *rng);
        indices.truncate(count);
        Box::new(indices.into_iter())
    }

    fn len(&self, dataset_len: usize) -> usize {
        self.num_samples.unwrap_or(dataset_len)
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
