//! The training loop.

use crate::config::TrainConfig;
use crate::error::SkipgramError;
use crate::evaluate::{evaluate_embeddings, EvalOptions, EvalReport};
use crate::model::GraphSkipgram;
use graphskip_core::optim::{clip_grad_norm_, AdamOptimizer, LRScheduler, Optimizer, StepLR};
use graphskip_core::Tensor;
use graphskip_data::samplers::RandomSampler;
use graphskip_data::{
    extension_datasets, read_graphfile, DataLoader, Dataset, GraphDataset, GraphFeaturizer, SkipgramSampler,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the training and evaluation graphs named by `config`.
///
/// Without `extend` both are the main dataset. With `extend` the training
/// set is the extension datasets followed by the main dataset; evaluation
/// stays on the main dataset.
pub fn load_datasets(config: &TrainConfig) -> Result<(GraphDataset, GraphDataset), SkipgramError> {
    let main = GraphDataset::new(read_graphfile(&config.datadir, &config.dataset, config.max_num_nodes)?);
    if !config.extend {
        return Ok((main.clone(), main));
    }
    let names = extension_datasets(&config.dataset);
    if names.is_empty() {
        warn!("No extension datasets known for {}, training on it alone", config.dataset);
        return Ok((main.clone(), main));
    }
    let mut parts = Vec::with_capacity(names.len() + 1);
    for name in names {
        parts.push(GraphDataset::new(read_graphfile(&config.datadir, name, config.max_num_nodes)?));
    }
    parts.push(main.clone());
    let train = GraphDataset::concat(&parts);
    info!(
        "Extended training set: {} graphs from {:?} + {}",
        train.len(),
        names,
        config.dataset
    );
    Ok((train, main))
}

/// Loss and optional evaluation recorded at a logging epoch.
#[derive(Debug, Clone, Serialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub mean_loss: f32,
    pub lr: f32,
    pub eval: Option<EvalReport>,
}

#[derive(Serialize)]
struct EmbeddingDump<'a> {
    epoch: usize,
    dataset: &'a str,
    labels: Vec<usize>,
    embeddings: Vec<&'a [f32]>,
}

pub struct Trainer {
    config: TrainConfig,
    model: GraphSkipgram,
    optimizer: AdamOptimizer,
    scheduler: Option<StepLR>,
    featurizer: GraphFeaturizer,
    train_set: GraphDataset,
    eval_set: GraphDataset,
    sampler: SkipgramSampler,
    loader: DataLoader<GraphDataset, RandomSampler>,
    rng: StdRng,
    epoch: usize,
}

impl Trainer {
    /// Fits the featurizer on both datasets and builds the model and
    /// optimizer. All randomness derives from `config.seed`.
    pub fn new(config: TrainConfig, train_set: GraphDataset, eval_set: GraphDataset) -> Result<Self, SkipgramError> {
        config.validate()?;
        if train_set.len() < 2 {
            return Err(SkipgramError::Configuration(format!(
                "training needs at least 2 graphs, got {}",
                train_set.len()
            )));
        }
        let featurizer = GraphFeaturizer::fit_with_inputs(
            config.feature,
            config.node_inputs(),
            config.max_num_nodes,
            train_set.graphs().iter().chain(eval_set.graphs()),
        )?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let encoder_config = config.encoder_config(featurizer.feat_dim(), featurizer.max_num_nodes());
        let model = GraphSkipgram::new(config.method, &encoder_config, config.neg_sampling_num, &mut rng)?;
        let params = model.parameters().into_iter().cloned().collect();
        let optimizer = AdamOptimizer::with_lr(params, config.lr)?;
        let scheduler = config
            .lr_decay_step
            .map(|step| StepLR::new(step, config.lr_decay_gamma))
            .transpose()?;
        let sampler = SkipgramSampler::new(config.neg_sampling_num, config.permutate)?;
        let loader = DataLoader::new(
            train_set.clone(),
            config.batch_size,
            RandomSampler::seeded(false, None, config.seed.wrapping_add(1)),
            false,
            None,
        );

        info!(
            "Training {} on {} graphs ({} for evaluation): {} features, padded to {} nodes, {} parameters",
            config.method,
            train_set.len(),
            eval_set.len(),
            featurizer.feat_dim(),
            featurizer.max_num_nodes(),
            model.num_parameters()
        );
        Ok(Trainer {
            config,
            model,
            optimizer,
            scheduler,
            featurizer,
            train_set,
            eval_set,
            sampler,
            loader,
            rng,
            epoch: 0,
        })
    }

    pub fn model(&self) -> &GraphSkipgram {
        &self.model
    }

    pub fn featurizer(&self) -> &GraphFeaturizer {
        &self.featurizer
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Completed epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn current_lr(&self) -> f32 {
        self.optimizer
            .param_groups()
            .first()
            .and_then(|g| g.lr())
            .unwrap_or(self.config.lr)
    }

    /// One pass over the training graphs in random order. Returns the mean
    /// batch loss.
    pub fn train_epoch(&mut self) -> Result<f32, SkipgramError> {
        self.loader.reset();
        let mut total = 0.0;
        let mut batches = 0usize;
        for items in self.loader.by_ref() {
            let targets: Vec<usize> = items?.iter().map(|(i, _)| *i).collect();
            let sg = self.sampler.sample(&targets, &self.train_set, &mut self.rng)?;
            let u = self.featurizer.collate(&sg.u)?;
            let v = self.featurizer.collate(&sg.v)?;
            let neg = self.featurizer.collate(&sg.negatives)?;

            self.optimizer.zero_grad();
            let loss = self.model.forward(&u, &v, &neg, Some(&mut self.rng))?;
            loss.backward(None)?;
            if let Some(max_norm) = self.config.clip {
                let norm = clip_grad_norm_(self.model.parameters(), max_norm, 2.0)?;
                debug!("gradient norm {:.4} (clip {})", norm, max_norm);
            }
            self.optimizer.step()?;

            let value = loss.item()?;
            debug!("epoch {} batch {}: loss {:.6}", self.epoch + 1, batches, value);
            total += value;
            batches += 1;
        }
        self.epoch += 1;

        let mean = total / batches.max(1) as f32;
        if !mean.is_finite() {
            return Err(SkipgramError::Diverged {
                epoch: self.epoch,
                loss: mean,
            });
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.step(&mut self.optimizer)?;
        }
        Ok(mean)
    }

    /// `[G, D]` embeddings of the evaluation graphs.
    pub fn embeddings(&mut self) -> Result<Tensor, SkipgramError> {
        self.model.embeddings(
            self.eval_set.graphs(),
            &self.featurizer,
            self.config.batch_size,
            self.config.eval_permutations,
            &mut self.rng,
        )
    }

    pub fn evaluate(&mut self) -> Result<EvalReport, SkipgramError> {
        let embeddings = self.embeddings()?;
        evaluate_embeddings(&embeddings, &self.eval_set.labels(), &self.eval_options())
    }

    fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            folds: self.config.eval_folds,
            seed: self.config.seed,
            ..EvalOptions::default()
        }
    }

    /// Trains until `config.epochs` epochs are done. Every `log_interval`
    /// epochs, and after the last one, logs the loss, evaluates the
    /// embeddings and writes them to `logdir` when one is configured.
    pub fn train(&mut self) -> Result<Vec<EpochSummary>, SkipgramError> {
        if let Some(dir) = &self.config.logdir {
            self.config.save(dir)?;
        }
        let mut summaries = Vec::new();
        while self.epoch < self.config.epochs {
            let mean_loss = self.train_epoch()?;
            let epoch = self.epoch;
            if epoch % self.config.log_interval != 0 && epoch != self.config.epochs {
                continue;
            }
            let lr = self.current_lr();
            info!("Epoch {}: loss {:.6}, lr {:.3e}", epoch, mean_loss, lr);

            let embeddings = self.embeddings()?;
            let eval = match evaluate_embeddings(&embeddings, &self.eval_set.labels(), &self.eval_options()) {
                Ok(report) => {
                    info!(
                        "Epoch {}: accuracy {:.4} +- {:.4}",
                        epoch, report.mean_accuracy, report.std_accuracy
                    );
                    Some(report)
                }
                Err(e) => {
                    warn!("Epoch {}: evaluation skipped: {}", epoch, e);
                    None
                }
            };
            if let Some(dir) = self.config.logdir.clone() {
                self.write_embeddings(&dir, epoch, &embeddings)?;
            }
            summaries.push(EpochSummary {
                epoch,
                mean_loss,
                lr,
                eval,
            });
        }
        Ok(summaries)
    }

    /// Writes `embeddings-epoch{epoch}.json` into `dir`.
    pub fn write_embeddings(&self, dir: &Path, epoch: usize, embeddings: &Tensor) -> Result<PathBuf, SkipgramError> {
        let values = embeddings.get_f32_data()?;
        let dim = embeddings.shape().last().copied().unwrap_or(0).max(1);
        let dump = EmbeddingDump {
            epoch,
            dataset: &self.config.dataset,
            labels: self.eval_set.labels(),
            embeddings: values.chunks(dim).collect(),
        };
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("embeddings-epoch{}.json", epoch));
        fs::write(&path, serde_json::to_string(&dump)?)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "trainer_test.rs"]
mod tests;
