//! Downstream evaluation of graph embeddings: stratified k-fold accuracy of
//! a multinomial logistic regression trained on standardised embeddings.

use crate::error::SkipgramError;
use graphskip_core::nn::{Linear, Module};
use graphskip_core::ops::nll_softmax;
use graphskip_core::optim::{AdamOptimizer, Optimizer};
use graphskip_core::Tensor;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    pub folds: usize,
    /// Full-batch Adam steps of the classifier.
    pub epochs: usize,
    pub lr: f32,
    pub weight_decay: f32,
    pub seed: u64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            folds: 10,
            epochs: 200,
            lr: 0.05,
            weight_decay: 1e-4,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub mean_accuracy: f32,
    pub std_accuracy: f32,
    pub fold_accuracies: Vec<f32>,
}

/// Splits `0..labels.len()` into `k` test folds with roughly equal class
/// proportions. Each class is shuffled and dealt round-robin, continuing
/// where the previous class stopped.
pub fn stratified_folds<R: Rng + ?Sized>(labels: &[usize], k: usize, rng: &mut R) -> Vec<Vec<usize>> {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }
    let mut folds = vec![Vec::new(); k];
    let mut next = 0;
    for members in by_class.values_mut() {
        members.shuffle(rng);
        for &i in members.iter() {
            folds[next % k].push(i);
            next += 1;
        }
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}

/// Scales every column to zero mean and unit variance using the statistics
/// of `train`; constant columns are only centred.
pub fn standardize(train: &[f32], test: &[f32], dim: usize) -> (Vec<f32>, Vec<f32>) {
    let rows = (train.len() / dim.max(1)).max(1) as f32;
    let mut mean = vec![0.0; dim];
    let mut std = vec![0.0; dim];
    for row in train.chunks(dim) {
        for (m, x) in mean.iter_mut().zip(row) {
            *m += x / rows;
        }
    }
    for row in train.chunks(dim) {
        for ((s, x), m) in std.iter_mut().zip(row).zip(&mean) {
            *s += (x - m) * (x - m) / rows;
        }
    }
    let scale: Vec<f32> = std
        .iter()
        .map(|v| if v.sqrt() > 1e-12 { 1.0 / v.sqrt() } else { 1.0 })
        .collect();
    let apply = |data: &[f32]| -> Vec<f32> {
        data.chunks(dim)
            .flat_map(|row| row.iter().zip(&mean).zip(&scale).map(|((x, m), s)| (x - m) * s))
            .collect()
    };
    (apply(train), apply(test))
}

/// Trains a softmax classifier on `(train_x, train_y)` and returns its
/// accuracy on `(test_x, test_y)`. Features are row-major with width `dim`.
#[allow(clippy::too_many_arguments)]
pub fn logistic_regression_accuracy<R: Rng + ?Sized>(
    train_x: &[f32],
    train_y: &[usize],
    test_x: &[f32],
    test_y: &[usize],
    dim: usize,
    num_classes: usize,
    options: &EvalOptions,
    rng: &mut R,
) -> Result<f32, SkipgramError> {
    if test_y.is_empty() {
        return Err(SkipgramError::Configuration("empty test fold".to_string()));
    }
    let classifier = Linear::new(dim, num_classes, true, rng)?;
    let params = classifier.parameters().into_iter().cloned().collect();
    let mut optimizer = AdamOptimizer::new(params, options.lr, 0.9, 0.999, 1e-8, options.weight_decay, false)?;
    let x = Tensor::new(train_x.to_vec(), vec![train_y.len(), dim])?;
    for _ in 0..options.epochs {
        optimizer.zero_grad();
        let loss = nll_softmax(&classifier.forward(&x)?, train_y)?;
        loss.backward(None)?;
        optimizer.step()?;
    }

    let logits = classifier
        .forward(&Tensor::new(test_x.to_vec(), vec![test_y.len(), dim])?)?
        .get_f32_data()?;
    let correct = logits
        .chunks(num_classes)
        .zip(test_y)
        .filter(|(row, label)| argmax(row) == **label)
        .count();
    Ok(correct as f32 / test_y.len() as f32)
}

fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

/// Cross-validated accuracy of `[G, D]` embeddings against graph labels.
pub fn evaluate_embeddings(embeddings: &Tensor, labels: &[usize], options: &EvalOptions) -> Result<EvalReport, SkipgramError> {
    let shape = embeddings.shape();
    if shape.len() != 2 || shape[0] != labels.len() {
        return Err(SkipgramError::BatchMismatch(format!(
            "embeddings of shape {:?} for {} labels",
            shape,
            labels.len()
        )));
    }
    let dim = shape[1];
    let num_classes = labels.iter().max().map_or(0, |m| m + 1);
    if num_classes < 2 {
        return Err(SkipgramError::Configuration(
            "evaluation needs at least two classes".to_string(),
        ));
    }
    if options.folds < 2 || labels.len() < options.folds {
        return Err(SkipgramError::Configuration(format!(
            "cannot split {} graphs into {} folds",
            labels.len(),
            options.folds
        )));
    }

    let values = embeddings.detach().get_f32_data()?;
    let row = |i: usize| &values[i * dim..(i + 1) * dim];
    let mut rng = StdRng::seed_from_u64(options.seed);
    let folds = stratified_folds(labels, options.folds, &mut rng);
    let mut fold_accuracies = Vec::with_capacity(folds.len());
    for (f, test_idx) in folds.iter().enumerate() {
        let train_idx: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(g, _)| *g != f)
            .flat_map(|(_, idx)| idx.iter().copied())
            .collect();
        let train_x: Vec<f32> = train_idx.iter().flat_map(|&i| row(i).iter().copied()).collect();
        let test_x: Vec<f32> = test_idx.iter().flat_map(|&i| row(i).iter().copied()).collect();
        let (train_x, test_x) = standardize(&train_x, &test_x, dim);
        let train_y: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let test_y: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();
        let acc = logistic_regression_accuracy(
            &train_x,
            &train_y,
            &test_x,
            &test_y,
            dim,
            num_classes,
            options,
            &mut rng,
        )?;
        debug!("fold {}: accuracy {:.4}", f, acc);
        fold_accuracies.push(acc);
    }

    let n = fold_accuracies.len() as f32;
    let mean_accuracy = fold_accuracies.iter().sum::<f32>() / n;
    let std_accuracy = (fold_accuracies
        .iter()
        .map(|a| (a - mean_accuracy) * (a - mean_accuracy))
        .sum::<f32>()
        / n)
        .sqrt();
    Ok(EvalReport {
        mean_accuracy,
        std_accuracy,
        fold_accuracies,
    })
}

#[cfg(test)]
#[path = "evaluate_test.rs"]
mod tests;
