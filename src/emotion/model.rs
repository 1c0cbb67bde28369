use anyhow::{ensure, Context, Result};
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tch::nn::{self, Module, OptimizerConfig};
use tch::{Device, Tensor};
use tracing::debug;

use super::dataset::Dataset;
use super::features::MFCC_COUNT;
use super::label::Emotion;

/// Training hyperparameters. The pipeline always runs the defaults.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Fraction of the dataset held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split shuffle and the weight initialization.
    pub seed: u64,
    pub hidden_units: i64,
    pub max_iter: usize,
    pub learning_rate: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            hidden_units: 300,
            max_iter: 500,
            learning_rate: 1e-3,
        }
    }
}

const LOSS_TOLERANCE: f64 = 1e-4;
const PLATEAU_PATIENCE: usize = 2;
const LR_DIVISOR: f64 = 5.0;
const MIN_LEARNING_RATE: f64 = 1e-6;

/// Fitted classifier. Write-once: fit by `train`, read-only afterwards.
#[derive(Debug)]
pub struct EmotionModel {
    net: nn::Sequential,
    input_dim: i64,
    _vs: nn::VarStore,
}

#[derive(Debug)]
pub struct TrainingReport {
    pub model: EmotionModel,
    /// Exact-match fraction on the held-out partition.
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
}

/// Fit the classifier on a deterministic split and score the held-out part.
pub fn train(dataset: &Dataset, config: &TrainerConfig) -> Result<TrainingReport> {
    ensure!(!dataset.is_empty(), "cannot train on an empty dataset");
    ensure!(
        (0.0..1.0).contains(&config.test_fraction),
        "test fraction must be in [0, 1), got {}",
        config.test_fraction
    );

    let (train_idx, test_idx) = split_indices(dataset.len(), config.test_fraction, config.seed);
    let (x_train, y_train) = tensors_for(dataset, &train_idx)?;
    let (x_test, y_test) = tensors_for(dataset, &test_idx)?;

    tch::manual_seed(config.seed as i64);
    let vs = nn::VarStore::new(Device::Cpu);
    let input_dim = MFCC_COUNT as i64;
    let net = build_network(&vs.root(), input_dim, config.hidden_units);
    let mut opt = nn::Adam::default()
        .build(&vs, config.learning_rate)
        .context("failed to build optimizer")?;

    let mut lr = config.learning_rate;
    let mut best_loss = f64::INFINITY;
    let mut stalled = 0usize;
    for iter in 0..config.max_iter {
        let loss = net.forward(&x_train).cross_entropy_for_logits(&y_train);
        opt.backward_step(&loss);
        let loss = loss.double_value(&[]);

        if loss < best_loss - LOSS_TOLERANCE {
            best_loss = loss;
            stalled = 0;
        } else {
            stalled += 1;
        }
        if stalled >= PLATEAU_PATIENCE {
            lr /= LR_DIVISOR;
            stalled = 0;
            if lr < MIN_LEARNING_RATE {
                debug!(iter, loss, "learning rate exhausted, stopping early");
                break;
            }
            opt.set_lr(lr);
        }
    }

    let accuracy = if test_idx.is_empty() {
        0.0
    } else {
        tch::no_grad(|| {
            net.forward(&x_test)
                .accuracy_for_logits(&y_test)
                .double_value(&[])
        })
    };

    Ok(TrainingReport {
        model: EmotionModel {
            net,
            input_dim,
            _vs: vs,
        },
        accuracy,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
    })
}

/// Deterministic shuffled split: the first `round(fraction * n)` shuffled
/// indices form the test partition, the remainder trains.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = SmallRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let test_size = (((n as f64) * test_fraction).round() as usize).min(n);
    let test = indices[..test_size].to_vec();
    let train = indices[test_size..].to_vec();
    (train, test)
}

fn tensors_for(dataset: &Dataset, indices: &[usize]) -> Result<(Tensor, Tensor)> {
    let mut flat = Vec::with_capacity(indices.len() * MFCC_COUNT);
    let mut classes = Vec::with_capacity(indices.len());
    for &index in indices {
        let feature = &dataset.features()[index];
        ensure!(
            feature.len() == MFCC_COUNT,
            "feature vector has length {}, expected {}",
            feature.len(),
            MFCC_COUNT
        );
        flat.extend(feature.iter().copied());
        classes.push(dataset.labels()[index].class_index());
    }
    let x = Tensor::from_slice(&flat).view([indices.len() as i64, MFCC_COUNT as i64]);
    let y = Tensor::from_slice(&classes);
    Ok((x, y))
}

fn build_network(root: &nn::Path, input_dim: i64, hidden_units: i64) -> nn::Sequential {
    nn::seq()
        .add(nn::linear(
            root / "hidden",
            input_dim,
            hidden_units,
            Default::default(),
        ))
        .add_fn(|xs| xs.relu())
        .add(nn::linear(
            root / "logits",
            hidden_units,
            Emotion::COUNT as i64,
            Default::default(),
        ))
}

impl EmotionModel {
    /// Predict a single label for one feature vector.
    pub fn predict(&self, feature: &Array1<f32>) -> Result<Emotion> {
        ensure!(
            feature.len() as i64 == self.input_dim,
            "feature vector has length {}, expected {}",
            feature.len(),
            self.input_dim
        );
        let values: Vec<f32> = feature.iter().copied().collect();
        let class = tch::no_grad(|| {
            let input = Tensor::from_slice(&values).view([1, self.input_dim]);
            self.net.forward(&input).argmax(-1, false).int64_value(&[0])
        });
        Emotion::from_class_index(class)
            .context("classifier produced an out-of-range class index")
    }
}

#[cfg(test)]
mod tests {
    use super::split_indices;

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let first = split_indices(25, 0.2, 42);
        let second = split_indices(25, 0.2, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn split_partitions_cover_all_indices() {
        let (train, test) = split_indices(25, 0.2, 42);
        assert_eq!(test.len(), 5);
        assert_eq!(train.len(), 20);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_size_rounds() {
        let (_, test) = split_indices(7, 0.2, 42);
        assert_eq!(test.len(), 1); // round(1.4)
        let (_, test) = split_indices(8, 0.2, 42);
        assert_eq!(test.len(), 2); // round(1.6)
    }
}
