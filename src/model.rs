//! Behavior classifier lifecycle
//!
//! This module wraps the network engine with the training contract: a bound
//! encoding-policy/input-width specification, a training configuration, and
//! per-epoch progress reporting through an observer. The resulting
//! [`TrainedModel`] is immutable and safe to score from multiple readers.

use crate::error::HerdError;
use crate::network::Network;
use crate::types::{EncodingPolicy, EpochMetrics};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Hidden layer widths of the classifier, input and output excluded
const HIDDEN_WIDTHS: [usize; 2] = [16, 8];

/// Training hyperparameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Fraction of samples held out from the tail for validation (0 disables)
    pub validation_split: f64,
    pub learning_rate: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            batch_size: 32,
            validation_split: 0.2,
            learning_rate: 0.001,
        }
    }
}

/// Encoding policy and input width bound together
///
/// Binding the two prevents a model trained under one policy from ever being
/// scored against vectors produced under the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierSpec {
    pub policy: EncodingPolicy,
    pub input_width: usize,
}

impl ClassifierSpec {
    /// Batch pipeline spec: normalized `[lat, long, speed]` vectors
    pub fn batch() -> Self {
        Self {
            policy: EncodingPolicy::Normalized,
            input_width: 3,
        }
    }

    /// Live tracking spec: raw `[lat, long]` vectors, no speed dimension
    pub fn live() -> Self {
        Self {
            policy: EncodingPolicy::Raw,
            input_width: 2,
        }
    }
}

/// Sink for per-epoch training progress
///
/// Informational only; implementations must not influence the training
/// outcome.
pub trait TrainingObserver {
    fn on_epoch(&mut self, metrics: &EpochMetrics);
}

/// Observer that discards progress records
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {
    fn on_epoch(&mut self, _metrics: &EpochMetrics) {}
}

/// Observer that logs one record per epoch
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_epoch(&mut self, metrics: &EpochMetrics) {
        tracing::info!(
            epoch = metrics.epoch,
            loss = metrics.loss,
            accuracy = metrics.accuracy,
            "training epoch complete"
        );
    }
}

/// Immutable handle over a trained classifier
///
/// Owns no external resources; lives for the process lifetime only.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    spec: ClassifierSpec,
    network: Network,
}

impl TrainedModel {
    pub fn spec(&self) -> ClassifierSpec {
        self.spec
    }

    pub fn policy(&self) -> EncodingPolicy {
        self.spec.policy
    }

    pub fn input_width(&self) -> usize {
        self.spec.input_width
    }

    /// Forward pass for one feature vector, producing a score in [0, 1].
    ///
    /// Rejects vectors whose width does not match the bound spec.
    pub fn score(&self, features: &[f64]) -> Result<f64, HerdError> {
        if features.len() != self.spec.input_width {
            return Err(HerdError::Encoding(format!(
                "feature width {} does not match model input width {}",
                features.len(),
                self.spec.input_width
            )));
        }
        Ok(self.network.forward(features))
    }
}

/// Classifier factory: builds the network and runs the training loop
pub struct ClassifierModel;

impl ClassifierModel {
    /// Train a classifier over encoded features and labels.
    ///
    /// Fails with [`HerdError::Training`] before touching the network when
    /// features or labels are empty or misaligned; callers encode first and
    /// skip training when no label column was present.
    pub fn train(
        features: &[Vec<f64>],
        labels: &[f32],
        spec: ClassifierSpec,
        config: &TrainConfig,
        observer: &mut dyn TrainingObserver,
    ) -> Result<TrainedModel, HerdError> {
        if features.is_empty() {
            return Err(HerdError::Training("no feature vectors to train on".into()));
        }
        if labels.is_empty() {
            return Err(HerdError::Training("no labels to train on".into()));
        }
        if features.len() != labels.len() {
            return Err(HerdError::Training(format!(
                "feature/label length mismatch: {} features, {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(bad) = features.iter().find(|v| v.len() != spec.input_width) {
            return Err(HerdError::Training(format!(
                "feature width {} does not match spec input width {}",
                bad.len(),
                spec.input_width
            )));
        }

        let mut widths = Vec::with_capacity(HIDDEN_WIDTHS.len() + 2);
        widths.push(spec.input_width);
        widths.extend(HIDDEN_WIDTHS);
        widths.push(1);

        let mut rng = StdRng::from_entropy();
        let mut network = Network::new(&widths, &mut rng);

        network.fit(
            features,
            labels,
            config.epochs,
            config.batch_size,
            config.validation_split,
            config.learning_rate,
            &mut rng,
            |metrics| observer.on_epoch(metrics),
        );

        Ok(TrainedModel { spec, network })
    }
}
