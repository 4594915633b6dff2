//! Behavior prediction
//!
//! Maps classifier scores to categorical labels at a fixed threshold. The
//! threshold is part of the observed contract and is deliberately not
//! configurable.

use crate::error::HerdError;
use crate::model::TrainedModel;
use crate::types::Behavior;

/// Decision boundary between normal and deviated behavior
const DECISION_THRESHOLD: f64 = 0.5;

/// Stateless inference over an immutable trained model
pub struct PredictionService;

impl PredictionService {
    /// Classify a batch of feature vectors.
    ///
    /// Pure with respect to model state: identical inputs against the same
    /// model always yield identical outputs.
    pub fn predict(
        model: &TrainedModel,
        features: &[Vec<f64>],
    ) -> Result<Vec<Behavior>, HerdError> {
        features
            .iter()
            .map(|vector| Ok(Self::classify(model.score(vector)?)))
            .collect()
    }

    /// Classify a single feature vector.
    pub fn predict_one(model: &TrainedModel, features: &[f64]) -> Result<Behavior, HerdError> {
        Ok(Self::classify(model.score(features)?))
    }

    /// Raw probabilities for a batch, without thresholding.
    pub fn predict_scores(
        model: &TrainedModel,
        features: &[Vec<f64>],
    ) -> Result<Vec<f64>, HerdError> {
        features.iter().map(|vector| model.score(vector)).collect()
    }

    fn classify(score: f64) -> Behavior {
        if score > DECISION_THRESHOLD {
            Behavior::Deviated
        } else {
            Behavior::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierModel, ClassifierSpec, NoopObserver, TrainConfig};
    use pretty_assertions::assert_eq;

    fn make_model() -> TrainedModel {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..16 {
            let jitter = (i as f64) * 0.005;
            features.push(vec![0.15 + jitter, 0.15, 0.1]);
            labels.push(0.0);
            features.push(vec![0.85 - jitter, 0.85, 0.9]);
            labels.push(1.0);
        }
        let config = TrainConfig {
            epochs: 100,
            validation_split: 0.0,
            learning_rate: 0.01,
            ..TrainConfig::default()
        };
        ClassifierModel::train(
            &features,
            &labels,
            ClassifierSpec::batch(),
            &config,
            &mut NoopObserver,
        )
        .unwrap()
    }

    #[test]
    fn test_predict_is_pure() {
        let model = make_model();
        let inputs = vec![vec![0.2, 0.2, 0.1], vec![0.8, 0.8, 0.9], vec![0.5, 0.5, 0.5]];

        let first = PredictionService::predict(&model, &inputs).unwrap();
        let second = PredictionService::predict(&model, &inputs).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_matches_predict_one() {
        let model = make_model();
        let inputs = vec![vec![0.2, 0.2, 0.1], vec![0.8, 0.8, 0.9]];

        let batch = PredictionService::predict(&model, &inputs).unwrap();
        for (vector, expected) in inputs.iter().zip(&batch) {
            let single = PredictionService::predict_one(&model, vector).unwrap();
            assert_eq!(single, *expected);
        }
    }

    #[test]
    fn test_scores_are_probabilities() {
        let model = make_model();
        let inputs = vec![vec![0.2, 0.2, 0.1], vec![0.8, 0.8, 0.9]];

        let scores = PredictionService::predict_scores(&model, &inputs).unwrap();
        for score in scores {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_separable_clusters_classify_apart() {
        let model = make_model();

        let normal = PredictionService::predict_one(&model, &[0.15, 0.15, 0.1]).unwrap();
        let deviated = PredictionService::predict_one(&model, &[0.85, 0.85, 0.9]).unwrap();

        assert_eq!(normal, Behavior::Normal);
        assert_eq!(deviated, Behavior::Deviated);
    }
}
