//! Prediction report encoding
//!
//! Encodes batch classification results into a JSON payload with producer
//! and provenance metadata, so downstream consumers can tell which engine
//! instance and policy produced a given set of predictions.

use crate::error::HerdError;
use crate::types::{Behavior, EncodingPolicy};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Aggregate counts over the predictions in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub normal: usize,
    pub deviated: usize,
}

/// Batch classification output payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub policy: EncodingPolicy,
    pub predictions: Vec<Behavior>,
    pub summary: ReportSummary,
}

/// Report encoder carrying a stable per-process instance ID
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build a report from a batch of predictions
    pub fn encode(&self, predictions: Vec<Behavior>, policy: EncodingPolicy) -> PredictionReport {
        let normal = predictions
            .iter()
            .filter(|b| **b == Behavior::Normal)
            .count();
        let summary = ReportSummary {
            total: predictions.len(),
            normal,
            deviated: predictions.len() - normal,
        };

        PredictionReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            policy,
            predictions,
            summary,
        }
    }

    /// Build a report and serialize it to pretty JSON
    pub fn encode_to_json(
        &self,
        predictions: Vec<Behavior>,
        policy: EncodingPolicy,
    ) -> Result<String, HerdError> {
        let report = self.encode(predictions, policy);
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_counts() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(
            vec![Behavior::Normal, Behavior::Deviated, Behavior::Normal],
            EncodingPolicy::Normalized,
        );

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.normal, 2);
        assert_eq!(report.summary.deviated, 1);
        assert_eq!(report.producer.instance_id, "test-instance");
    }

    #[test]
    fn test_json_shape() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(vec![Behavior::Deviated], EncodingPolicy::Normalized)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["policy"], "normalized");
        assert_eq!(value["predictions"][0], "deviated");
        assert_eq!(value["summary"]["deviated"], 1);
        assert!(value["computed_at_utc"].as_str().is_some());
    }
}
