//! Feature encoding
//!
//! This module converts raw tabular rows into numeric feature vectors and
//! binary labels under one of two policies:
//! - `Normalized` maps the expected coordinate/speed ranges onto ~[0, 1] and
//!   silently drops rows with unparseable numeric fields.
//! - `Raw` passes values through unmodified; unparseable fields become NaN
//!   and the caller is responsible for guarding the model against them.

use crate::error::HerdError;
use crate::loader::Row;
use crate::types::{EncodingPolicy, Observation};

/// Column holding latitude in decimal degrees
pub const COL_LATITUDE: &str = "Latitud";
/// Column holding longitude in decimal degrees
pub const COL_LONGITUDE: &str = "Longitud";
/// Column holding speed
pub const COL_SPEED: &str = "Velocidad";
/// Optional column holding the behavior label
pub const COL_BEHAVIOR: &str = "Comportamiento";

/// Label value for the negative (normal) class
const LABEL_NORMAL: &str = "Normal";

/// Encoded training or inference batch
///
/// `labels` is empty when the behavior column is absent from the input; when
/// non-empty it is index-aligned with `features`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f32>,
}

impl EncodedBatch {
    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }
}

/// Encoder binding rows to a model input policy
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode rows into feature vectors and labels under `policy`.
    ///
    /// Label encoding: exact string `"Normal"` maps to 0, anything else
    /// (including an empty value in a present column) maps to 1. When the
    /// behavior column is missing from every row, `labels` is empty and the
    /// caller must skip training.
    pub fn encode(rows: &[Row], policy: EncodingPolicy) -> EncodedBatch {
        let mut features = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());

        for row in rows {
            let lat = parse_field(row, COL_LATITUDE);
            let long = parse_field(row, COL_LONGITUDE);
            let speed = parse_field(row, COL_SPEED);

            let vector = match policy {
                EncodingPolicy::Normalized => {
                    if lat.is_nan() || long.is_nan() || speed.is_nan() {
                        continue;
                    }
                    normalized_vector(lat, long, speed)
                }
                EncodingPolicy::Raw => vec![lat, long, speed],
            };

            features.push(vector);

            if let Some(raw_label) = row.get(COL_BEHAVIOR) {
                labels.push(encode_label(raw_label));
            }
        }

        EncodedBatch { features, labels }
    }

    /// Encode a single observation under `policy`.
    ///
    /// Used by the live tracking path, where observations arrive already
    /// parsed rather than as tabular rows.
    pub fn encode_observation(obs: &Observation, policy: EncodingPolicy) -> Vec<f64> {
        match policy {
            EncodingPolicy::Raw => vec![obs.latitude, obs.longitude, obs.speed],
            EncodingPolicy::Normalized => {
                normalized_vector(obs.latitude, obs.longitude, obs.speed)
            }
        }
    }

    /// Encode a bare coordinate pair under the `Raw` policy.
    ///
    /// Live tracking supplies no speed dimension, so models attached to a
    /// tracking session take two inputs.
    pub fn encode_coordinate(latitude: f64, longitude: f64) -> Vec<f64> {
        vec![latitude, longitude]
    }

    /// Verify that a batch satisfies the feature/label alignment contract.
    pub fn check_alignment(batch: &EncodedBatch) -> Result<(), HerdError> {
        if batch.is_labeled() && batch.features.len() != batch.labels.len() {
            return Err(HerdError::Encoding(format!(
                "feature/label length mismatch: {} features, {} labels",
                batch.features.len(),
                batch.labels.len()
            )));
        }
        Ok(())
    }
}

fn parse_field(row: &Row, column: &str) -> f64 {
    row.get(column)
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn normalized_vector(lat: f64, long: f64, speed: f64) -> Vec<f64> {
    vec![(lat + 90.0) / 180.0, (long + 180.0) / 360.0, speed / 10.0]
}

fn encode_label(raw: &str) -> f32 {
    if raw == LABEL_NORMAL {
        0.0
    } else {
        1.0
    }
}
