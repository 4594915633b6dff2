//! Core types for the Herdsense pipelines
//!
//! This module defines the data structures that flow through both pipelines:
//! observations and labeled samples for the batch classifier, and the
//! per-animal tracking state mutated by the live analytics state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Behavior class produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Normal,
    Deviated,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Normal => "normal",
            Behavior::Deviated => "deviated",
        }
    }
}

/// Activity recommendation derived from accumulated energy expenditure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Continue,
    Rest,
    ReturnToGroup,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Continue => "continue",
            Recommendation::Rest => "rest",
            Recommendation::ReturnToGroup => "return_to_group",
        }
    }
}

/// A single positional sample for one animal
///
/// Latitude is in decimal degrees [-90, 90], longitude in [-180, 180],
/// speed in the velocity unit of the training data. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64, speed: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed,
        }
    }
}

/// An observation paired with its ground-truth behavior label
///
/// Only used during training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub observation: Observation,
    pub behavior: Behavior,
}

/// Rule mapping raw observation fields to a model's numeric input vector
///
/// The policy is bound to the model at training time; a model must never be
/// scored against vectors produced under the other policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingPolicy {
    /// `[lat, long, speed]` unmodified; parse failures pass through as NaN
    Raw,
    /// `[(lat+90)/180, (long+180)/360, speed/10]`; rows that fail to parse
    /// are dropped
    Normalized,
}

impl EncodingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingPolicy::Raw => "raw",
            EncodingPolicy::Normalized => "normalized",
        }
    }
}

/// Event emitted by the tracking state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TrackEvent {
    /// The animal has been observed at the same quantized location three
    /// times. Emitted exactly once per location key.
    StationaryAlert { key: String },
}

/// Per-animal tracking state
///
/// Created empty at session start and mutated only by
/// [`add_observation`](TrackState::add_observation). History is append-only;
/// the accumulators are monotonic non-decreasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackState {
    /// Ordered sequence of recorded observations
    pub history: Vec<Observation>,
    /// Cumulative great-circle distance (km)
    pub total_distance_km: f64,
    /// Cumulative estimated energy expenditure
    pub total_energy: f64,
    /// Visit count per quantized coordinate key
    pub location_counts: HashMap<String, u32>,
    /// Most recent classifier output for this animal, if a model is attached
    pub last_prediction: Option<Behavior>,
    /// Current activity recommendation, unset until distance accumulates
    pub recommendation: Option<Recommendation>,
}

/// Progress record emitted once per training epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
}
