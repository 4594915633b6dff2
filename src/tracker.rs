//! Live tracking orchestration
//!
//! A tracking session owns one animal's [`TrackState`] and optionally a
//! trained classifier. Each incoming coordinate is validated, fed through
//! the geospatial state machine, and classified when a model is attached.

use crate::encoder::FeatureEncoder;
use crate::error::HerdError;
use crate::model::TrainedModel;
use crate::predictor::PredictionService;
use crate::types::{Behavior, Observation, Recommendation, TrackEvent, TrackState};
use serde::{Deserialize, Serialize};

/// Snapshot returned to the caller after each accepted coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackUpdate {
    pub events: Vec<TrackEvent>,
    pub last_prediction: Option<Behavior>,
    pub total_distance_km: f64,
    pub total_energy: f64,
    pub recommendation: Option<Recommendation>,
    pub observations: usize,
}

/// Tracking session for a single animal
///
/// The session is the sole owner of its state; there is no cross-session
/// sharing and no terminal transition. Dropping the session ends it.
pub struct TrackingSession {
    state: TrackState,
    model: Option<TrainedModel>,
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingSession {
    /// Start a session with no classifier attached
    pub fn new() -> Self {
        Self {
            state: TrackState::default(),
            model: None,
        }
    }

    /// Start a session that classifies each coordinate with `model`.
    ///
    /// Live coordinates carry no speed dimension, so the model must take
    /// two raw inputs.
    pub fn with_model(model: TrainedModel) -> Result<Self, HerdError> {
        if model.input_width() != 2 {
            return Err(HerdError::Encoding(format!(
                "live tracking requires a 2-input model, got width {}",
                model.input_width()
            )));
        }
        Ok(Self {
            state: TrackState::default(),
            model: Some(model),
        })
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Record one coordinate given as raw text input.
    ///
    /// Non-numeric input is rejected with [`HerdError::InvalidInput`] and
    /// leaves the state untouched; the caller re-prompts rather than
    /// crashing. Rejection includes the textual float forms `"NaN"` and
    /// `"inf"` — a single non-finite observation would otherwise poison the
    /// distance and energy accumulators for the rest of the session.
    pub fn add_tracked_coordinate(
        &mut self,
        latitude: &str,
        longitude: &str,
    ) -> Result<TrackUpdate, HerdError> {
        let lat = parse_finite(latitude, "latitude")?;
        let long = parse_finite(longitude, "longitude")?;

        self.add_coordinate(lat, long)
    }

    /// Record one coordinate already parsed as floats.
    pub fn add_coordinate(&mut self, latitude: f64, longitude: f64) -> Result<TrackUpdate, HerdError> {
        let obs = Observation::new(latitude, longitude, 0.0);
        let events = self.state.add_observation(obs);

        if let Some(model) = &self.model {
            let vector = FeatureEncoder::encode_coordinate(latitude, longitude);
            let prediction = PredictionService::predict_one(model, &vector)?;
            self.state.last_prediction = Some(prediction);
        }

        Ok(TrackUpdate {
            events,
            last_prediction: self.state.last_prediction,
            total_distance_km: self.state.total_distance_km,
            total_energy: self.state.total_energy,
            recommendation: self.state.recommendation,
            observations: self.state.history.len(),
        })
    }
}

fn parse_finite(raw: &str, field: &str) -> Result<f64, HerdError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| HerdError::InvalidInput(format!("{field} {raw:?}")))?;
    if !value.is_finite() {
        return Err(HerdError::InvalidInput(format!("{field} {raw:?}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierModel, ClassifierSpec, NoopObserver, TrainConfig};
    use pretty_assertions::assert_eq;

    fn make_live_model() -> TrainedModel {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..16 {
            let jitter = (i as f64) * 0.01;
            features.push(vec![10.0 + jitter, 10.0]);
            labels.push(0.0);
            features.push(vec![50.0 - jitter, 50.0]);
            labels.push(1.0);
        }
        let config = TrainConfig {
            epochs: 60,
            validation_split: 0.0,
            learning_rate: 0.01,
            ..TrainConfig::default()
        };
        ClassifierModel::train(
            &features,
            &labels,
            ClassifierSpec::live(),
            &config,
            &mut NoopObserver,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_input_is_rejected_not_recorded() {
        let mut session = TrackingSession::new();

        let result = session.add_tracked_coordinate("not-a-number", "10.0");
        assert!(matches!(result, Err(HerdError::InvalidInput(_))));
        assert!(session.state().history.is_empty());

        let result = session.add_tracked_coordinate("10.0", "");
        assert!(matches!(result, Err(HerdError::InvalidInput(_))));
        assert!(session.state().history.is_empty());
    }

    #[test]
    fn test_non_finite_input_is_rejected_not_recorded() {
        let mut session = TrackingSession::new();
        session.add_tracked_coordinate("0", "0").unwrap();

        // "NaN" and "inf" parse as f64 but must not pass the gate: one
        // NaN observation would make the accumulators NaN for every later
        // valid coordinate.
        for (lat, long) in [("NaN", "0"), ("0", "nan"), ("inf", "0"), ("0", "-inf")] {
            let result = session.add_tracked_coordinate(lat, long);
            assert!(matches!(result, Err(HerdError::InvalidInput(_))));
        }
        assert_eq!(session.state().history.len(), 1);

        let update = session.add_tracked_coordinate("0", "1").unwrap();
        assert!(update.total_distance_km.is_finite());
        assert!(update.total_energy.is_finite());
        assert!((update.total_distance_km - 111.19).abs() < 0.5);
    }

    #[test]
    fn test_valid_text_input_is_recorded() {
        let mut session = TrackingSession::new();

        let update = session.add_tracked_coordinate(" 12.5 ", "-3.25").unwrap();
        assert_eq!(update.observations, 1);
        assert_eq!(session.state().history[0].latitude, 12.5);
        assert_eq!(session.state().history[0].longitude, -3.25);
        assert_eq!(update.last_prediction, None);
    }

    #[test]
    fn test_session_surfaces_stationary_alert() {
        let mut session = TrackingSession::new();

        session.add_tracked_coordinate("1", "1").unwrap();
        session.add_tracked_coordinate("1", "1").unwrap();
        let update = session.add_tracked_coordinate("1", "1").unwrap();

        assert_eq!(update.events.len(), 1);
        assert!(matches!(update.events[0], TrackEvent::StationaryAlert { .. }));
    }

    #[test]
    fn test_attached_model_sets_last_prediction() {
        let model = make_live_model();
        let mut session = TrackingSession::with_model(model).unwrap();

        let update = session.add_tracked_coordinate("10.0", "10.0").unwrap();
        assert!(update.last_prediction.is_some());
        assert_eq!(session.state().last_prediction, update.last_prediction);
    }

    #[test]
    fn test_three_input_model_is_refused() {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..8 {
            features.push(vec![0.1 * i as f64, 0.2, 0.3]);
            labels.push((i % 2) as f32);
        }
        let config = TrainConfig {
            epochs: 2,
            validation_split: 0.0,
            ..TrainConfig::default()
        };
        let model = ClassifierModel::train(
            &features,
            &labels,
            ClassifierSpec::batch(),
            &config,
            &mut NoopObserver,
        )
        .unwrap();

        assert!(TrackingSession::with_model(model).is_err());
    }

    #[test]
    fn test_update_snapshot_tracks_totals() {
        let mut session = TrackingSession::new();

        session.add_tracked_coordinate("0", "0").unwrap();
        let update = session.add_tracked_coordinate("0", "1").unwrap();

        assert!((update.total_distance_km - 111.19).abs() < 0.5);
        assert!(update.total_energy > 0.0);
        assert_eq!(update.recommendation, Some(crate::types::Recommendation::Continue));
        assert_eq!(update.observations, 2);
    }
}
