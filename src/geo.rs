//! Geospatial tracking analytics
//!
//! Streaming state machine over a sequence of coordinate observations:
//! great-circle distance accumulation, energy-expenditure estimation,
//! repeated-location alerting, and activity recommendations. State is
//! append-only; the accumulators never decrease.

use crate::types::{Observation, Recommendation, TrackEvent, TrackState};

/// Mean Earth radius used by the haversine formula (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed animal weight for energy estimation (kg)
pub const AVERAGE_WEIGHT_KG: f64 = 50.0;

/// Calories burned per km per kg of body weight
pub const CALORIC_FACTOR: f64 = 0.05;

/// Visit count at which a location triggers a stationary alert
pub const STATIONARY_VISIT_THRESHOLD: u32 = 3;

/// Energy at which the recommendation moves from Continue to Rest
pub const REST_ENERGY_THRESHOLD: f64 = 500.0;

/// Energy at which the recommendation moves from Rest to ReturnToGroup
pub const RETURN_ENERGY_THRESHOLD: f64 = 1000.0;

impl TrackState {
    /// Record one observation, updating the accumulators and returning any
    /// emitted events.
    ///
    /// The stationary alert fires exactly once per quantized location, on
    /// the observation that brings its visit count to three. Distance and
    /// energy accrue from the second observation onward.
    pub fn add_observation(&mut self, obs: Observation) -> Vec<TrackEvent> {
        let mut events = Vec::new();

        let key = quantize_key(obs.latitude, obs.longitude);
        let count = self.location_counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == STATIONARY_VISIT_THRESHOLD {
            events.push(TrackEvent::StationaryAlert { key });
        }

        if let Some(last) = self.history.last() {
            let distance = haversine_km(last.latitude, last.longitude, obs.latitude, obs.longitude);
            self.total_distance_km += distance;
            self.total_energy += distance * AVERAGE_WEIGHT_KG * CALORIC_FACTOR;
            self.recommendation = Some(recommend(self.total_energy));
        }

        self.history.push(obs);
        events
    }
}

/// Exact-match grouping key for a coordinate pair.
///
/// Uses the decimal formatting of both floats with no rounding tolerance, so
/// only bitwise-identical revisits count as the same location.
pub fn quantize_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude},{longitude}")
}

/// Great-circle distance between two coordinates (km), haversine formula.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Recommendation thresholds are closed-open: 500 is Rest, 1000 is
/// ReturnToGroup.
fn recommend(total_energy: f64) -> Recommendation {
    if total_energy >= RETURN_ENERGY_THRESHOLD {
        Recommendation::ReturnToGroup
    } else if total_energy >= REST_ENERGY_THRESHOLD {
        Recommendation::Rest
    } else {
        Recommendation::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn obs(lat: f64, lon: f64) -> Observation {
        Observation::new(lat, lon, 0.0)
    }

    #[test]
    fn test_haversine_symmetric_and_zero_on_self() {
        let ab = haversine_km(10.0, 20.0, 30.0, 40.0);
        let ba = haversine_km(30.0, 40.0, 10.0, 20.0);
        assert!((ab - ba).abs() < 1e-9);

        assert_eq!(haversine_km(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.5, "unexpected distance {d}");
    }

    #[test]
    fn test_distance_and_energy_accumulate() {
        let mut state = TrackState::default();
        state.add_observation(obs(0.0, 0.0));
        state.add_observation(obs(0.0, 1.0));

        assert!((state.total_distance_km - 111.19).abs() < 0.5);
        let expected_energy = state.total_distance_km * AVERAGE_WEIGHT_KG * CALORIC_FACTOR;
        assert!((state.total_energy - expected_energy).abs() < 1e-9);
        assert!((state.total_energy - 277.97).abs() < 1.5);
        assert_eq!(state.recommendation, Some(Recommendation::Continue));
    }

    #[test]
    fn test_first_observation_accrues_nothing() {
        let mut state = TrackState::default();
        let events = state.add_observation(obs(45.0, 45.0));

        assert!(events.is_empty());
        assert_eq!(state.total_distance_km, 0.0);
        assert_eq!(state.total_energy, 0.0);
        assert_eq!(state.recommendation, None);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_stationary_alert_fires_exactly_once() {
        let mut state = TrackState::default();

        assert!(state.add_observation(obs(1.0, 1.0)).is_empty());
        assert!(state.add_observation(obs(1.0, 1.0)).is_empty());

        let third = state.add_observation(obs(1.0, 1.0));
        assert_eq!(
            third,
            vec![TrackEvent::StationaryAlert {
                key: quantize_key(1.0, 1.0)
            }]
        );

        // A fourth identical observation stays silent
        assert!(state.add_observation(obs(1.0, 1.0)).is_empty());
        assert_eq!(state.location_counts[&quantize_key(1.0, 1.0)], 4);
    }

    #[test]
    fn test_quantize_key_is_exact_match() {
        assert_eq!(quantize_key(1.0, 1.0), quantize_key(1.0, 1.0));
        assert_ne!(quantize_key(1.0, 1.0), quantize_key(1.0000001, 1.0));
    }

    #[test]
    fn test_recommendation_boundaries_closed_open() {
        assert_eq!(recommend(499.999), Recommendation::Continue);
        assert_eq!(recommend(500.0), Recommendation::Rest);
        assert_eq!(recommend(999.999), Recommendation::Rest);
        assert_eq!(recommend(1000.0), Recommendation::ReturnToGroup);
    }

    #[test]
    fn test_recommendation_transitions_with_accumulation() {
        let mut state = TrackState::default();
        state.add_observation(obs(0.0, 0.0));

        // ~111 km per degree of longitude at the equator, ~278 energy units
        state.add_observation(obs(0.0, 1.0));
        assert_eq!(state.recommendation, Some(Recommendation::Continue));

        state.add_observation(obs(0.0, 2.0));
        assert_eq!(state.recommendation, Some(Recommendation::Rest));

        state.add_observation(obs(0.0, 3.0));
        state.add_observation(obs(0.0, 4.0));
        assert_eq!(state.recommendation, Some(Recommendation::ReturnToGroup));
    }

    #[test]
    fn test_totals_match_pairwise_sum() {
        let path = [
            obs(10.0, 10.0),
            obs(10.5, 10.2),
            obs(11.0, 10.9),
            obs(11.2, 11.4),
        ];

        let mut state = TrackState::default();
        for o in path {
            state.add_observation(o);
        }

        let mut expected = 0.0;
        for pair in path.windows(2) {
            expected += haversine_km(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            );
        }

        assert!((state.total_distance_km - expected).abs() < 1e-9);
        assert_eq!(state.history.len(), 4);
    }

    #[test]
    fn test_accumulators_are_monotonic() {
        let mut state = TrackState::default();
        let mut last_distance = 0.0;
        let mut last_energy = 0.0;

        for i in 0..20 {
            state.add_observation(obs(i as f64 * 0.1, i as f64 * 0.1));
            assert!(state.total_distance_km >= last_distance);
            assert!(state.total_energy >= last_energy);
            last_distance = state.total_distance_km;
            last_energy = state.total_energy;
        }
    }
}
