use serde::{Deserialize, Serialize};

/// Points each factor contributes at its best. A set should sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub proximity: f64,
    pub rating: f64,
    pub responsiveness: f64,
    pub availability: f64,
}

impl MatchWeights {
    pub const STANDARD: MatchWeights = MatchWeights {
        proximity: 40.0,
        rating: 30.0,
        responsiveness: 20.0,
        availability: 10.0,
    };

    pub const URGENT: MatchWeights = MatchWeights {
        proximity: 35.0,
        rating: 20.0,
        responsiveness: 35.0,
        availability: 10.0,
    };

    pub fn total(&self) -> f64 {
        self.proximity + self.rating + self.responsiveness + self.availability
    }
}

/// Tunables for the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub standard_weights: MatchWeights,
    pub urgent_weights: MatchWeights,
    /// Distance at which the proximity factor reaches zero.
    pub max_distance_miles: f64,
    pub fast_response_minutes: u32,
    pub slow_response_minutes: u32,
    /// Window length assumed when a proposed start has no duration.
    pub default_duration_hours: f32,
    pub default_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            standard_weights: MatchWeights::STANDARD,
            urgent_weights: MatchWeights::URGENT,
            max_distance_miles: 25.0,
            fast_response_minutes: 30,
            slow_response_minutes: 240,
            default_duration_hours: 2.0,
            default_limit: 5,
        }
    }
}
