use super::super::domain::{Commitment, GeoPoint, LandscaperCandidate, UrgencyTier};
use super::config::{MatchWeights, MatchingConfig};
use chrono::{Duration, NaiveDateTime};

/// Proposed work window checked against a candidate's commitments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScheduleWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ScheduleWindow {
    pub(crate) fn new(start: NaiveDateTime, duration_hours: f32) -> Self {
        Self {
            start,
            end: window_end(start, duration_hours),
        }
    }

    fn overlaps(&self, commitment: &Commitment) -> bool {
        let other_end = window_end(commitment.starts_at, commitment.duration_hours);
        self.start < other_end && commitment.starts_at < self.end
    }
}

/// End of a window starting at `start`. Durations past chrono's range run to
/// `NaiveDateTime::MAX`.
fn window_end(start: NaiveDateTime, duration_hours: f32) -> NaiveDateTime {
    hours(duration_hours)
        .and_then(|duration| start.checked_add_signed(duration))
        .unwrap_or(NaiveDateTime::MAX)
}

fn hours(value: f32) -> Option<Duration> {
    let minutes = if value.is_finite() && value > 0.0 {
        (value as f64 * 60.0).round() as i64
    } else {
        0
    };
    Duration::try_minutes(minutes)
}

pub(crate) struct CandidateScore {
    pub score: u8,
    pub distance_miles: f64,
    pub available: bool,
    pub has_schedule_conflict: bool,
    pub reasons: Vec<String>,
}

pub(crate) fn weights_for(urgency: UrgencyTier, config: &MatchingConfig) -> &MatchWeights {
    if urgency.is_urgent() {
        &config.urgent_weights
    } else {
        &config.standard_weights
    }
}

pub(crate) fn score_candidate(
    origin: &GeoPoint,
    candidate: &LandscaperCandidate,
    urgency: UrgencyTier,
    window: Option<&ScheduleWindow>,
    config: &MatchingConfig,
) -> CandidateScore {
    let weights = weights_for(urgency, config);
    let mut reasons = Vec::new();
    let mut total = 0.0;

    let distance_miles = origin.distance_miles(&candidate.service_area);
    let proximity = proximity_factor(distance_miles, config.max_distance_miles);
    total += proximity * weights.proximity;
    reasons.push(format!("{distance_miles:.1} miles away"));

    if let Some(rating) = candidate.rating {
        let clamped = rating.clamp(0.0, 5.0) as f64;
        total += clamped / 5.0 * weights.rating;
        reasons.push(format!("{clamped:.1}★ rating"));
    }

    if let Some(minutes) = candidate.avg_response_minutes {
        let factor = responsiveness_factor(minutes, config);
        total += factor * weights.responsiveness;
        if minutes <= config.fast_response_minutes {
            reasons.push("fast responder".to_string());
        }
    }

    let has_schedule_conflict = window
        .map(|window| candidate.commitments.iter().any(|c| window.overlaps(c)))
        .unwrap_or(false);
    let available = candidate.accepting_work && !has_schedule_conflict;
    if available {
        total += weights.availability;
        reasons.push("available".to_string());
    }
    if has_schedule_conflict {
        reasons.push("schedule conflict".to_string());
    }

    if let Some(tier) = candidate.tier {
        reasons.push(format!("{} tier", tier.label()));
    }

    CandidateScore {
        score: total.round().clamp(0.0, 100.0) as u8,
        distance_miles,
        available,
        has_schedule_conflict,
        reasons,
    }
}

fn proximity_factor(distance_miles: f64, max_distance_miles: f64) -> f64 {
    if !distance_miles.is_finite() || max_distance_miles <= 0.0 {
        return 0.0;
    }
    (1.0 - distance_miles / max_distance_miles).max(0.0)
}

fn responsiveness_factor(minutes: u32, config: &MatchingConfig) -> f64 {
    let fast = config.fast_response_minutes;
    let slow = config.slow_response_minutes;
    if minutes <= fast {
        return 1.0;
    }
    if minutes >= slow || slow <= fast {
        return 0.0;
    }
    (slow - minutes) as f64 / (slow - fast) as f64
}
