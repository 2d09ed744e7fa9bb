mod config;
mod gate;
mod rules;

pub use config::{MatchWeights, MatchingConfig};
pub use gate::{MatchRequestGate, MatchTicket};

use super::domain::{GeoPoint, JobDescriptor, LandscaperCandidate, LandscaperId};
use chrono::NaiveDateTime;
use rules::{score_candidate, ScheduleWindow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Ranked candidate for a job. Computed per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscaperMatch {
    pub landscaper_id: LandscaperId,
    pub name: String,
    pub score: u8,
    pub distance_miles: f64,
    pub rating: Option<f32>,
    pub avg_response_minutes: Option<u32>,
    pub available: bool,
    pub reasons: Vec<String>,
    pub has_schedule_conflict: bool,
}

/// Optional scheduling context for a matching request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProposedSchedule {
    pub starts_at: Option<NaiveDateTime>,
    pub duration_hours: Option<f32>,
}

/// Stateless scorer that ranks an already-fetched candidate pool.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Top `limit` candidates ordered by score, then distance, then id.
    pub fn find_best_matches(
        &self,
        job: &JobDescriptor,
        candidates: &[LandscaperCandidate],
        limit: usize,
        schedule: ProposedSchedule,
    ) -> Vec<LandscaperMatch> {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let origin = job.location.unwrap_or_else(|| {
            warn!(
                job_id = %job.job_id,
                "job has no coordinates; scoring distance from 0,0"
            );
            GeoPoint::ORIGIN
        });

        let window = schedule.starts_at.map(|start| {
            let duration = schedule
                .duration_hours
                .unwrap_or(self.config.default_duration_hours);
            ScheduleWindow::new(start, duration)
        });

        let mut matches: Vec<LandscaperMatch> = candidates
            .iter()
            .filter(|candidate| candidate.offers(&job.service_type))
            .map(|candidate| {
                let scored = score_candidate(
                    &origin,
                    candidate,
                    job.urgency,
                    window.as_ref(),
                    &self.config,
                );
                LandscaperMatch {
                    landscaper_id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    score: scored.score,
                    distance_miles: scored.distance_miles,
                    rating: candidate.rating,
                    avg_response_minutes: candidate.avg_response_minutes,
                    available: scored.available,
                    reasons: scored.reasons,
                    has_schedule_conflict: scored.has_schedule_conflict,
                }
            })
            .collect();

        matches.sort_by(rank_order);
        matches.truncate(limit);

        debug!(
            job_id = %job.job_id,
            pool = candidates.len(),
            returned = matches.len(),
            "ranked landscaper candidates"
        );

        matches
    }
}

fn rank_order(a: &LandscaperMatch, b: &LandscaperMatch) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.distance_miles.total_cmp(&b.distance_miles))
        .then_with(|| a.landscaper_id.cmp(&b.landscaper_id))
}

/// Convenience wrapper using the default weights.
pub fn find_best_matches(
    job: &JobDescriptor,
    candidates: &[LandscaperCandidate],
    limit: usize,
    proposed_start: Option<NaiveDateTime>,
    estimated_duration_hours: Option<f32>,
) -> Vec<LandscaperMatch> {
    MatchingEngine::default().find_best_matches(
        job,
        candidates,
        limit,
        ProposedSchedule {
            starts_at: proposed_start,
            duration_hours: estimated_duration_hours,
        },
    )
}
