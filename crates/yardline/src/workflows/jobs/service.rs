use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::completion::{
    CompletionEvidence, CompletionGuard, CompletionPolicy, CompletionViolation,
};
use super::domain::{
    Actor, GeoPoint, JobDraft, JobId, JobRecord, JobStatus, LandscaperId, StatusValue,
};
use super::lifecycle::{derive_admin_bucket, is_transition_allowed_from, AdminBucket};
use super::matching::{
    LandscaperMatch, MatchRequestGate, MatchingConfig, MatchingEngine, ProposedSchedule,
};
use super::repository::{
    CandidateDirectory, DirectoryError, JobNotification, JobRepository, JobView,
    NotificationPublisher, RepositoryError,
};

/// Hour a proposed date without a time is assumed to start at.
const WORKDAY_START_HOUR: u32 = 8;

/// Tunables for the job workflow service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobWorkflowConfig {
    pub matching: MatchingConfig,
    pub completion: CompletionPolicy,
}

/// Requested status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub to: JobStatus,
    pub actor: Actor,
    #[serde(default)]
    pub evidence: Option<CompletionEvidence>,
}

/// Parameters for a matching run. Unset fields fall back to the job record
/// and then to configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub proposed_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub estimated_duration_hours: Option<f32>,
}

/// Ranked candidates for a job plus the context they were scored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub job_id: JobId,
    /// True when the job had no coordinates and distance was scored from 0,0.
    pub location_estimated: bool,
    pub proposed_start: Option<NaiveDateTime>,
    pub matches: Vec<LandscaperMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardBucket {
    pub bucket: AdminBucket,
    pub label: &'static str,
    pub count: usize,
    pub job_ids: Vec<JobId>,
}

/// Service composing the lifecycle authority, matching engine, completion
/// guard, and the repository/notification seams.
pub struct JobService<R, D, N> {
    repository: Arc<R>,
    directory: Arc<D>,
    notifications: Arc<N>,
    engine: Arc<MatchingEngine>,
    guard: Arc<CompletionGuard>,
    gate: Arc<MatchRequestGate>,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

impl<R, D, N> JobService<R, D, N>
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        notifications: Arc<N>,
        config: JobWorkflowConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            notifications,
            engine: Arc::new(MatchingEngine::new(config.matching)),
            guard: Arc::new(CompletionGuard::with_policy(config.completion)),
            gate: Arc::new(MatchRequestGate::new()),
        }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Open a new job in `pending`.
    pub fn create(&self, draft: JobDraft) -> Result<JobRecord, JobServiceError> {
        if draft.service_type.trim().is_empty() {
            return Err(JobServiceError::InvalidDraft(
                "service_type is required".to_string(),
            ));
        }

        let record = JobRecord::from_draft(next_job_id(), draft, Utc::now());
        let stored = self.repository.insert(record)?;
        info!(job_id = %stored.id, service = %stored.service_type, "job created");
        Ok(stored)
    }

    pub fn get(&self, job_id: &JobId) -> Result<JobRecord, JobServiceError> {
        let record = self
            .repository
            .fetch(job_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn view(&self, job_id: &JobId, role: Actor) -> Result<JobView, JobServiceError> {
        Ok(JobView::for_role(self.get(job_id)?, role))
    }

    /// Apply a status change after checking the transition table and, for
    /// completion submissions, the photo evidence. Moves into `assigned` and
    /// `priced` carry data of their own and go through `auto_assign_job` and
    /// `set_price` instead.
    pub fn transition(
        &self,
        job_id: &JobId,
        request: TransitionRequest,
    ) -> Result<JobRecord, JobServiceError> {
        if let Some(operation) = dedicated_operation(request.to) {
            return Err(JobServiceError::DedicatedOperation {
                to: request.to,
                operation,
            });
        }

        let mut record = self.get(job_id)?;
        let read_at = record.updated_at;
        self.authorize(&record, request.to, request.actor)?;

        if CompletionGuard::requires_evidence(request.to) && request.actor != Actor::System {
            let evidence = request.evidence.unwrap_or_default();
            self.guard.check(&record, &evidence)?;
        }

        apply_status(&mut record, request.to);
        self.repository.update(record.clone(), read_at)?;
        info!(
            job_id = %record.id,
            status = %request.to,
            actor = %request.actor,
            "job status updated"
        );
        self.notify_transition(&record, request.to);
        Ok(record)
    }

    /// Admin pricing: records the amount and moves the job to `priced`.
    pub fn set_price(&self, job_id: &JobId, amount: f64) -> Result<JobRecord, JobServiceError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(JobServiceError::InvalidPrice(amount));
        }

        let mut record = self.get(job_id)?;
        let read_at = record.updated_at;
        self.authorize(&record, JobStatus::Priced, Actor::Admin)?;

        record.price = Some(amount);
        record.priced_at = Some(Utc::now());
        apply_status(&mut record, JobStatus::Priced);
        self.repository.update(record.clone(), read_at)?;
        info!(job_id = %record.id, amount, "job priced");
        self.notify_transition(&record, JobStatus::Priced);
        Ok(record)
    }

    /// Every job grouped by admin bucket, in dashboard order.
    pub fn dashboard(&self) -> Result<Vec<DashboardBucket>, JobServiceError> {
        let mut grouped: BTreeMap<AdminBucket, Vec<JobId>> = BTreeMap::new();
        for record in self.repository.list()? {
            grouped
                .entry(derive_admin_bucket(&record))
                .or_default()
                .push(record.id);
        }

        Ok(AdminBucket::ordered()
            .into_iter()
            .map(|bucket| {
                let mut job_ids = grouped.remove(&bucket).unwrap_or_default();
                job_ids.sort();
                DashboardBucket {
                    bucket,
                    label: bucket.label(),
                    count: job_ids.len(),
                    job_ids,
                }
            })
            .collect())
    }

    /// Rank candidates for a job. When a newer request for the same job starts
    /// before this one finishes, this one returns `Superseded`.
    pub fn find_matches(
        &self,
        job_id: &JobId,
        request: MatchRequest,
    ) -> Result<MatchReport, JobServiceError> {
        let record = self.get(job_id)?;
        let ticket = self.gate.begin(job_id);
        let candidates = match self.directory.candidates_for(&record.service_type) {
            Ok(candidates) => candidates,
            Err(err) => {
                self.gate.abandon(ticket);
                return Err(err.into());
            }
        };

        let proposed_start = request.proposed_start.or_else(|| {
            let start = NaiveTime::from_hms_opt(WORKDAY_START_HOUR, 0, 0)?;
            record.preferred_date.map(|date| date.and_time(start))
        });
        let schedule = ProposedSchedule {
            starts_at: proposed_start,
            duration_hours: request
                .estimated_duration_hours
                .or(record.estimated_duration_hours),
        };
        let limit = request.limit.unwrap_or(self.engine.config().default_limit);

        let matches = self
            .engine
            .find_best_matches(&record.descriptor(), &candidates, limit, schedule);
        let report = MatchReport {
            job_id: record.id.clone(),
            location_estimated: record.location.coordinates.is_none(),
            proposed_start,
            matches,
        };

        match self.gate.complete(ticket, report) {
            Some(report) => Ok(report),
            None => {
                info!(job_id = %job_id, "discarding superseded match request");
                Err(JobServiceError::Superseded)
            }
        }
    }

    /// Persist a chosen assignment. Failures are logged and reported as
    /// `false` so the caller decides whether to retry.
    pub fn auto_assign_job(
        &self,
        job_id: &JobId,
        landscaper_id: &LandscaperId,
        actor: Actor,
    ) -> bool {
        match self.assign(job_id, landscaper_id, actor) {
            Ok(record) => {
                info!(
                    job_id = %record.id,
                    landscaper_id = %landscaper_id,
                    actor = %actor,
                    "landscaper assigned"
                );
                true
            }
            Err(err) => {
                warn!(
                    job_id = %job_id,
                    landscaper_id = %landscaper_id,
                    actor = %actor,
                    error = %err,
                    "assignment failed"
                );
                false
            }
        }
    }

    /// GPS check-in from the assigned landscaper. Starts the job on behalf of
    /// the system actor when the position is inside the job-site geofence.
    pub fn record_arrival(
        &self,
        job_id: &JobId,
        landscaper_id: &LandscaperId,
        position: GeoPoint,
    ) -> Result<bool, JobServiceError> {
        let record = self.get(job_id)?;
        if record.assigned_landscaper.as_ref() != Some(landscaper_id) {
            return Ok(false);
        }

        match self.guard.arrival_transition(&record, &position) {
            Some(target) => {
                self.transition(
                    job_id,
                    TransitionRequest {
                        to: target,
                        actor: Actor::System,
                        evidence: None,
                    },
                )?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn assign(
        &self,
        job_id: &JobId,
        landscaper_id: &LandscaperId,
        actor: Actor,
    ) -> Result<JobRecord, JobServiceError> {
        let mut record = self.get(job_id)?;
        let read_at = record.updated_at;
        self.authorize(&record, JobStatus::Assigned, actor)?;

        record.assigned_landscaper = Some(landscaper_id.clone());
        apply_status(&mut record, JobStatus::Assigned);
        self.repository.update(record.clone(), read_at)?;
        self.notify_transition(&record, JobStatus::Assigned);
        Ok(record)
    }

    #[cfg(test)]
    pub(crate) fn pending_match_requests(&self) -> usize {
        self.gate.in_flight()
    }

    fn authorize(
        &self,
        record: &JobRecord,
        to: JobStatus,
        actor: Actor,
    ) -> Result<(), JobServiceError> {
        if is_transition_allowed_from(record.status.as_ref(), to, actor) {
            return Ok(());
        }

        Err(JobServiceError::TransitionRejected {
            from: record.status_str().to_string(),
            to,
            actor,
        })
    }

    fn notify_transition(&self, record: &JobRecord, status: JobStatus) {
        let Some((template, recipient)) = notification_for(status) else {
            return;
        };

        let mut details = BTreeMap::new();
        details.insert("status".to_string(), status.as_str().to_string());
        if let Some(landscaper) = &record.assigned_landscaper {
            details.insert("landscaper_id".to_string(), landscaper.0.clone());
        }
        if let Some(price) = record.price {
            details.insert("price".to_string(), format!("{price:.2}"));
        }

        let notification = JobNotification {
            template: template.to_string(),
            job_id: record.id.clone(),
            recipient,
            details,
        };

        if let Err(err) = self.notifications.publish(notification) {
            warn!(job_id = %record.id, template, error = %err, "notification not delivered");
        }
    }
}

fn dedicated_operation(target: JobStatus) -> Option<&'static str> {
    match target {
        JobStatus::Assigned => Some("auto_assign_job"),
        JobStatus::Priced => Some("set_price"),
        _ => None,
    }
}

/// `updated_at` always moves forward so a write is never mistaken for the
/// version it replaced.
fn apply_status(record: &mut JobRecord, status: JobStatus) {
    let floor = record
        .updated_at
        .checked_add_signed(Duration::microseconds(1))
        .unwrap_or(record.updated_at);
    let now = Utc::now().max(floor);
    match status {
        JobStatus::Completed => record.completed_at = Some(now),
        JobStatus::Available | JobStatus::Rescheduled => record.assigned_landscaper = None,
        _ => {}
    }
    record.status = Some(StatusValue::Known(status));
    record.updated_at = now;
}

fn notification_for(status: JobStatus) -> Option<(&'static str, Actor)> {
    match status {
        JobStatus::Priced => Some(("quote_ready", Actor::Client)),
        JobStatus::Assigned => Some(("job_assigned", Actor::Landscaper)),
        JobStatus::Active => Some(("job_started", Actor::Client)),
        JobStatus::CompletedPendingReview => Some(("completion_submitted", Actor::Admin)),
        JobStatus::Completed => Some(("job_completed", Actor::Client)),
        JobStatus::Blocked => Some(("job_blocked", Actor::Admin)),
        JobStatus::CompletionFlagged | JobStatus::FlaggedReview => {
            Some(("job_flagged", Actor::Admin))
        }
        JobStatus::Cancelled => Some(("job_cancelled", Actor::Client)),
        _ => None,
    }
}

/// Error raised by the job service.
#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("transition from '{from}' to '{to}' is not allowed for {actor}")]
    TransitionRejected {
        from: String,
        to: JobStatus,
        actor: Actor,
    },
    #[error(transparent)]
    Completion(#[from] CompletionViolation),
    #[error("moving a job to '{to}' requires {operation}")]
    DedicatedOperation {
        to: JobStatus,
        operation: &'static str,
    },
    #[error("invalid job draft: {0}")]
    InvalidDraft(String),
    #[error("price must be a positive amount (got {0})")]
    InvalidPrice(f64),
    #[error("a newer match request for this job superseded this one")]
    Superseded,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
