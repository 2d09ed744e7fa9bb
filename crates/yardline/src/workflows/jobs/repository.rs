use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Actor, JobId, JobRecord, LandscaperCandidate};
use super::lifecycle::{
    available_actions, derive_admin_bucket, status_display, AdminBucket, JobAction, StatusDisplay,
};

/// Storage abstraction for job records, backed by the hosted database in
/// production and by in-memory maps in tests and demos.
pub trait JobRepository: Send + Sync {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, RepositoryError>;
    /// Replace a stored record only while its `updated_at` still equals
    /// `read_at`, the timestamp the caller loaded. Otherwise returns `Stale`.
    fn update(&self, record: JobRecord, read_at: DateTime<Utc>) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<JobRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of candidate landscapers for a service type.
pub trait CandidateDirectory: Send + Sync {
    fn candidates_for(&self, service_type: &str)
        -> Result<Vec<LandscaperCandidate>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("candidate directory unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (push, e-mail, SMS adapters).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: JobNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNotification {
    pub template: String,
    pub job_id: JobId,
    pub recipient: Actor,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Role-scoped projection of a job for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job: JobRecord,
    pub role: Actor,
    pub display: StatusDisplay,
    pub bucket: AdminBucket,
    pub actions: Vec<JobAction>,
}

impl JobView {
    pub fn for_role(job: JobRecord, role: Actor) -> Self {
        let display = status_display(job.status.as_ref(), role);
        let bucket = derive_admin_bucket(&job);
        let actions = available_actions(job.status.as_ref(), role);
        Self {
            job,
            role,
            display,
            bucket,
            actions,
        }
    }
}
