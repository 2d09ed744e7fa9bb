//! Job lifecycle authority, landscaper matching, and the service/router that
//! put them behind an API.
//!
//! The lifecycle and matching modules are pure lookups and scoring. Storage,
//! the candidate pool, and outbound notifications reach the service through
//! the traits in [`repository`].

pub mod completion;
pub mod domain;
pub mod lifecycle;
pub mod matching;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use completion::{
    CompletionEvidence, CompletionGuard, CompletionPolicy, CompletionViolation, PhotoEvidence,
    PhotoKind,
};
pub use domain::{
    Actor, Commitment, GeoPoint, JobDescriptor, JobDraft, JobId, JobLocation, JobRecord,
    JobStatus, LandscaperCandidate, LandscaperId, LandscaperTier, StatusValue, UrgencyTier,
};
pub use lifecycle::{
    allowed_targets, allowed_transitions, available_actions, derive_admin_bucket,
    is_transition_allowed, role_label, status_display, AdminBucket, JobAction, StatusDisplay,
    Transition,
};
pub use matching::{
    find_best_matches, LandscaperMatch, MatchWeights, MatchingConfig, MatchingEngine,
    ProposedSchedule,
};
pub use repository::{
    CandidateDirectory, DirectoryError, JobNotification, JobRepository, JobView,
    NotificationError, NotificationPublisher, RepositoryError,
};
pub use router::job_router;
pub use service::{
    DashboardBucket, JobService, JobServiceError, JobWorkflowConfig, MatchReport, MatchRequest,
    TransitionRequest,
};
