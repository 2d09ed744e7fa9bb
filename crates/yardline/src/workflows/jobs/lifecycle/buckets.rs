use super::super::domain::{JobRecord, JobStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse grouping used by the admin dashboard. Derived on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminBucket {
    NeedsPricing,
    ReadyToRelease,
    Active,
    PendingReview,
    Completed,
    Exceptions,
    Unclassified,
}

impl AdminBucket {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::NeedsPricing,
            Self::ReadyToRelease,
            Self::Active,
            Self::PendingReview,
            Self::Completed,
            Self::Exceptions,
            Self::Unclassified,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NeedsPricing => "needs_pricing",
            Self::ReadyToRelease => "ready_to_release",
            Self::Active => "active",
            Self::PendingReview => "pending_review",
            Self::Completed => "completed",
            Self::Exceptions => "exceptions",
            Self::Unclassified => "unclassified",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NeedsPricing => "Needs Pricing",
            Self::ReadyToRelease => "Ready to Release",
            Self::Active => "Active",
            Self::PendingReview => "Pending Review",
            Self::Completed => "Completed",
            Self::Exceptions => "Exceptions",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for AdminBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed bucket for a recognized status.
pub const fn status_bucket(status: JobStatus) -> AdminBucket {
    match status {
        JobStatus::Pending | JobStatus::Quoted => AdminBucket::NeedsPricing,
        JobStatus::Priced => AdminBucket::ReadyToRelease,
        JobStatus::Available
        | JobStatus::Scheduled
        | JobStatus::Assigned
        | JobStatus::Active
        | JobStatus::Rescheduled => AdminBucket::Active,
        JobStatus::PendingReview | JobStatus::CompletedPendingReview => AdminBucket::PendingReview,
        JobStatus::Completed => AdminBucket::Completed,
        JobStatus::CompletionFlagged
        | JobStatus::FlaggedReview
        | JobStatus::Blocked
        | JobStatus::Cancelled => AdminBucket::Exceptions,
    }
}

/// Status wins when it is recognized; otherwise the record's columns decide.
pub fn derive_admin_bucket(job: &JobRecord) -> AdminBucket {
    if let Some(status) = job.known_status() {
        return status_bucket(status);
    }

    if job.completed_at.is_some() {
        return AdminBucket::Completed;
    }

    if job.assigned_landscaper.is_some() {
        return AdminBucket::Active;
    }

    let has_price = job.price.is_some();
    let has_priced_at = job.priced_at.is_some();
    if has_price && has_priced_at {
        return AdminBucket::ReadyToRelease;
    }

    if has_price || has_priced_at || !job.service_type.trim().is_empty() {
        return AdminBucket::NeedsPricing;
    }

    AdminBucket::Unclassified
}
