use super::super::domain::{Actor, JobStatus, StatusValue};
use super::is_transition_allowed;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// Label and badge tone a role sees for a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub status: String,
    pub label: String,
    pub tone: BadgeTone,
}

/// Buttons a role may be offered. Each one is bound to a target status and
/// is only eligible when the transition table allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    CancelRequest,
    AcceptJob,
    StartJob,
    SubmitCompletion,
    ReportBlocker,
    SetPrice,
    ReleaseToMarketplace,
    AssignLandscaper,
    ApproveCompletion,
    ReopenJob,
    FlagCompletion,
    FlagForReview,
    Reschedule,
    CancelJob,
    SendQuote,
    StartOnArrival,
    AutoSubmitCompletion,
}

impl JobAction {
    pub const fn all() -> [Self; 17] {
        [
            Self::CancelRequest,
            Self::AcceptJob,
            Self::StartJob,
            Self::SubmitCompletion,
            Self::ReportBlocker,
            Self::SetPrice,
            Self::ReleaseToMarketplace,
            Self::AssignLandscaper,
            Self::ApproveCompletion,
            Self::ReopenJob,
            Self::FlagCompletion,
            Self::FlagForReview,
            Self::Reschedule,
            Self::CancelJob,
            Self::SendQuote,
            Self::StartOnArrival,
            Self::AutoSubmitCompletion,
        ]
    }

    pub const fn actor(self) -> Actor {
        match self {
            Self::CancelRequest => Actor::Client,
            Self::AcceptJob | Self::StartJob | Self::SubmitCompletion | Self::ReportBlocker => {
                Actor::Landscaper
            }
            Self::SendQuote | Self::StartOnArrival | Self::AutoSubmitCompletion => Actor::System,
            _ => Actor::Admin,
        }
    }

    pub const fn target(self) -> JobStatus {
        match self {
            Self::CancelRequest | Self::CancelJob => JobStatus::Cancelled,
            Self::AcceptJob | Self::AssignLandscaper => JobStatus::Assigned,
            Self::StartJob | Self::ReopenJob | Self::StartOnArrival => JobStatus::Active,
            Self::SubmitCompletion | Self::AutoSubmitCompletion => {
                JobStatus::CompletedPendingReview
            }
            Self::ReportBlocker => JobStatus::Blocked,
            Self::SetPrice => JobStatus::Priced,
            Self::ReleaseToMarketplace => JobStatus::Available,
            Self::ApproveCompletion => JobStatus::Completed,
            Self::FlagCompletion => JobStatus::CompletionFlagged,
            Self::FlagForReview => JobStatus::FlaggedReview,
            Self::Reschedule => JobStatus::Rescheduled,
            Self::SendQuote => JobStatus::Quoted,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CancelRequest => "Cancel Request",
            Self::AcceptJob => "Accept Job",
            Self::StartJob => "Start Job",
            Self::SubmitCompletion => "Submit Completion",
            Self::ReportBlocker => "Report a Problem",
            Self::SetPrice => "Set Price",
            Self::ReleaseToMarketplace => "Release to Landscapers",
            Self::AssignLandscaper => "Assign Landscaper",
            Self::ApproveCompletion => "Approve Completion",
            Self::ReopenJob => "Reopen Job",
            Self::FlagCompletion => "Flag Completion",
            Self::FlagForReview => "Flag for Review",
            Self::Reschedule => "Reschedule",
            Self::CancelJob => "Cancel Job",
            Self::SendQuote => "Send Quote",
            Self::StartOnArrival => "Start on Arrival",
            Self::AutoSubmitCompletion => "Submit Completion",
        }
    }
}

/// Per-role label table. The system actor shares the admin vocabulary.
pub const fn role_label(status: JobStatus, role: Actor) -> &'static str {
    match role {
        Actor::Client => client_label(status),
        Actor::Landscaper => landscaper_label(status),
        Actor::Admin | Actor::System => admin_label(status),
    }
}

const fn client_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "Request Received",
        JobStatus::Quoted => "Quote Sent",
        JobStatus::Priced => "Quote Ready",
        JobStatus::Available => "Finding a Landscaper",
        JobStatus::Scheduled => "Scheduled",
        JobStatus::Assigned => "Landscaper Assigned",
        JobStatus::Active => "In Progress",
        JobStatus::PendingReview | JobStatus::CompletedPendingReview => "Finishing Up",
        JobStatus::Completed => "Completed",
        JobStatus::CompletionFlagged | JobStatus::FlaggedReview => "Under Review",
        JobStatus::Blocked => "On Hold",
        JobStatus::Cancelled => "Cancelled",
        JobStatus::Rescheduled => "Rescheduled",
    }
}

const fn landscaper_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending | JobStatus::Quoted | JobStatus::Priced => "Not Yet Released",
        JobStatus::Available => "Open for Pickup",
        JobStatus::Scheduled => "Scheduled",
        JobStatus::Assigned => "Ready to Start",
        JobStatus::Active => "In Progress",
        JobStatus::PendingReview | JobStatus::CompletedPendingReview => "Awaiting Approval",
        JobStatus::Completed => "Completed",
        JobStatus::CompletionFlagged => "Completion Flagged",
        JobStatus::FlaggedReview => "Under Review",
        JobStatus::Blocked => "Blocked",
        JobStatus::Cancelled => "Cancelled",
        JobStatus::Rescheduled => "Rescheduled",
    }
}

const fn admin_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "Pending",
        JobStatus::Quoted => "Quoted",
        JobStatus::Priced => "Priced",
        JobStatus::Available => "Available",
        JobStatus::Scheduled => "Scheduled",
        JobStatus::Assigned => "Assigned",
        JobStatus::Active => "Active",
        JobStatus::PendingReview => "Pending Review",
        JobStatus::CompletedPendingReview => "Completion Pending Review",
        JobStatus::Completed => "Completed",
        JobStatus::CompletionFlagged => "Completion Flagged",
        JobStatus::FlaggedReview => "Flagged for Review",
        JobStatus::Blocked => "Blocked",
        JobStatus::Cancelled => "Cancelled",
        JobStatus::Rescheduled => "Rescheduled",
    }
}

const fn tone(status: JobStatus) -> BadgeTone {
    match status {
        JobStatus::Pending | JobStatus::Quoted | JobStatus::Cancelled => BadgeTone::Neutral,
        JobStatus::Priced
        | JobStatus::Available
        | JobStatus::Scheduled
        | JobStatus::Assigned
        | JobStatus::Active
        | JobStatus::Rescheduled => BadgeTone::Info,
        JobStatus::PendingReview | JobStatus::CompletedPendingReview => BadgeTone::Warning,
        JobStatus::Completed => BadgeTone::Success,
        JobStatus::CompletionFlagged | JobStatus::FlaggedReview | JobStatus::Blocked => {
            BadgeTone::Danger
        }
    }
}

pub fn status_display(status: Option<&StatusValue>, role: Actor) -> StatusDisplay {
    match status {
        Some(StatusValue::Known(known)) => StatusDisplay {
            status: known.as_str().to_string(),
            label: role_label(*known, role).to_string(),
            tone: tone(*known),
        },
        Some(StatusValue::Legacy(raw)) => StatusDisplay {
            status: raw.clone(),
            label: fallback_label(raw),
            tone: BadgeTone::Neutral,
        },
        None => StatusDisplay {
            status: String::new(),
            label: "Unknown".to_string(),
            tone: BadgeTone::Neutral,
        },
    }
}

fn fallback_label(raw: &str) -> String {
    let label = raw.trim().replace('_', " ");
    if label.is_empty() {
        "Unknown".to_string()
    } else {
        label
    }
}

/// Actions offered to `role` for a job in `status`; empty for unknown statuses.
pub fn available_actions(status: Option<&StatusValue>, role: Actor) -> Vec<JobAction> {
    let Some(current) = status.and_then(StatusValue::known) else {
        return Vec::new();
    };

    JobAction::all()
        .into_iter()
        .filter(|action| action.actor() == role)
        .filter(|action| is_transition_allowed(current, action.target(), role))
        .collect()
}
