//! Job lifecycle authority: the transition table, admin dashboard buckets, and
//! the role-scoped labels and actions derived from them.
//!
//! Everything here is a pure lookup. Unknown or missing input degrades to a
//! fallback value instead of an error, so a status introduced by the backend
//! ahead of this crate never takes a caller down.

mod buckets;
mod display;

pub use buckets::{derive_admin_bucket, status_bucket, AdminBucket};
pub use display::{
    available_actions, role_label, status_display, BadgeTone, JobAction, StatusDisplay,
};

use super::domain::{Actor, JobStatus, StatusValue};
use serde::Serialize;

/// A single permitted edge in the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub to: JobStatus,
    pub actor: Actor,
}

const fn edge(to: JobStatus, actor: Actor) -> Transition {
    Transition { to, actor }
}

use Actor::{Admin, Client, Landscaper, System};
use JobStatus::*;

const FROM_PENDING: &[Transition] = &[
    edge(Quoted, System),
    edge(Priced, Admin),
    edge(Cancelled, Admin),
    edge(Cancelled, Client),
];
const FROM_QUOTED: &[Transition] = &[
    edge(Priced, Admin),
    edge(Cancelled, Admin),
    edge(Cancelled, Client),
];
const FROM_PRICED: &[Transition] = &[
    edge(Available, Admin),
    edge(Assigned, Admin),
    edge(Cancelled, Admin),
];
const FROM_AVAILABLE: &[Transition] = &[
    edge(Assigned, Landscaper),
    edge(Priced, Admin),
    edge(Cancelled, Admin),
];
const FROM_SCHEDULED: &[Transition] = &[
    edge(Assigned, Landscaper),
    edge(Available, Admin),
    edge(Rescheduled, Admin),
    edge(Cancelled, Admin),
];
const FROM_ASSIGNED: &[Transition] = &[
    edge(Active, Landscaper),
    edge(Active, System),
    edge(Available, Admin),
    edge(Blocked, Landscaper),
    edge(Cancelled, Admin),
];
const FROM_ACTIVE: &[Transition] = &[
    edge(CompletedPendingReview, Landscaper),
    edge(CompletedPendingReview, System),
    edge(Blocked, Landscaper),
    edge(FlaggedReview, Admin),
    edge(Cancelled, Admin),
];
const FROM_PENDING_REVIEW: &[Transition] = &[
    edge(Completed, Admin),
    edge(Active, Admin),
    edge(FlaggedReview, Admin),
];
const FROM_COMPLETED_PENDING_REVIEW: &[Transition] = &[
    edge(Completed, Admin),
    edge(Active, Admin),
    edge(CompletionFlagged, Admin),
    edge(FlaggedReview, Admin),
];
const FROM_COMPLETED: &[Transition] = &[edge(FlaggedReview, Admin)];
const FROM_COMPLETION_FLAGGED: &[Transition] = &[
    edge(Active, Admin),
    edge(Completed, Admin),
    edge(Cancelled, Admin),
];
const FROM_FLAGGED_REVIEW: &[Transition] = &[
    edge(Active, Admin),
    edge(Completed, Admin),
    edge(Cancelled, Admin),
];
const FROM_BLOCKED: &[Transition] = &[
    edge(Assigned, Admin),
    edge(Available, Admin),
    edge(Rescheduled, Admin),
    edge(Cancelled, Admin),
];
const FROM_RESCHEDULED: &[Transition] = &[
    edge(Available, Admin),
    edge(Assigned, Admin),
    edge(Cancelled, Admin),
];

/// Outgoing edges for a status. `cancelled` is terminal.
pub const fn allowed_transitions(from: JobStatus) -> &'static [Transition] {
    match from {
        Pending => FROM_PENDING,
        Quoted => FROM_QUOTED,
        Priced => FROM_PRICED,
        Available => FROM_AVAILABLE,
        Scheduled => FROM_SCHEDULED,
        Assigned => FROM_ASSIGNED,
        Active => FROM_ACTIVE,
        PendingReview => FROM_PENDING_REVIEW,
        CompletedPendingReview => FROM_COMPLETED_PENDING_REVIEW,
        Completed => FROM_COMPLETED,
        CompletionFlagged => FROM_COMPLETION_FLAGGED,
        FlaggedReview => FROM_FLAGGED_REVIEW,
        Blocked => FROM_BLOCKED,
        Cancelled => &[],
        Rescheduled => FROM_RESCHEDULED,
    }
}

pub fn is_transition_allowed(from: JobStatus, to: JobStatus, actor: Actor) -> bool {
    allowed_transitions(from)
        .iter()
        .any(|transition| transition.to == to && transition.actor == actor)
}

/// Same check against a stored status, which may be missing or legacy.
pub fn is_transition_allowed_from(
    from: Option<&StatusValue>,
    to: JobStatus,
    actor: Actor,
) -> bool {
    from.and_then(StatusValue::known)
        .map(|status| is_transition_allowed(status, to, actor))
        .unwrap_or(false)
}

/// Distinct targets the actor may move a job to, in table order.
pub fn allowed_targets(from: JobStatus, actor: Actor) -> Vec<JobStatus> {
    let mut targets = Vec::new();
    for transition in allowed_transitions(from) {
        if transition.actor == actor && !targets.contains(&transition.to) {
            targets.push(transition.to);
        }
    }
    targets
}
