use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for service jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for landscaper accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandscaperId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LandscaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every status a job can hold while moving through the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Quoted,
    Priced,
    Available,
    Scheduled,
    Assigned,
    Active,
    PendingReview,
    CompletedPendingReview,
    Completed,
    CompletionFlagged,
    FlaggedReview,
    Blocked,
    Cancelled,
    Rescheduled,
}

impl JobStatus {
    pub const fn ordered() -> [Self; 15] {
        [
            Self::Pending,
            Self::Quoted,
            Self::Priced,
            Self::Available,
            Self::Scheduled,
            Self::Assigned,
            Self::Active,
            Self::PendingReview,
            Self::CompletedPendingReview,
            Self::Completed,
            Self::CompletionFlagged,
            Self::FlaggedReview,
            Self::Blocked,
            Self::Cancelled,
            Self::Rescheduled,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Priced => "priced",
            Self::Available => "available",
            Self::Scheduled => "scheduled",
            Self::Assigned => "assigned",
            Self::Active => "active",
            Self::PendingReview => "pending_review",
            Self::CompletedPendingReview => "completed_pending_review",
            Self::Completed => "completed",
            Self::CompletionFlagged => "completion_flagged",
            Self::FlaggedReview => "flagged_review",
            Self::Blocked => "blocked",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }

    /// A terminal status has no outgoing transitions for any actor.
    pub fn is_terminal(self) -> bool {
        super::lifecycle::allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status as stored on a record: a recognized value or a legacy string the
/// lifecycle tables do not know yet.
///
/// Recognition ignores case and surrounding whitespace, and a recognized
/// value is written back in its canonical snake_case form (`" Assigned"`
/// round-trips as `"assigned"`). Unrecognized text is kept byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusValue {
    Known(JobStatus),
    Legacy(String),
}

impl StatusValue {
    pub fn known(&self) -> Option<JobStatus> {
        match self {
            StatusValue::Known(status) => Some(*status),
            StatusValue::Legacy(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusValue::Known(status) => status.as_str(),
            StatusValue::Legacy(raw) => raw,
        }
    }
}

impl From<String> for StatusValue {
    fn from(value: String) -> Self {
        match JobStatus::parse(&value) {
            Some(status) => StatusValue::Known(status),
            None => StatusValue::Legacy(value),
        }
    }
}

impl From<&str> for StatusValue {
    fn from(value: &str) -> Self {
        StatusValue::from(value.to_string())
    }
}

impl From<JobStatus> for StatusValue {
    fn from(value: JobStatus) -> Self {
        StatusValue::Known(value)
    }
}

impl From<StatusValue> for String {
    fn from(value: StatusValue) -> Self {
        match value {
            StatusValue::Known(status) => status.as_str().to_string(),
            StatusValue::Legacy(raw) => raw,
        }
    }
}

/// Role attempting an action against a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Admin,
    Landscaper,
    System,
    Client,
}

impl Actor {
    pub const fn ordered() -> [Self; 4] {
        [Self::Admin, Self::Landscaper, Self::System, Self::Client]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Landscaper => "landscaper",
            Self::System => "system",
            Self::Client => "client",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|actor| actor.as_str() == normalized)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly the client needs the work done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    #[default]
    Standard,
    Priority,
    Emergency,
}

impl UrgencyTier {
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::Priority | Self::Emergency)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" | "normal" => Some(Self::Standard),
            "priority" | "high" => Some(Self::Priority),
            "emergency" | "urgent" => Some(Self::Emergency),
            _ => None,
        }
    }
}

/// WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };

    const EARTH_RADIUS_MILES: f64 = 3958.8;

    /// Great-circle distance using the haversine formula.
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Self::EARTH_RADIUS_MILES * c
    }

    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        self.distance_miles(other) * 1609.344
    }
}

/// Service address as captured at intake; coordinates are optional because
/// many records only carry a free-form address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

/// Client request used to open a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub service_type: String,
    #[serde(default)]
    pub urgency: UrgencyTier,
    #[serde(default)]
    pub location: JobLocation,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_duration_hours: Option<f32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Job as persisted by the backend. Lifecycle and matching only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    #[serde(default)]
    pub status: Option<StatusValue>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub priced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_landscaper: Option<LandscaperId>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: JobLocation,
    pub service_type: String,
    #[serde(default)]
    pub urgency: UrgencyTier,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_duration_hours: Option<f32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn from_draft(id: JobId, draft: JobDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: Some(StatusValue::Known(JobStatus::Pending)),
            price: None,
            priced_at: None,
            assigned_landscaper: None,
            completed_at: None,
            location: draft.location,
            service_type: draft.service_type,
            urgency: draft.urgency,
            preferred_date: draft.preferred_date,
            estimated_duration_hours: draft.estimated_duration_hours,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn known_status(&self) -> Option<JobStatus> {
        self.status.as_ref().and_then(StatusValue::known)
    }

    pub fn status_str(&self) -> &str {
        self.status.as_ref().map(StatusValue::as_str).unwrap_or("")
    }

    /// Descriptor consumed by the matching engine.
    pub fn descriptor(&self) -> JobDescriptor {
        JobDescriptor {
            job_id: self.id.clone(),
            location: self.location.coordinates,
            service_type: self.service_type.clone(),
            urgency: self.urgency,
        }
    }
}

/// The slice of a job the matching engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: JobId,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    pub service_type: String,
    #[serde(default)]
    pub urgency: UrgencyTier,
}

/// Landscaper standing shown alongside match results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandscaperTier {
    Bronze,
    Silver,
    Gold,
}

impl LandscaperTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bronze" => Some(Self::Bronze),
            "silver" => Some(Self::Silver),
            "gold" => Some(Self::Gold),
            _ => None,
        }
    }
}

/// Work a landscaper has already committed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub job_id: JobId,
    pub starts_at: NaiveDateTime,
    pub duration_hours: f32,
}

/// Candidate landscaper as fetched from the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscaperCandidate {
    pub id: LandscaperId,
    pub name: String,
    pub service_area: GeoPoint,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub avg_response_minutes: Option<u32>,
    #[serde(default = "default_accepting_work")]
    pub accepting_work: bool,
    #[serde(default)]
    pub tier: Option<LandscaperTier>,
    #[serde(default)]
    pub commitments: Vec<Commitment>,
}

fn default_accepting_work() -> bool {
    true
}

impl LandscaperCandidate {
    /// An empty service list means the landscaper takes any work.
    pub fn offers(&self, service_type: &str) -> bool {
        self.services.is_empty()
            || self
                .services
                .iter()
                .any(|service| service.trim().eq_ignore_ascii_case(service_type.trim()))
    }
}
