use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::workflows::jobs::completion::{CompletionEvidence, PhotoEvidence, PhotoKind};
use crate::workflows::jobs::domain::{
    Commitment, GeoPoint, JobDraft, JobId, JobLocation, JobRecord, JobStatus,
    LandscaperCandidate, LandscaperId, LandscaperTier, StatusValue, UrgencyTier,
};
use crate::workflows::jobs::repository::{
    CandidateDirectory, DirectoryError, JobNotification, JobRepository, NotificationError,
    NotificationPublisher, RepositoryError,
};
use crate::workflows::jobs::{job_router, JobService, JobWorkflowConfig};

/// Des Moines job site used across the fixtures.
pub(super) const SITE: GeoPoint = GeoPoint {
    lat: 41.5868,
    lng: -93.6250,
};

pub(super) fn draft() -> JobDraft {
    JobDraft {
        service_type: "lawn_mowing".to_string(),
        urgency: UrgencyTier::Standard,
        location: JobLocation {
            address: Some("400 Locust St, Des Moines, IA".to_string()),
            coordinates: Some(SITE),
        },
        preferred_date: NaiveDate::from_ymd_opt(2025, 6, 14),
        estimated_duration_hours: Some(2.0),
        notes: Some("Back gate code 4411".to_string()),
    }
}

pub(super) fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

pub(super) fn candidate(
    id: &str,
    lat_offset: f64,
    rating: f32,
    minutes: u32,
) -> LandscaperCandidate {
    LandscaperCandidate {
        id: LandscaperId(id.to_string()),
        name: format!("Crew {id}"),
        service_area: GeoPoint {
            lat: SITE.lat + lat_offset,
            lng: SITE.lng,
        },
        services: vec!["lawn_mowing".to_string(), "leaf_removal".to_string()],
        rating: Some(rating),
        avg_response_minutes: Some(minutes),
        accepting_work: true,
        tier: Some(LandscaperTier::Silver),
        commitments: Vec::new(),
    }
}

pub(super) fn roster() -> Vec<LandscaperCandidate> {
    let mut booked = candidate("ls-booked", 0.01, 5.0, 10);
    booked.commitments.push(Commitment {
        job_id: JobId("job-other".to_string()),
        starts_at: at(14, 7),
        duration_hours: 3.0,
    });

    let mut snow_only = candidate("ls-snow", 0.0, 5.0, 5);
    snow_only.services = vec!["snow_removal".to_string()];

    vec![
        candidate("ls-far", 0.20, 4.9, 20),
        candidate("ls-near", 0.01, 4.5, 45),
        booked,
        snow_only,
    ]
}

pub(super) fn photo(kind: PhotoKind, taken_at: Option<GeoPoint>) -> PhotoEvidence {
    PhotoEvidence {
        kind,
        storage_key: format!("jobs/{kind:?}.jpg").to_ascii_lowercase(),
        taken_at,
    }
}

pub(super) fn on_site_evidence() -> CompletionEvidence {
    CompletionEvidence {
        photos: vec![
            photo(PhotoKind::Before, Some(SITE)),
            photo(PhotoKind::After, Some(SITE)),
        ],
    }
}

pub(super) type MemoryService =
    JobService<MemoryRepository, MemoryDirectory, MemoryNotifications>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    build_service_with(roster())
}

pub(super) fn build_service_with(
    candidates: Vec<LandscaperCandidate>,
) -> (
    MemoryService,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = JobService::new(
        repository.clone(),
        Arc::new(MemoryDirectory::new(candidates)),
        notifications.clone(),
        JobWorkflowConfig::default(),
    );
    (service, repository, notifications)
}

/// Stores a job directly, bypassing the lifecycle checks.
pub(super) fn seed(
    repository: &MemoryRepository,
    id: &str,
    status: Option<StatusValue>,
) -> JobRecord {
    let mut record = JobRecord::from_draft(JobId(id.to_string()), draft(), Utc::now());
    record.status = status;
    repository.put(record.clone());
    record
}

pub(super) fn seed_status(
    repository: &MemoryRepository,
    id: &str,
    status: JobStatus,
) -> JobRecord {
    seed(repository, id, Some(StatusValue::Known(status)))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<JobId, JobRecord>>>,
}

impl MemoryRepository {
    pub(super) fn put(&self, record: JobRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn stored(&self, id: &JobId) -> JobRecord {
        self.fetch(id)
            .expect("fetch succeeds")
            .expect("record present")
    }
}

impl JobRepository for MemoryRepository {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: JobRecord, read_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(existing) if existing.updated_at == read_at => {
                *existing = record;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Stale),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl JobRepository for UnavailableRepository {
    fn insert(&self, _record: JobRecord) -> Result<JobRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: JobRecord, _read_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Holds every reader at the barrier until all of them have loaded their
/// copy, so concurrent writers start from the same version.
pub(super) struct LockstepRepository {
    pub(super) inner: MemoryRepository,
    readers: Barrier,
}

impl LockstepRepository {
    pub(super) fn new(inner: MemoryRepository, readers: usize) -> Self {
        Self {
            inner,
            readers: Barrier::new(readers),
        }
    }
}

impl JobRepository for LockstepRepository {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: JobRecord, read_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.inner.update(record, read_at)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        let record = self.inner.fetch(id);
        self.readers.wait();
        record
    }

    fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        self.inner.list()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    candidates: Vec<LandscaperCandidate>,
}

impl MemoryDirectory {
    pub(super) fn new(candidates: Vec<LandscaperCandidate>) -> Self {
        Self { candidates }
    }
}

impl CandidateDirectory for MemoryDirectory {
    fn candidates_for(
        &self,
        _service_type: &str,
    ) -> Result<Vec<LandscaperCandidate>, DirectoryError> {
        Ok(self.candidates.clone())
    }
}

/// Parks the first lookup until the test releases it, so a second request
/// can overtake the first.
pub(super) struct BlockingDirectory {
    calls: AtomicUsize,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    candidates: Vec<LandscaperCandidate>,
}

impl BlockingDirectory {
    pub(super) fn new(
        candidates: Vec<LandscaperCandidate>,
    ) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let directory = Self {
            calls: AtomicUsize::new(0),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            candidates,
        };
        (directory, entered_rx, release_tx)
    }
}

impl CandidateDirectory for BlockingDirectory {
    fn candidates_for(
        &self,
        _service_type: &str,
    ) -> Result<Vec<LandscaperCandidate>, DirectoryError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered
                .lock()
                .expect("entered mutex poisoned")
                .send(())
                .expect("test still listening");
            self.release
                .lock()
                .expect("release mutex poisoned")
                .recv()
                .expect("test releases the first lookup");
        }
        Ok(self.candidates.clone())
    }
}

pub(super) struct OfflineDirectory;

impl CandidateDirectory for OfflineDirectory {
    fn candidates_for(
        &self,
        _service_type: &str,
    ) -> Result<Vec<LandscaperCandidate>, DirectoryError> {
        Err(DirectoryError::Unavailable("roster sync failed".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<JobNotification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<JobNotification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.template)
            .collect()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: JobNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifications;

impl NotificationPublisher for FailingNotifications {
    fn publish(&self, _notification: JobNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("sms gateway timeout".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn job_router_with_service(service: MemoryService) -> axum::Router {
    job_router(Arc::new(service))
}
