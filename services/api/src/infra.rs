use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;
use yardline::workflows::jobs::{
    Actor, CandidateDirectory, DirectoryError, JobId, JobNotification, JobRecord, JobRepository,
    JobStatus, LandscaperCandidate, NotificationError, NotificationPublisher, RepositoryError,
    UrgencyTier,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobRepository {
    records: Arc<Mutex<HashMap<JobId, JobRecord>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: JobRecord, read_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
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
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<JobRecord>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().cloned().collect())
    }
}

/// Candidate pool held in memory, optionally seeded from a roster CSV.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateDirectory {
    candidates: Arc<Vec<LandscaperCandidate>>,
}

impl InMemoryCandidateDirectory {
    pub(crate) fn new(candidates: Vec<LandscaperCandidate>) -> Self {
        Self {
            candidates: Arc::new(candidates),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl CandidateDirectory for InMemoryCandidateDirectory {
    fn candidates_for(
        &self,
        service_type: &str,
    ) -> Result<Vec<LandscaperCandidate>, DirectoryError> {
        Ok(self
            .candidates
            .iter()
            .filter(|candidate| candidate.offers(service_type))
            .cloned()
            .collect())
    }
}

/// Records notifications and logs them; stands in for push/SMS adapters.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<JobNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: JobNotification) -> Result<(), NotificationError> {
        info!(
            job_id = %notification.job_id,
            template = %notification.template,
            recipient = %notification.recipient,
            "notification queued"
        );
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<JobNotification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, or a bare date, which is
/// read as the start of the working day.
pub(crate) fn parse_start(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(start) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(start);
        }
    }

    let date = parse_date(trimmed)?;
    let start_of_day = NaiveTime::from_hms_opt(8, 0, 0)
        .ok_or_else(|| "invalid start-of-day time".to_string())?;
    Ok(date.and_time(start_of_day))
}

pub(crate) fn parse_actor(raw: &str) -> Result<Actor, String> {
    Actor::parse(raw).ok_or_else(|| {
        format!("unknown actor '{raw}' (expected admin, landscaper, system, or client)")
    })
}

pub(crate) fn parse_status(raw: &str) -> Result<JobStatus, String> {
    JobStatus::parse(raw).ok_or_else(|| format!("unknown job status '{raw}'"))
}

pub(crate) fn parse_urgency(raw: &str) -> Result<UrgencyTier, String> {
    UrgencyTier::parse(raw).ok_or_else(|| {
        format!("unknown urgency '{raw}' (expected standard, priority, or emergency)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use yardline::workflows::jobs::{GeoPoint, JobDraft, JobLocation, LandscaperId};

    #[test]
    fn bare_dates_start_at_eight() {
        let start = parse_start("2025-06-14").expect("date parses");
        assert_eq!(start.to_string(), "2025-06-14 08:00:00");

        let explicit = parse_start("2025-06-14T13:30").expect("datetime parses");
        assert_eq!(explicit.to_string(), "2025-06-14 13:30:00");

        assert!(parse_start("next tuesday").is_err());
    }

    #[test]
    fn directory_filters_by_service() {
        let crew = |id: &str, services: &[&str]| LandscaperCandidate {
            id: LandscaperId(id.to_string()),
            name: id.to_string(),
            service_area: GeoPoint::ORIGIN,
            services: services.iter().map(|s| s.to_string()).collect(),
            rating: None,
            avg_response_minutes: None,
            accepting_work: true,
            tier: None,
            commitments: Vec::new(),
        };
        let directory = InMemoryCandidateDirectory::new(vec![
            crew("ls-1", &["lawn_mowing"]),
            crew("ls-2", &["snow_removal"]),
            crew("ls-3", &[]),
        ]);

        let pool = directory
            .candidates_for("lawn_mowing")
            .expect("directory answers");
        let ids: Vec<&str> = pool.iter().map(|c| c.id.0.as_str()).collect();
        assert_eq!(ids, vec!["ls-1", "ls-3"]);
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn repository_rejects_duplicates_unknown_and_stale_updates() {
        let repository = InMemoryJobRepository::default();
        let draft = JobDraft {
            service_type: "lawn_mowing".to_string(),
            urgency: UrgencyTier::Standard,
            location: JobLocation::default(),
            preferred_date: None,
            estimated_duration_hours: None,
            notes: None,
        };
        let record = JobRecord::from_draft(JobId("job-1".to_string()), draft, Utc::now());

        repository.insert(record.clone()).expect("first insert");
        assert!(matches!(
            repository.insert(record.clone()),
            Err(RepositoryError::Conflict)
        ));

        let read_at = record.updated_at;
        let stranger = JobRecord {
            id: JobId("job-2".to_string()),
            ..record.clone()
        };
        assert!(matches!(
            repository.update(stranger, read_at),
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(repository.list().expect("list").len(), 1);

        let mut edited = record.clone();
        edited.notes = Some("gate code 4411".to_string());
        edited.updated_at = read_at + chrono::Duration::seconds(1);
        repository
            .update(edited.clone(), read_at)
            .expect("current version updates");

        let mut late = record;
        late.notes = Some("stale edit".to_string());
        assert!(matches!(
            repository.update(late, read_at),
            Err(RepositoryError::Stale)
        ));
        let stored = repository
            .fetch(&edited.id)
            .expect("fetch")
            .expect("record present");
        assert_eq!(stored.notes.as_deref(), Some("gate code 4411"));
    }

    #[test]
    fn publisher_keeps_sent_notifications() {
        let publisher = InMemoryNotificationPublisher::default();
        publisher
            .publish(JobNotification {
                template: "job_assigned".to_string(),
                job_id: JobId("job-1".to_string()),
                recipient: Actor::Landscaper,
                details: BTreeMap::new(),
            })
            .expect("publish succeeds");

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].template, "job_assigned");
    }

    #[test]
    fn parses_cli_enums_case_insensitively() {
        assert_eq!(parse_actor("Admin"), Ok(Actor::Admin));
        assert_eq!(parse_status("COMPLETED"), Ok(JobStatus::Completed));
        assert_eq!(parse_urgency("urgent"), Ok(UrgencyTier::Emergency));
        assert!(parse_actor("owner").is_err());
    }
}
