use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::super::domain::JobId;

/// Handle for one in-flight matching request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTicket {
    job_id: JobId,
    generation: u64,
}

impl MatchTicket {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the newest matching request per job so that a ranking computed for
/// a superseded request (an older date or duration edit) is dropped instead of
/// overwriting the latest one.
#[derive(Debug, Default)]
pub struct MatchRequestGate {
    sequence: AtomicU64,
    latest: Mutex<HashMap<JobId, u64>>,
}

impl MatchRequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, job_id: &JobId) -> MatchTicket {
        let generation = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let mut latest = self.latest.lock().unwrap_or_else(|err| err.into_inner());
        latest.insert(job_id.clone(), generation);
        MatchTicket {
            job_id: job_id.clone(),
            generation,
        }
    }

    pub fn is_current(&self, ticket: &MatchTicket) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|err| err.into_inner());
        latest.get(&ticket.job_id) == Some(&ticket.generation)
    }

    /// Drops the entry for a request that failed before producing a result,
    /// unless a newer request has already replaced it.
    pub fn abandon(&self, ticket: MatchTicket) {
        let mut latest = self.latest.lock().unwrap_or_else(|err| err.into_inner());
        if latest.get(&ticket.job_id) == Some(&ticket.generation) {
            latest.remove(&ticket.job_id);
        }
    }

    /// Jobs with a matching request still outstanding.
    pub fn in_flight(&self) -> usize {
        self.latest
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }

    /// Hands the value back only if no newer request started for the job.
    /// The entry is cleared once the current request completes.
    pub fn complete<T>(&self, ticket: MatchTicket, value: T) -> Option<T> {
        let mut latest = self.latest.lock().unwrap_or_else(|err| err.into_inner());
        if latest.get(&ticket.job_id) != Some(&ticket.generation) {
            return None;
        }
        latest.remove(&ticket.job_id);
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> JobId {
        JobId(id.to_string())
    }

    #[test]
    fn newest_request_wins() {
        let gate = MatchRequestGate::new();
        let first = gate.begin(&job("job-1"));
        let second = gate.begin(&job("job-1"));

        assert!(!gate.is_current(&first));
        assert!(gate.is_current(&second));
        assert_eq!(gate.complete(first, "stale"), None);
        assert_eq!(gate.complete(second, "fresh"), Some("fresh"));
    }

    #[test]
    fn jobs_are_tracked_independently() {
        let gate = MatchRequestGate::new();
        let a = gate.begin(&job("job-a"));
        let b = gate.begin(&job("job-b"));

        assert_eq!(gate.complete(a, 1), Some(1));
        assert_eq!(gate.complete(b, 2), Some(2));
    }

    #[test]
    fn abandoned_ticket_frees_its_entry_but_not_a_newer_one() {
        let gate = MatchRequestGate::new();
        let failed = gate.begin(&job("job-1"));
        gate.abandon(failed);
        assert_eq!(gate.in_flight(), 0);

        let older = gate.begin(&job("job-2"));
        let newer = gate.begin(&job("job-2"));
        gate.abandon(older);
        assert!(gate.is_current(&newer));
        assert_eq!(gate.in_flight(), 1);
        assert_eq!(gate.complete(newer, "fresh"), Some("fresh"));
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn completed_ticket_cannot_be_replayed() {
        let gate = MatchRequestGate::new();
        let ticket = gate.begin(&job("job-1"));
        assert_eq!(gate.complete(ticket.clone(), ()), Some(()));
        assert_eq!(gate.complete(ticket, ()), None);
    }
}
