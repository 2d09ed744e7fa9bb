use serde::{Deserialize, Serialize};

use super::domain::{GeoPoint, JobRecord, JobStatus};

/// Validation errors raised before a job may enter completion review.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionViolation {
    #[error("completion requires at least {required} before photo(s), found {found}")]
    MissingBeforePhotos { required: usize, found: usize },
    #[error("completion requires at least {required} after photo(s), found {found}")]
    MissingAfterPhotos { required: usize, found: usize },
    #[error("photo '{storage_key}' was taken {distance_meters:.0}m from the job site (limit {limit_meters:.0}m)")]
    OutsideGeofence {
        storage_key: String,
        distance_meters: f64,
        limit_meters: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    Before,
    After,
}

/// Metadata for an uploaded verification photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEvidence {
    pub kind: PhotoKind,
    pub storage_key: String,
    #[serde(default)]
    pub taken_at: Option<GeoPoint>,
}

/// Photos submitted alongside a completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvidence {
    #[serde(default)]
    pub photos: Vec<PhotoEvidence>,
}

impl CompletionEvidence {
    fn count(&self, kind: PhotoKind) -> usize {
        self.photos.iter().filter(|photo| photo.kind == kind).count()
    }
}

const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 150.0;

/// Policy dials for photo verification and on-site detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPolicy {
    pub min_before_photos: usize,
    pub min_after_photos: usize,
    geofence_radius_meters: f64,
}

impl CompletionPolicy {
    pub fn new(min_before_photos: usize, min_after_photos: usize, radius_meters: f64) -> Self {
        let sanitized = if radius_meters.is_finite() && radius_meters > 0.0 {
            radius_meters
        } else {
            DEFAULT_GEOFENCE_RADIUS_METERS
        };

        Self {
            min_before_photos,
            min_after_photos,
            geofence_radius_meters: sanitized,
        }
    }

    pub fn geofence_radius_meters(&self) -> f64 {
        self.geofence_radius_meters
    }

    pub fn within_geofence(&self, site: &GeoPoint, position: &GeoPoint) -> bool {
        site.distance_meters(position) <= self.geofence_radius_meters
    }
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self::new(1, 1, DEFAULT_GEOFENCE_RADIUS_METERS)
    }
}

/// Guard applied to transitions that claim the work is done.
#[derive(Debug, Clone, Default)]
pub struct CompletionGuard {
    policy: CompletionPolicy,
}

impl CompletionGuard {
    pub fn with_policy(policy: CompletionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CompletionPolicy {
        &self.policy
    }

    /// Whether moving into `target` needs photo evidence.
    pub fn requires_evidence(target: JobStatus) -> bool {
        matches!(
            target,
            JobStatus::CompletedPendingReview | JobStatus::PendingReview
        )
    }

    pub fn check(
        &self,
        job: &JobRecord,
        evidence: &CompletionEvidence,
    ) -> Result<(), CompletionViolation> {
        let before = evidence.count(PhotoKind::Before);
        if before < self.policy.min_before_photos {
            return Err(CompletionViolation::MissingBeforePhotos {
                required: self.policy.min_before_photos,
                found: before,
            });
        }

        let after = evidence.count(PhotoKind::After);
        if after < self.policy.min_after_photos {
            return Err(CompletionViolation::MissingAfterPhotos {
                required: self.policy.min_after_photos,
                found: after,
            });
        }

        let Some(site) = job.location.coordinates else {
            return Ok(());
        };

        for photo in &evidence.photos {
            if let Some(taken_at) = photo.taken_at {
                if !self.policy.within_geofence(&site, &taken_at) {
                    return Err(CompletionViolation::OutsideGeofence {
                        storage_key: photo.storage_key.clone(),
                        distance_meters: site.distance_meters(&taken_at),
                        limit_meters: self.policy.geofence_radius_meters,
                    });
                }
            }
        }

        Ok(())
    }

    /// Status the system actor should move the job to when the assigned
    /// landscaper reports `position`, if any.
    pub fn arrival_transition(&self, job: &JobRecord, position: &GeoPoint) -> Option<JobStatus> {
        if job.known_status() != Some(JobStatus::Assigned) {
            return None;
        }
        let site = job.location.coordinates?;
        self.policy
            .within_geofence(&site, position)
            .then_some(JobStatus::Active)
    }
}
