use chrono::NaiveDate;
use yardline::workflows::jobs::{
    find_best_matches, Commitment, GeoPoint, JobDescriptor, JobId, UrgencyTier,
};
use yardline::workflows::roster::RosterImporter;

const ROSTER: &str = "\
ID,Name,Latitude,Longitude,Services,Rating,Avg Response Minutes,Accepting Work,Tier
ls-1,Ingersoll Grounds,41.5870,-93.6600,lawn_mowing;leaf_removal,4.6,35,yes,Gold
ls-2,Beaverdale Lawn,41.6150,-93.6900,lawn_mowing,4.9,20,yes,Silver
ls-3,East Village Yard,41.5880,-93.6100,lawn_mowing,3.8,180,yes,Bronze
ls-4,Snow Pros,41.5868,-93.6250,snow_removal,5.0,5,yes,Gold
ls-5,Weekend Crew,41.5868,-93.6250,lawn_mowing,5.0,5,no,
";

fn job(urgency: UrgencyTier) -> JobDescriptor {
    JobDescriptor {
        job_id: JobId("job-roster".to_string()),
        location: Some(GeoPoint {
            lat: 41.5868,
            lng: -93.6250,
        }),
        service_type: "lawn_mowing".to_string(),
        urgency,
    }
}

#[test]
fn imported_roster_ranks_with_reasons() {
    let roster = RosterImporter::from_reader(ROSTER.as_bytes()).expect("roster imports");
    assert_eq!(roster.len(), 5);

    let matches = find_best_matches(&job(UrgencyTier::Standard), &roster, 10, None, None);

    assert_eq!(matches.len(), 4, "snow-only crew is filtered out");
    assert!(matches
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
    assert!(matches.iter().all(|found| found.score <= 100));

    let weekend = matches
        .iter()
        .find(|found| found.landscaper_id.0 == "ls-5")
        .expect("paused crew still ranked");
    assert!(!weekend.available);
    assert!(!weekend.reasons.contains(&"available".to_string()));

    let ingersoll = matches
        .iter()
        .find(|found| found.landscaper_id.0 == "ls-1")
        .expect("ingersoll ranked");
    assert!(ingersoll.reasons.contains(&"Gold tier".to_string()));
    assert!(ingersoll.reasons.iter().any(|reason| reason.ends_with("miles away")));
}

#[test]
fn proposed_window_marks_conflicting_commitments() {
    let mut roster = RosterImporter::from_reader(ROSTER.as_bytes()).expect("roster imports");
    let start = NaiveDate::from_ymd_opt(2025, 7, 2)
        .and_then(|date| date.and_hms_opt(13, 0, 0))
        .expect("valid start");
    roster[1].commitments.push(Commitment {
        job_id: JobId("job-earlier".to_string()),
        starts_at: start - chrono::Duration::minutes(30),
        duration_hours: 1.0,
    });

    let matches = find_best_matches(
        &job(UrgencyTier::Standard),
        &roster,
        10,
        Some(start),
        Some(2.0),
    );

    let beaverdale = matches
        .iter()
        .find(|found| found.landscaper_id.0 == "ls-2")
        .expect("beaverdale ranked");
    assert!(beaverdale.has_schedule_conflict);
    assert!(matches
        .iter()
        .filter(|found| found.landscaper_id.0 != "ls-2")
        .all(|found| !found.has_schedule_conflict));
}

#[test]
fn urgency_penalizes_slow_responders() {
    let roster = RosterImporter::from_reader(ROSTER.as_bytes()).expect("roster imports");
    let pool: Vec<_> = roster
        .into_iter()
        .filter(|crew| crew.id.0 == "ls-1" || crew.id.0 == "ls-3")
        .collect();

    let standard = find_best_matches(&job(UrgencyTier::Standard), &pool, 2, None, None);
    let emergency = find_best_matches(&job(UrgencyTier::Emergency), &pool, 2, None, None);

    assert_eq!(standard[0].landscaper_id.0, "ls-1");
    assert_eq!(emergency[0].landscaper_id.0, "ls-1");
    assert!(emergency[1].score < standard[1].score);
}
