use yardline::workflows::jobs::{LandscaperId, LandscaperTier};
use yardline::workflows::roster::{RosterImportError, RosterImporter};

const HEADER: &str =
    "ID,Name,Latitude,Longitude,Services,Rating,Avg Response Minutes,Accepting Work,Tier\n";

#[test]
fn importer_reads_complete_rows() {
    let csv = format!(
        "{HEADER}\
ls-100,Prairie Lawn Co, 41.60 ,-93.61,lawn_mowing; hedge_trimming,4.8,25,yes,Gold\n"
    );

    let roster = RosterImporter::from_reader(csv.as_bytes()).expect("import succeeds");

    assert_eq!(roster.len(), 1);
    let crew = &roster[0];
    assert_eq!(crew.id, LandscaperId("ls-100".to_string()));
    assert_eq!(crew.name, "Prairie Lawn Co");
    assert_eq!(crew.service_area.lat, 41.60);
    assert_eq!(crew.services, vec!["lawn_mowing", "hedge_trimming"]);
    assert_eq!(crew.rating, Some(4.8));
    assert_eq!(crew.avg_response_minutes, Some(25));
    assert!(crew.accepting_work);
    assert_eq!(crew.tier, Some(LandscaperTier::Gold));
    assert!(crew.commitments.is_empty());
}

#[test]
fn blank_optional_cells_become_none() {
    let csv = format!("{HEADER}ls-200,,41.58,-93.62,,,,,\n");

    let roster = RosterImporter::from_reader(csv.as_bytes()).expect("import succeeds");

    let crew = &roster[0];
    assert_eq!(crew.name, "ls-200");
    assert!(crew.services.is_empty());
    assert!(crew.rating.is_none());
    assert!(crew.avg_response_minutes.is_none());
    assert!(crew.accepting_work);
    assert!(crew.tier.is_none());
}

#[test]
fn rows_without_id_or_coordinates_are_skipped() {
    let csv = format!(
        "{HEADER}\
,No Id Lawn,41.58,-93.62,lawn_mowing,4.0,30,yes,Silver\n\
ls-301,No Coordinates,,-93.62,lawn_mowing,4.0,30,yes,Silver\n\
ls-302,Bad Latitude,north,-93.62,lawn_mowing,4.0,30,yes,Silver\n\
ls-303,Paused Crew,41.59,-93.63,lawn_mowing,3.9,90,no,Bronze\n"
    );

    let roster = RosterImporter::from_reader(csv.as_bytes()).expect("import succeeds");

    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id.0, "ls-303");
    assert!(!roster[0].accepting_work);
}

#[test]
fn ragged_rows_are_reported_as_csv_errors() {
    let csv = format!("{HEADER}ls-400,Short Row,41.5\n");

    match RosterImporter::from_reader(csv.as_bytes()) {
        Err(RosterImportError::Csv(_)) => {}
        other => panic!("expected csv error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_reported_as_io_error() {
    match RosterImporter::from_path("/nonexistent/yardline-roster.csv") {
        Err(RosterImportError::Io(_)) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}
