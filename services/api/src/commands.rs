use crate::infra::{parse_actor, parse_start, parse_status, parse_urgency};
use chrono::NaiveDateTime;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use yardline::config::AppConfig;
use yardline::error::AppError;
use yardline::workflows::jobs::{
    allowed_transitions, role_label, Actor, GeoPoint, JobDescriptor, JobId, JobStatus,
    LandscaperMatch, MatchingEngine, ProposedSchedule, UrgencyTier,
};
use yardline::workflows::roster::RosterImporter;

#[derive(Args, Debug, Default)]
pub(crate) struct TransitionsArgs {
    /// Only show edges leaving this status
    #[arg(long, value_parser = parse_status)]
    pub(crate) from: Option<JobStatus>,
    /// Only show edges this actor may take
    #[arg(long, value_parser = parse_actor)]
    pub(crate) actor: Option<Actor>,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Roster CSV export (ID, Name, Latitude, Longitude, Services, ...)
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Job site latitude
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat: f64,
    /// Job site longitude
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lng: f64,
    /// Requested service type, e.g. lawn_mowing
    #[arg(long)]
    pub(crate) service: String,
    /// standard, priority, or emergency
    #[arg(long, value_parser = parse_urgency, default_value = "standard")]
    pub(crate) urgency: UrgencyTier,
    /// Number of candidates to print (defaults to MATCH_DEFAULT_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Proposed start (YYYY-MM-DD or YYYY-MM-DDTHH:MM) used for conflict checks
    #[arg(long, value_parser = parse_start)]
    pub(crate) proposed_date: Option<NaiveDateTime>,
    /// Length of the proposed window in hours
    #[arg(long)]
    pub(crate) duration_hours: Option<f32>,
}

pub(crate) fn run_transitions(args: TransitionsArgs) {
    print!("{}", render_transitions(args.from, args.actor));
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let candidates = RosterImporter::from_path(&args.roster)?;
    let engine = MatchingEngine::new(config.workflow.matching);

    let job = JobDescriptor {
        job_id: JobId("cli-request".to_string()),
        location: Some(GeoPoint {
            lat: args.lat,
            lng: args.lng,
        }),
        service_type: args.service,
        urgency: args.urgency,
    };
    let limit = args.limit.unwrap_or(engine.config().default_limit);
    let matches = engine.find_best_matches(
        &job,
        &candidates,
        limit,
        ProposedSchedule {
            starts_at: args.proposed_date,
            duration_hours: args.duration_hours,
        },
    );

    println!(
        "Ranked {} of {} roster entries for '{}'",
        matches.len(),
        candidates.len(),
        job.service_type
    );
    print!("{}", render_matches(&matches));
    Ok(())
}

pub(crate) fn render_transitions(from: Option<JobStatus>, actor: Option<Actor>) -> String {
    let statuses = match from {
        Some(status) => vec![status],
        None => JobStatus::ordered().to_vec(),
    };

    let mut out = String::new();
    for status in statuses {
        let _ = writeln!(out, "{} ({})", status, role_label(status, Actor::Admin));
        let edges: Vec<_> = allowed_transitions(status)
            .iter()
            .filter(|edge| actor.map_or(true, |actor| edge.actor == actor))
            .collect();
        if edges.is_empty() {
            let _ = writeln!(out, "  (no transitions)");
        }
        for edge in edges {
            let _ = writeln!(out, "  -> {} [{}]", edge.to, edge.actor);
        }
    }
    out
}

pub(crate) fn render_matches(matches: &[LandscaperMatch]) -> String {
    if matches.is_empty() {
        return "No eligible landscapers found\n".to_string();
    }

    let mut out = String::new();
    for (rank, found) in matches.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({}) score {} | {:.1} mi | {}",
            rank + 1,
            found.name,
            found.landscaper_id,
            found.score,
            found.distance_miles,
            found.reasons.join(", ")
        );
    }
    out
}
