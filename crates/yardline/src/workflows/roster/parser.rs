use crate::workflows::jobs::{GeoPoint, LandscaperCandidate, LandscaperId, LandscaperTier};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

pub(crate) fn parse_roster<R: Read>(reader: R) -> Result<Vec<LandscaperCandidate>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut candidates = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = record?;
        match row.into_candidate() {
            Some(candidate) => candidates.push(candidate),
            None => warn!(row = index + 1, "skipping roster row without id or coordinates"),
        }
    }

    Ok(candidates)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Latitude", default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(rename = "Longitude", default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(rename = "Services", default, deserialize_with = "empty_string_as_none")]
    services: Option<String>,
    #[serde(rename = "Rating", default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
    #[serde(
        rename = "Avg Response Minutes",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    avg_response_minutes: Option<String>,
    #[serde(
        rename = "Accepting Work",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    accepting_work: Option<String>,
    #[serde(rename = "Tier", default, deserialize_with = "empty_string_as_none")]
    tier: Option<String>,
}

impl RosterRow {
    fn into_candidate(self) -> Option<LandscaperCandidate> {
        let id = self.id?;
        let service_area = GeoPoint {
            lat: self.latitude.as_deref()?.parse().ok()?,
            lng: self.longitude.as_deref()?.parse().ok()?,
        };

        let services = self
            .services
            .as_deref()
            .map(split_services)
            .unwrap_or_default();
        let name = if self.name.is_empty() {
            id.clone()
        } else {
            self.name
        };

        Some(LandscaperCandidate {
            id: LandscaperId(id),
            name,
            service_area,
            services,
            rating: self.rating.as_deref().and_then(|raw| raw.parse().ok()),
            avg_response_minutes: self
                .avg_response_minutes
                .as_deref()
                .and_then(|raw| raw.parse().ok()),
            accepting_work: self
                .accepting_work
                .as_deref()
                .map(parse_flag)
                .unwrap_or(true),
            tier: self.tier.as_deref().and_then(LandscaperTier::parse),
            commitments: Vec::new(),
        })
    }
}

fn split_services(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|service| !service.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "no" | "n" | "0"
    )
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_service_lists() {
        assert_eq!(
            split_services(" lawn_mowing ; ;hedge_trimming"),
            vec!["lawn_mowing".to_string(), "hedge_trimming".to_string()]
        );
    }

    #[test]
    fn accepting_work_defaults_to_true_for_unknown_values() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag("maybe"));
        assert!(!parse_flag("No"));
        assert!(!parse_flag("0"));
    }
}
