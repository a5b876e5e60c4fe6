// Season snapshot: one year's calendar joined with its circuits

pub mod race_details;

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;
use uom::si::length::{kilometer, mile};

use crate::normalize::{Circuit, Race};
use crate::regions::RegionIndex;

pub use race_details::{
    DriverRaceStanding, FastestLapView, PodiumEntry, constructor_race_scores,
    driver_race_standings, fastest_lap, format_lap_time, lap_time_seconds, podium, title_case,
};

/// A race of the selected season with its circuit attached
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SeasonRace {
    pub year: i32,
    pub round: u32,
    pub race_name: String,
    pub circuit_id: String,
    pub circuit_name: String,
    /// Country as written in the circuits table
    pub declared_country: String,
    pub lat: f64,
    pub lng: f64,
    /// Country after the polygon lookup, the declared country until resolved
    pub geo_country: String,
    pub course_length_km: f64,
    pub laps: u32,
    pub distance_km: f64,
    pub turns: u32,
}

impl SeasonRace {
    /// e.g. `5.412 km / 3.36 miles`, `N/A` when unknown
    pub fn course_length_label(&self) -> String {
        km_and_miles(self.course_length_km)
    }

    pub fn distance_label(&self) -> String {
        km_and_miles(self.distance_km)
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat != 0. && self.lng != 0.
    }
}

/// Races of `year` left-joined with circuits and sorted by round.
///
/// A race whose circuit is missing keeps zero coordinates and an empty country.
pub fn season_snapshot(races: &[Race], circuits: &[Circuit], year: i32) -> Vec<SeasonRace> {
    let by_id: HashMap<&str, &Circuit> = circuits
        .iter()
        .filter(|c| !c.circuit_id.is_empty())
        .map(|c| (c.circuit_id.as_str(), c))
        .collect();

    let mut snapshot: Vec<SeasonRace> = races
        .iter()
        .filter(|r| r.year == year)
        .map(|race| {
            let circuit = by_id.get(race.circuit_id.as_str()).copied();
            if circuit.is_none() {
                warn!(
                    "No circuit {:?} for {} round {}",
                    race.circuit_id, race.year, race.round
                );
            }
            join(race, circuit)
        })
        .collect();
    snapshot.sort_by_key(|r| r.round);

    debug!("Season {} has {} races", year, snapshot.len());
    snapshot
}

/// Replace each race's `geo_country` by the region containing its coordinates
pub fn resolve_countries(snapshot: &mut [SeasonRace], index: &RegionIndex) {
    for race in snapshot.iter_mut() {
        race.geo_country = index.resolve_country(race.lat, race.lng, &race.declared_country);
    }
}

fn join(race: &Race, circuit: Option<&Circuit>) -> SeasonRace {
    let (circuit_name, declared_country, lat, lng) = match circuit {
        Some(c) => (
            circuit_display_name(c, race),
            c.country.clone(),
            c.lat,
            c.lng,
        ),
        None => (fallback_name(race), String::new(), 0., 0.),
    };
    SeasonRace {
        year: race.year,
        round: race.round,
        race_name: race.race_name.clone(),
        circuit_id: race.circuit_id.clone(),
        circuit_name,
        geo_country: declared_country.clone(),
        declared_country,
        lat,
        lng,
        course_length_km: race.course_length_km,
        laps: race.laps,
        distance_km: race.distance_km,
        turns: race.turns,
    }
}

fn circuit_display_name(circuit: &Circuit, race: &Race) -> String {
    [circuit.name.as_str(), circuit.full_name.as_str()]
        .into_iter()
        .find(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_name(race))
}

fn fallback_name(race: &Race) -> String {
    if race.circuit_id.is_empty() {
        race.race_name.clone()
    } else {
        race.circuit_id.clone()
    }
}

fn km_and_miles(km: f64) -> String {
    if km <= 0. {
        return "N/A".to_string();
    }
    let length = Length::new::<kilometer>(km);
    format!("{} km / {:.2} miles", km, length.get::<mile>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{Feature, FeatureCollection, MatchPolicy};

    fn race(year: i32, round: u32, circuit_id: &str) -> Race {
        Race {
            year,
            round,
            circuit_id: circuit_id.to_string(),
            race_name: format!("Race {}", round),
            ..Default::default()
        }
    }

    fn circuit(id: &str, name: &str, country: &str, lat: f64, lng: f64) -> Circuit {
        Circuit {
            circuit_id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            lat,
            lng,
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_filters_joins_and_sorts() {
        let races = vec![race(2021, 3, "monza"), race(2021, 1, "bahrain"), race(2020, 1, "monza")];
        let circuits = vec![
            circuit("monza", "Monza", "Italy", 45.6, 9.28),
            circuit("bahrain", "", "Bahrain", 26.03, 50.51),
        ];

        let snapshot = season_snapshot(&races, &circuits, 2021);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].round, 1);
        assert_eq!(snapshot[0].circuit_name, "bahrain");
        assert_eq!(snapshot[1].circuit_name, "Monza");
        assert_eq!(snapshot[1].geo_country, "Italy");
    }

    #[test]
    fn test_unmatched_circuit_survives_the_join() {
        let snapshot = season_snapshot(&[race(1950, 1, "silverstone")], &[], 1950);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].circuit_name, "silverstone");
        assert!(!snapshot[0].has_coordinates());
        assert!(snapshot[0].declared_country.is_empty());
    }

    #[test]
    fn test_year_without_races_is_empty() {
        let snapshot = season_snapshot(&[race(2021, 1, "monza")], &[], 1900);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_resolve_countries_uses_polygons() {
        let mut snapshot = season_snapshot(
            &[race(2021, 1, "monza"), race(2021, 2, "nowhere")],
            &[
                circuit("monza", "Monza", "ITA", 45.6, 9.28),
                circuit("nowhere", "Nowhere", "Atlantis", 0., 0.),
            ],
            2021,
        );
        let index = RegionIndex::from_features(
            &FeatureCollection {
                features: vec![Feature::polygon(
                    "Italy",
                    &[(6., 36.), (19., 36.), (19., 47.), (6., 47.), (6., 36.)],
                )],
            },
            MatchPolicy::FirstMatch,
        );

        resolve_countries(&mut snapshot, &index);
        assert_eq!(snapshot[0].geo_country, "Italy");
        assert_eq!(snapshot[1].geo_country, "Atlantis");
    }

    #[test]
    fn test_distance_labels() {
        let season_race = SeasonRace {
            course_length_km: 5.793,
            ..Default::default()
        };
        assert_eq!(season_race.course_length_label(), "5.793 km / 3.60 miles");
        assert_eq!(season_race.distance_label(), "N/A");
    }
}
