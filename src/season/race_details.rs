// Per-race views: podium, classification, constructor scores and fastest lap

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::aggregate::{ConstructorRaceScore, constructor_points_for_race};
use crate::errors::StatsError;
use crate::normalize::{FastestLap, RaceResult};

/// Placeholder name of an empty podium step
pub const EMPTY_PODIUM_NAME: &str = "N/A";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PodiumEntry {
    /// 1 to 3, 0 for a padding entry
    pub position: u32,
    pub display_name: String,
    pub constructor_id: String,
    pub points: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverRaceStanding {
    pub position_display_order: u32,
    pub driver_id: String,
    pub display_name: String,
    pub constructor_id: String,
    pub constructor_name: String,
    pub points: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FastestLapView {
    pub driver_id: String,
    pub display_name: String,
    /// Lap time as written in the source
    pub time: String,
    pub seconds: f64,
}

/// The three podium finishers of a race, padded with `N/A` steps.
///
/// Unclassified results (position 0) never reach the podium.
pub fn podium(results: &[RaceResult], year: i32, round: u32) -> Result<Vec<PodiumEntry>, StatsError> {
    let race = race_rows(results, year, round)?;
    let mut entries: Vec<PodiumEntry> = race
        .into_iter()
        .filter(|r| r.position_number > 0)
        .sorted_by_key(|r| (r.position_number, r.position_display_order))
        .take(3)
        .map(|r| PodiumEntry {
            position: r.position_number,
            display_name: driver_display_name(r),
            constructor_id: r.constructor_id.clone(),
            points: r.points,
        })
        .collect();
    while entries.len() < 3 {
        entries.push(PodiumEntry {
            position: 0,
            display_name: EMPTY_PODIUM_NAME.to_string(),
            constructor_id: String::new(),
            points: 0.,
        });
    }
    Ok(entries)
}

/// Every driver of a race in classification order
pub fn driver_race_standings(
    results: &[RaceResult],
    year: i32,
    round: u32,
) -> Result<Vec<DriverRaceStanding>, StatsError> {
    let race = race_rows(results, year, round)?;
    Ok(race
        .into_iter()
        .sorted_by_key(|r| display_order_key(r.position_display_order))
        .map(|r| DriverRaceStanding {
            position_display_order: r.position_display_order,
            driver_id: r.driver_id.clone(),
            display_name: driver_display_name(r),
            constructor_id: r.constructor_id.clone(),
            constructor_name: if r.constructor_name.is_empty() {
                r.constructor_id.clone()
            } else {
                r.constructor_name.clone()
            },
            points: r.points,
        })
        .collect())
}

/// Points per constructor for a race, highest first
pub fn constructor_race_scores(
    results: &[RaceResult],
    year: i32,
    round: u32,
) -> Result<Vec<ConstructorRaceScore>, StatsError> {
    let scores = constructor_points_for_race(results, year, round);
    if scores.is_empty() {
        return Err(no_results(year, round));
    }
    Ok(scores
        .into_values()
        .sorted_by(|a, b| {
            b.total_points
                .total_cmp(&a.total_points)
                .then_with(|| a.constructor_id.cmp(&b.constructor_id))
        })
        .collect())
}

/// The fastest lap of a race, from the first matching row
pub fn fastest_lap(laps: &[FastestLap], year: i32, round: u32) -> Result<FastestLapView, StatsError> {
    let lap = laps
        .iter()
        .find(|l| l.year == year && l.round == round)
        .ok_or_else(|| StatsError::NoMatchingRecords {
            what: format!("fastest lap for {} round {}", year, round),
        })?;
    Ok(FastestLapView {
        driver_id: lap.driver_id.clone(),
        display_name: if lap.driver_id.is_empty() {
            "Unknown Driver".to_string()
        } else {
            title_case(&lap.driver_id)
        },
        time: lap.time.clone(),
        seconds: lap_time_seconds(&lap.time),
    })
}

/// Seconds of a lap time written as `m:ss.sss` or plain seconds, 0 when unparseable
pub fn lap_time_seconds(time: &str) -> f64 {
    let time = time.trim();
    let parsed = match time.split(':').collect::<Vec<&str>>().as_slice() {
        [minutes, seconds] => minutes
            .parse::<f64>()
            .ok()
            .zip(seconds.parse::<f64>().ok())
            .filter(|(m, s)| *m >= 0. && (0.0..60.0).contains(s))
            .map(|(m, s)| m * 60. + s),
        _ => time.parse::<f64>().ok(),
    };
    parsed.filter(|s| s.is_finite() && *s >= 0.).unwrap_or(0.)
}

/// `m:ss.sss`
pub fn format_lap_time(total_seconds: f64) -> String {
    let minutes = (total_seconds / 60.).floor();
    let seconds = total_seconds - minutes * 60.;
    format!("{}:{:06.3}", minutes as u64, seconds)
}

/// `lewis-hamilton` to `Lewis Hamilton`
pub fn title_case(key: &str) -> String {
    key.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

fn race_rows(results: &[RaceResult], year: i32, round: u32) -> Result<Vec<&RaceResult>, StatsError> {
    let rows: Vec<&RaceResult> = results
        .iter()
        .filter(|r| r.year == year && r.round == round)
        .collect();
    if rows.is_empty() {
        return Err(no_results(year, round));
    }
    Ok(rows)
}

fn no_results(year: i32, round: u32) -> StatsError {
    StatsError::NoMatchingRecords {
        what: format!("race results for {} round {}", year, round),
    }
}

fn driver_display_name(result: &RaceResult) -> String {
    if !result.driver_name.is_empty() {
        result.driver_name.clone()
    } else if !result.driver_id.is_empty() {
        title_case(&result.driver_id)
    } else {
        "Unknown".to_string()
    }
}

// rows without a display order sort last
fn display_order_key(order: u32) -> u32 {
    if order == 0 { u32::MAX } else { order }
}
