// Typed views over normalized records

use serde::{Deserialize, Serialize};

use crate::data::{RawRecord, Source};

use super::{NormalizedRecord, normalize};

/// Construct a typed row from a normalized record of the given source
pub trait FromNormalized {
    fn from_normalized(source: Source, record: &NormalizedRecord) -> Self;
}

/// Normalize and convert every raw row of a source
pub fn typed_rows<T: FromNormalized>(source: Source, raw: &[RawRecord]) -> Vec<T> {
    raw.iter()
        .map(|r| T::from_normalized(source, &normalize(source, r)))
        .collect()
}

/// One race of a season calendar
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Race {
    pub year: i32,
    pub round: u32,
    pub circuit_id: String,
    pub race_name: String,
    /// Circuit length in km, 0 when unknown
    pub course_length_km: f64,
    pub laps: u32,
    /// Race distance in km, 0 when unknown
    pub distance_km: f64,
    pub turns: u32,
}

impl FromNormalized for Race {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            year: season_year(record),
            round: non_negative(record.int("round")),
            circuit_id: record.text("circuitId").to_string(),
            race_name: record.text("raceName").to_string(),
            course_length_km: record.float("courseLength"),
            laps: non_negative(record.int("laps")),
            distance_km: record.float("distance"),
            turns: non_negative(record.int("turns")),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Circuit {
    pub circuit_id: String,
    pub name: String,
    pub full_name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

impl FromNormalized for Circuit {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            circuit_id: record.text("circuitId").to_string(),
            name: record.text("name").to_string(),
            full_name: record.text("fullName").to_string(),
            country: record.text("country").to_string(),
            lat: record.float("lat"),
            lng: record.float("lng"),
        }
    }
}

/// A driver's classification in one race
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RaceResult {
    pub year: i32,
    pub round: u32,
    pub driver_id: String,
    pub constructor_id: String,
    /// Finishing position, 0 when not classified
    pub position_number: u32,
    pub position_display_order: u32,
    pub points: f64,
    pub pole_position: bool,
    pub driver_name: String,
    pub constructor_name: String,
}

impl FromNormalized for RaceResult {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            year: season_year(record),
            round: non_negative(record.int("round")),
            driver_id: record.text("driverId").to_string(),
            constructor_id: record.text("constructorId").to_string(),
            position_number: non_negative(record.int("positionNumber")),
            position_display_order: non_negative(record.int("positionDisplayOrder")),
            points: record.float("points"),
            pole_position: record.flag("polePosition"),
            driver_name: record.text("driverName").to_string(),
            constructor_name: record.text("constructorName").to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct QualifyingResult {
    pub year: i32,
    pub round: u32,
    pub driver_id: String,
    pub constructor_id: String,
    pub position_number: u32,
}

impl FromNormalized for QualifyingResult {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            year: season_year(record),
            round: non_negative(record.int("round")),
            driver_id: record.text("driverId").to_string(),
            constructor_id: record.text("constructorId").to_string(),
            position_number: non_negative(record.int("positionNumber")),
        }
    }
}

/// A season standings row, for either a driver or a constructor.
///
/// `entity_id` holds the `driverId` for driver standings and the
/// `constructorId` for constructor standings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Standing {
    pub year: i32,
    pub entity_id: String,
    pub position_number: u32,
    pub position_display_order: u32,
    pub points: f64,
}

impl FromNormalized for Standing {
    fn from_normalized(source: Source, record: &NormalizedRecord) -> Self {
        let key_field = match source {
            Source::ConstructorStandings => "constructorId",
            _ => "driverId",
        };
        Self {
            year: season_year(record),
            entity_id: record.text(key_field).to_string(),
            position_number: non_negative(record.int("positionNumber")),
            position_display_order: non_negative(record.int("positionDisplayOrder")),
            points: record.float("points"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FastestLap {
    pub year: i32,
    pub round: u32,
    pub driver_id: String,
    /// Lap time as written in the source, e.g. `1:21.046`
    pub time: String,
}

impl FromNormalized for FastestLap {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            year: season_year(record),
            round: non_negative(record.int("round")),
            driver_id: record.text("driverId").to_string(),
            time: record.text("time").to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConstructorSummary {
    pub constructor_id: String,
    pub name: String,
    pub total_race_wins: u32,
    pub total_championship_wins: u32,
    pub total_points: f64,
}

impl FromNormalized for ConstructorSummary {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            constructor_id: record.text("constructorId").to_string(),
            name: record.text("name").to_string(),
            total_race_wins: non_negative(record.int("totalRaceWins")),
            total_championship_wins: non_negative(record.int("totalChampionshipWins")),
            total_points: record.float("totalPoints"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverSummary {
    pub driver_id: String,
    pub full_name: String,
    pub total_championship_wins: u32,
}

impl FromNormalized for DriverSummary {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            driver_id: record.text("driverId").to_string(),
            full_name: record.text("fullName").to_string(),
            total_championship_wins: non_negative(record.int("totalChampionshipWins")),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TyreManufacturer {
    pub tyre_manufacturer_id: String,
    pub name: String,
    pub total_race_wins: u32,
    pub total_pole_positions: u32,
    pub total_fastest_laps: u32,
}

impl FromNormalized for TyreManufacturer {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            tyre_manufacturer_id: record.text("tyreManufacturerId").to_string(),
            name: record.text("name").to_string(),
            total_race_wins: non_negative(record.int("totalRaceWins")),
            total_pole_positions: non_negative(record.int("totalPolePositions")),
            total_fastest_laps: non_negative(record.int("totalFastestLaps")),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineManufacturer {
    pub name: String,
    pub race_wins: u32,
    pub capacity_score: f64,
    pub config_score: f64,
    pub aspiration_score: f64,
    pub sustainability_score: f64,
}

impl FromNormalized for EngineManufacturer {
    fn from_normalized(_source: Source, record: &NormalizedRecord) -> Self {
        Self {
            name: record.text("name").to_string(),
            race_wins: non_negative(record.int("totalRaceWins")),
            capacity_score: record.float("capacityScore"),
            config_score: record.float("configScore"),
            aspiration_score: record.float("aspirationScore"),
            sustainability_score: record.float("sustainabilityScore"),
        }
    }
}

fn non_negative(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Season year of a record, 0 when it does not fit an `i32`
fn season_year(record: &NormalizedRecord) -> i32 {
    i32::try_from(record.int("year")).unwrap_or(0)
}
