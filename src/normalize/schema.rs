// Per-source field schemas used by the normalizer

use crate::data::Source;

use super::Value;

/// How a raw text field is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number, fallback 0
    Int,
    /// Decimal number, fallback 0.0
    Float,
    /// Literal `true`/`false`, fallback false
    Bool,
    /// Join key: trimmed and lower-cased, fallback empty
    Key,
    /// Trimmed text, fallback empty
    Text,
}

impl FieldKind {
    pub fn fallback(&self) -> Value {
        match self {
            FieldKind::Int => Value::Int(0),
            FieldKind::Float => Value::Float(0.),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Key | FieldKind::Text => Value::Text(String::new()),
        }
    }
}

/// One schema entry.
///
/// `candidates` are the raw column names tried in order; the first one that
/// yields a value other than the fallback wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, candidates: &'static [&'static str], kind: FieldKind) -> Self {
        Self {
            name,
            candidates,
            kind,
        }
    }
}

const RACES: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("round", &["round"], FieldKind::Int),
    FieldSpec::new("circuitId", &["circuitId"], FieldKind::Key),
    FieldSpec::new("raceName", &["raceName", "officialName"], FieldKind::Text),
    FieldSpec::new("courseLength", &["courseLength"], FieldKind::Float),
    FieldSpec::new("laps", &["laps"], FieldKind::Int),
    FieldSpec::new("distance", &["distance"], FieldKind::Float),
    FieldSpec::new("turns", &["turns"], FieldKind::Int),
];

const CIRCUITS: &[FieldSpec] = &[
    FieldSpec::new("circuitId", &["circuitId", "id"], FieldKind::Key),
    FieldSpec::new("name", &["name", "circuitName"], FieldKind::Text),
    FieldSpec::new("fullName", &["fullName"], FieldKind::Text),
    FieldSpec::new("country", &["country", "countryId"], FieldKind::Text),
    FieldSpec::new("lat", &["lat", "latitude"], FieldKind::Float),
    FieldSpec::new("lng", &["lng", "longitude"], FieldKind::Float),
];

const RACE_RESULTS: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("round", &["round"], FieldKind::Int),
    FieldSpec::new("driverId", &["driverId"], FieldKind::Key),
    FieldSpec::new("constructorId", &["constructorId"], FieldKind::Key),
    FieldSpec::new("positionNumber", &["positionNumber", "position"], FieldKind::Int),
    FieldSpec::new("positionDisplayOrder", &["positionDisplayOrder"], FieldKind::Int),
    FieldSpec::new("points", &["points"], FieldKind::Float),
    FieldSpec::new("polePosition", &["polePosition"], FieldKind::Bool),
    FieldSpec::new("driverName", &["driverName"], FieldKind::Text),
    FieldSpec::new("constructorName", &["constructorName"], FieldKind::Text),
];

const QUALIFYING_RESULTS: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("round", &["round"], FieldKind::Int),
    FieldSpec::new("driverId", &["driverId"], FieldKind::Key),
    FieldSpec::new("constructorId", &["constructorId"], FieldKind::Key),
    FieldSpec::new("positionNumber", &["positionNumber", "position"], FieldKind::Int),
];

const DRIVER_STANDINGS: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("driverId", &["driverId"], FieldKind::Key),
    FieldSpec::new("positionNumber", &["positionNumber"], FieldKind::Int),
    FieldSpec::new("positionDisplayOrder", &["positionDisplayOrder"], FieldKind::Int),
    FieldSpec::new("points", &["points"], FieldKind::Float),
];

const CONSTRUCTOR_STANDINGS: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("constructorId", &["constructorId"], FieldKind::Key),
    FieldSpec::new("positionNumber", &["positionNumber"], FieldKind::Int),
    FieldSpec::new("positionDisplayOrder", &["positionDisplayOrder"], FieldKind::Int),
    FieldSpec::new("points", &["points"], FieldKind::Float),
];

const CONSTRUCTORS: &[FieldSpec] = &[
    FieldSpec::new("constructorId", &["constructorId", "id"], FieldKind::Key),
    FieldSpec::new("name", &["name"], FieldKind::Text),
    FieldSpec::new("totalRaceWins", &["totalRaceWins"], FieldKind::Int),
    FieldSpec::new("totalChampionshipWins", &["totalChampionshipWins"], FieldKind::Int),
    FieldSpec::new("totalPoints", &["totalPoints"], FieldKind::Float),
];

const DRIVERS: &[FieldSpec] = &[
    FieldSpec::new("driverId", &["driverId", "id"], FieldKind::Key),
    FieldSpec::new("fullName", &["fullName", "name"], FieldKind::Text),
    FieldSpec::new("totalChampionshipWins", &["totalChampionshipWins"], FieldKind::Int),
];

const TYRE_MANUFACTURERS: &[FieldSpec] = &[
    FieldSpec::new("tyreManufacturerId", &["tyreManufacturerId", "id"], FieldKind::Key),
    FieldSpec::new("name", &["name"], FieldKind::Text),
    FieldSpec::new("totalRaceWins", &["totalRaceWins"], FieldKind::Int),
    FieldSpec::new("totalPolePositions", &["totalPolePositions"], FieldKind::Int),
    FieldSpec::new("totalFastestLaps", &["totalFastestLaps"], FieldKind::Int),
];

const ENGINE_MANUFACTURERS: &[FieldSpec] = &[
    FieldSpec::new("name", &["name"], FieldKind::Text),
    FieldSpec::new("totalRaceWins", &["totalRaceWins"], FieldKind::Int),
    FieldSpec::new("capacityScore", &["capacity_score"], FieldKind::Float),
    FieldSpec::new("configScore", &["config_score"], FieldKind::Float),
    FieldSpec::new("aspirationScore", &["aspiration_score"], FieldKind::Float),
    FieldSpec::new(
        "sustainabilityScore",
        &["final_sustainability_score"],
        FieldKind::Float,
    ),
];

const FASTEST_LAPS: &[FieldSpec] = &[
    FieldSpec::new("year", &["year"], FieldKind::Int),
    FieldSpec::new("round", &["round"], FieldKind::Int),
    FieldSpec::new("driverId", &["driverId"], FieldKind::Key),
    FieldSpec::new("time", &["time"], FieldKind::Text),
];

/// The fixed schema of a source
pub fn schema_for(source: Source) -> &'static [FieldSpec] {
    match source {
        Source::Races => RACES,
        Source::Circuits => CIRCUITS,
        Source::RaceResults => RACE_RESULTS,
        Source::QualifyingResults => QUALIFYING_RESULTS,
        Source::DriverStandings => DRIVER_STANDINGS,
        Source::ConstructorStandings => CONSTRUCTOR_STANDINGS,
        Source::Constructors => CONSTRUCTORS,
        Source::Drivers => DRIVERS,
        Source::TyreManufacturers => TYRE_MANUFACTURERS,
        Source::EngineManufacturers => ENGINE_MANUFACTURERS,
        Source::FastestLaps => FASTEST_LAPS,
    }
}
