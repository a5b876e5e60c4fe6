// Source tables and the loaders that read them

pub mod loader;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use loader::{
    CsvDirectoryLoader, MemoryLoader, TableLoader, load_async, load_regions_async, raw_record,
};

/// One CSV row as read from disk: column name to raw text.
pub type RawRecord = HashMap<String, String>;

/// File name of the region boundary collection inside the data directory.
pub const REGIONS_FILE_NAME: &str = "world-countries.geojson";

/// Every tabular source the dashboard reads.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Source {
    Races,
    Circuits,
    RaceResults,
    QualifyingResults,
    DriverStandings,
    ConstructorStandings,
    Constructors,
    Drivers,
    TyreManufacturers,
    EngineManufacturers,
    FastestLaps,
}

impl Source {
    pub const ALL: [Source; 11] = [
        Source::Races,
        Source::Circuits,
        Source::RaceResults,
        Source::QualifyingResults,
        Source::DriverStandings,
        Source::ConstructorStandings,
        Source::Constructors,
        Source::Drivers,
        Source::TyreManufacturers,
        Source::EngineManufacturers,
        Source::FastestLaps,
    ];

    /// File name of the source inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Source::Races => "f1db-races.csv",
            Source::Circuits => "f1db-circuits.csv",
            Source::RaceResults => "f1db-races-race-results.csv",
            Source::QualifyingResults => "f1db-races-qualifying-results.csv",
            Source::DriverStandings => "f1db-seasons-driver-standings.csv",
            Source::ConstructorStandings => "f1db-seasons-constructor-standings.csv",
            Source::Constructors => "f1db-constructors.csv",
            Source::Drivers => "f1db-drivers.csv",
            Source::TyreManufacturers => "f1db-tyre-manufacturers.csv",
            Source::EngineManufacturers => "Top_5_Engine_Manufacturers.csv",
            Source::FastestLaps => "f1db-races-fastest-laps.csv",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Races => write!(f, "races"),
            Source::Circuits => write!(f, "circuits"),
            Source::RaceResults => write!(f, "race results"),
            Source::QualifyingResults => write!(f, "qualifying results"),
            Source::DriverStandings => write!(f, "driver standings"),
            Source::ConstructorStandings => write!(f, "constructor standings"),
            Source::Constructors => write!(f, "constructors"),
            Source::Drivers => write!(f, "drivers"),
            Source::TyreManufacturers => write!(f, "tyre manufacturers"),
            Source::EngineManufacturers => write!(f, "engine manufacturers"),
            Source::FastestLaps => write!(f, "fastest laps"),
        }
    }
}
