// Error types for f1stats

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum StatsError {
    // Errors while reading source tables
    #[snafu(display("Data source {source_name} is unavailable: {reason}"))]
    DataUnavailable { source_name: String, reason: String },
    #[snafu(display("Error reading CSV file {path}"))]
    CsvReadError { path: String, source: csv::Error },
    #[snafu(display("Error reading data file {path}"))]
    DataFileError { path: String, source: io::Error },
    #[snafu(display("Error parsing region geometry: {reason}"))]
    GeometryParseError { reason: String },

    // Joins and filters that produced nothing
    #[snafu(display("No matching records: {what}"))]
    NoMatchingRecords { what: String },

    // Selection errors
    #[snafu(display("Maximum of {max} selected entries allowed"))]
    SelectionLimitExceeded { max: usize },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // CLI errors
    #[snafu(display("Could not start async runtime"))]
    RuntimeError { source: io::Error },

    // Output errors
    #[snafu(display("Error writing output file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing output"))]
    OutputSerializeError { source: serde_json::Error },
}

impl StatsError {
    /// Collapse any loader failure into the `DataUnavailable` condition reported to sections.
    pub fn into_unavailable(self, source_name: &str) -> StatsError {
        match self {
            StatsError::DataUnavailable { .. } => self,
            other => StatsError::DataUnavailable {
                source_name: source_name.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
