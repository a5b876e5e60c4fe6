// Loaders for the raw source tables and region geometry

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::errors::StatsError;
use crate::regions::FeatureCollection;

use super::{REGIONS_FILE_NAME, RawRecord, Source};

/// Trait defining the interface for reading source tables.
///
/// Implementations hand back every row of a source as string-keyed records and
/// the region boundary collection used by the map. Loaders are shared between
/// concurrent loads, so they must be `Send + Sync`.
pub trait TableLoader: Send + Sync {
    /// Load every row of a tabular source
    fn load(&self, source: Source) -> Result<Vec<RawRecord>, StatsError>;

    /// Load the region boundary collection
    fn load_regions(&self) -> Result<FeatureCollection, StatsError>;
}

/// Load a source on the blocking pool so independent loads can be awaited jointly.
///
/// Any failure, including a panicking loader, is reported as `DataUnavailable`.
pub async fn load_async(
    loader: &Arc<dyn TableLoader>,
    source: Source,
) -> Result<Vec<RawRecord>, StatsError> {
    let loader = Arc::clone(loader);
    tokio::task::spawn_blocking(move || loader.load(source))
        .await
        .map_err(|e| StatsError::DataUnavailable {
            source_name: source.to_string(),
            reason: format!("load task failed: {}", e),
        })?
        .map_err(|e| e.into_unavailable(&source.to_string()))
}

/// Region geometry counterpart of [`load_async`]
pub async fn load_regions_async(
    loader: &Arc<dyn TableLoader>,
) -> Result<FeatureCollection, StatsError> {
    let loader = Arc::clone(loader);
    tokio::task::spawn_blocking(move || loader.load_regions())
        .await
        .map_err(|e| StatsError::DataUnavailable {
            source_name: REGIONS_FILE_NAME.to_string(),
            reason: format!("load task failed: {}", e),
        })?
        .map_err(|e| e.into_unavailable(REGIONS_FILE_NAME))
}

/// Reads the sources as CSV files (and the regions as GeoJSON) from one directory
pub struct CsvDirectoryLoader {
    data_dir: PathBuf,
}

impl CsvDirectoryLoader {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

impl TableLoader for CsvDirectoryLoader {
    fn load(&self, source: Source) -> Result<Vec<RawRecord>, StatsError> {
        let path = self.path_for(source.file_name());
        debug!("Loading {} from {:?}", source, path);

        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| StatsError::CsvReadError {
                path: format!("{:?}", path),
                source: e,
            })?;
        let records = reader
            .deserialize::<RawRecord>()
            .collect::<Result<Vec<RawRecord>, csv::Error>>()
            .map_err(|e| StatsError::CsvReadError {
                path: format!("{:?}", path),
                source: e,
            })?;

        debug!("Loaded {} {} rows", records.len(), source);
        Ok(records)
    }

    fn load_regions(&self) -> Result<FeatureCollection, StatsError> {
        let path = self.path_for(REGIONS_FILE_NAME);
        debug!("Loading region geometry from {:?}", path);

        let content = fs::read_to_string(&path).map_err(|e| StatsError::DataFileError {
            path: format!("{:?}", path),
            source: e,
        })?;
        let collection: FeatureCollection =
            serde_json::from_str(&content).map_err(|e| StatsError::GeometryParseError {
                reason: e.to_string(),
            })?;

        debug!("Loaded {} region features", collection.features.len());
        Ok(collection)
    }
}

/// In-memory tables, for tests, benches and callers that parse files themselves.
#[derive(Default, Clone)]
pub struct MemoryLoader {
    tables: HashMap<Source, Vec<RawRecord>>,
    regions: Option<FeatureCollection>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows of a source, replacing any previous rows
    pub fn with_table(mut self, source: Source, rows: Vec<RawRecord>) -> Self {
        self.tables.insert(source, rows);
        self
    }

    pub fn with_regions(mut self, regions: FeatureCollection) -> Self {
        self.regions = Some(regions);
        self
    }
}

impl TableLoader for MemoryLoader {
    fn load(&self, source: Source) -> Result<Vec<RawRecord>, StatsError> {
        match self.tables.get(&source) {
            Some(rows) => Ok(rows.clone()),
            None => {
                warn!("No in-memory table registered for {}", source);
                Err(StatsError::DataUnavailable {
                    source_name: source.to_string(),
                    reason: "table not registered".to_string(),
                })
            }
        }
    }

    fn load_regions(&self) -> Result<FeatureCollection, StatsError> {
        self.regions
            .clone()
            .ok_or_else(|| StatsError::DataUnavailable {
                source_name: REGIONS_FILE_NAME.to_string(),
                reason: "regions not registered".to_string(),
            })
    }
}

/// Build a raw record from `(column, value)` pairs
pub fn raw_record(fields: &[(&str, &str)]) -> RawRecord {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
