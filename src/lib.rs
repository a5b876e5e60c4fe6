// Library interface for f1stats
// This allows the binary, integration tests and benches to share the data core

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod errors;
pub mod normalize;
pub mod regions;
pub mod season;
pub mod selection;
pub mod writer;

// Re-export commonly used types
pub use aggregate::{DriverMetric, DriverMetrics, MetricMapping};
pub use config::AppConfig;
pub use dashboard::{Dashboard, RaceDetailsPresenter, Section, SectionView};
pub use data::{CsvDirectoryLoader, MemoryLoader, RawRecord, Source, TableLoader};
pub use errors::StatsError;
pub use normalize::{NormalizedRecord, Value, normalize};
pub use regions::{FeatureCollection, MatchPolicy, RegionIndex};
pub use season::SeasonRace;
pub use selection::{SelectionStore, SubscriptionId};
