// Dashboard root: owns the loader, the config and the shared selections,
// and produces one view per dashboard section

pub mod presenter;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    ConstructorMetric, ConstructorRankMetric, DriverMetric, DriverMetrics, EngineMetric,
    EntitySeries, TyreMetric, aggregate_driver_metrics, constructor_season_metrics,
    constructor_series, driver_series, rank_constructors, rank_tyres, top_champions, top_engines,
};
use crate::config::AppConfig;
use crate::data::{Source, TableLoader, load_async, load_regions_async};
use crate::errors::StatsError;
use crate::normalize::{
    Circuit, ConstructorSummary, DriverSummary, EngineManufacturer, FromNormalized, Race,
    RaceResult, Standing, TyreManufacturer, typed_rows,
};
use crate::regions::{RegionIndex, highlighted_countries, races_by_country};
use crate::season::{SeasonRace, resolve_countries, season_snapshot};
use crate::selection::SelectionStore;

pub use presenter::{RaceDetailsPresenter, run_race_details};

/// Independently loaded parts of the dashboard
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Section {
    Season,
    DriverMetrics,
    DriverComparison,
    ConstructorComparison,
    ConstructorsOverview,
    Champions,
    Tyres,
    Engines,
    RaceDetails,
}

/// What a section shows: its data, or a placeholder message
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SectionView<T> {
    Ready(T),
    /// The inputs loaded but nothing matched
    NoData { message: String },
    /// A source could not be loaded
    Unavailable { message: String },
}

impl<T> SectionView<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, SectionView::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            SectionView::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            SectionView::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SectionView<U> {
        match self {
            SectionView::Ready(value) => SectionView::Ready(f(value)),
            SectionView::NoData { message } => SectionView::NoData { message },
            SectionView::Unavailable { message } => SectionView::Unavailable { message },
        }
    }
}

impl<T> From<Result<T, StatsError>> for SectionView<T> {
    fn from(result: Result<T, StatsError>) -> Self {
        match result {
            Ok(value) => SectionView::Ready(value),
            Err(StatsError::NoMatchingRecords { what }) => {
                debug!("No data for section: {}", what);
                SectionView::NoData {
                    message: format!("No {} available.", what),
                }
            }
            Err(e) => {
                warn!("Section unavailable: {}", e);
                SectionView::Unavailable {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// The season map section
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeasonOverview {
    pub year: i32,
    /// Calendar in round order, countries resolved
    pub races: Vec<SeasonRace>,
    pub races_by_country: BTreeMap<String, Vec<SeasonRace>>,
    /// Countries drawn on the map that hosted a race
    pub highlighted: Vec<String>,
}

pub struct Dashboard {
    loader: Arc<dyn TableLoader>,
    config: AppConfig,
    constructor_selection: SelectionStore,
    driver_selection: SelectionStore,
    loaded: HashSet<Section>,
}

impl Dashboard {
    pub fn new(loader: Arc<dyn TableLoader>, config: AppConfig) -> Self {
        let constructor_selection = SelectionStore::new(config.max_selected_constructors);
        let driver_selection = SelectionStore::new(config.max_selected_drivers);
        Self {
            loader,
            config,
            constructor_selection,
            driver_selection,
            loaded: HashSet::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn loader(&self) -> &Arc<dyn TableLoader> {
        &self.loader
    }

    pub fn constructor_selection(&self) -> &SelectionStore {
        &self.constructor_selection
    }

    pub fn constructor_selection_mut(&mut self) -> &mut SelectionStore {
        &mut self.constructor_selection
    }

    pub fn driver_selection(&self) -> &SelectionStore {
        &self.driver_selection
    }

    pub fn driver_selection_mut(&mut self) -> &mut SelectionStore {
        &mut self.driver_selection
    }

    pub fn is_loaded(&self, section: Section) -> bool {
        self.loaded.contains(&section)
    }

    /// Calendar, resolved countries and highlighted regions of one season
    pub async fn season(&mut self, year: i32) -> SectionView<SeasonOverview> {
        self.mark_loaded(Section::Season);
        self.load_season(year).await.into()
    }

    /// Every driver metric for every driver
    pub async fn driver_metrics(&mut self) -> SectionView<DriverMetrics> {
        self.mark_loaded(Section::DriverMetrics);
        aggregate_driver_metrics(&self.loader).await.into()
    }

    /// One line per selected driver
    pub async fn driver_comparison(&mut self, metric: DriverMetric) -> SectionView<Vec<EntitySeries>> {
        self.mark_loaded(Section::DriverComparison);
        self.compare_drivers(metric).await.into()
    }

    /// One line per selected constructor
    pub async fn constructor_comparison(
        &mut self,
        metric: ConstructorMetric,
    ) -> SectionView<Vec<EntitySeries>> {
        self.mark_loaded(Section::ConstructorComparison);
        self.compare_constructors(metric).await.into()
    }

    /// Constructors ranked for the bubble chart
    pub async fn constructors_overview(
        &mut self,
        metric: ConstructorRankMetric,
    ) -> SectionView<Vec<ConstructorSummary>> {
        self.mark_loaded(Section::ConstructorsOverview);
        let result = self
            .rows::<ConstructorSummary>(Source::Constructors)
            .await
            .and_then(|rows| non_empty(rank_constructors(&rows, metric), "constructors"));
        result.into()
    }

    /// Drivers with the most championship titles
    pub async fn champions(&mut self) -> SectionView<Vec<DriverSummary>> {
        self.mark_loaded(Section::Champions);
        let limit = self.config.top_champions;
        let result = self
            .rows::<DriverSummary>(Source::Drivers)
            .await
            .and_then(|rows| non_empty(top_champions(&rows, limit), "champions"));
        result.into()
    }

    pub async fn tyres(&mut self, metric: TyreMetric) -> SectionView<Vec<TyreManufacturer>> {
        self.mark_loaded(Section::Tyres);
        let result = self
            .rows::<TyreManufacturer>(Source::TyreManufacturers)
            .await
            .and_then(|rows| non_empty(rank_tyres(&rows, metric), "tyre manufacturers"));
        result.into()
    }

    pub async fn engines(&mut self, metric: EngineMetric) -> SectionView<Vec<EngineManufacturer>> {
        self.mark_loaded(Section::Engines);
        let result = self
            .rows::<EngineManufacturer>(Source::EngineManufacturers)
            .await
            .and_then(|rows| non_empty(top_engines(&rows, metric), "engine manufacturers"));
        result.into()
    }

    /// Run the race details stages for one race against a presenter
    pub async fn race_details<P: RaceDetailsPresenter>(
        &mut self,
        year: i32,
        round: u32,
        presenter: &mut P,
    ) {
        self.mark_loaded(Section::RaceDetails);
        run_race_details(&self.loader, year, round, presenter).await;
    }

    async fn load_season(&self, year: i32) -> Result<SeasonOverview, StatsError> {
        let (races, circuits, regions) = tokio::try_join!(
            load_async(&self.loader, Source::Races),
            load_async(&self.loader, Source::Circuits),
            load_regions_async(&self.loader),
        )?;
        let races: Vec<Race> = typed_rows(Source::Races, &races);
        let circuits: Vec<Circuit> = typed_rows(Source::Circuits, &circuits);

        let mut snapshot = season_snapshot(&races, &circuits, year);
        if snapshot.is_empty() {
            return Err(StatsError::NoMatchingRecords {
                what: format!("races for season {}", year),
            });
        }

        let index = RegionIndex::from_features(&regions, self.config.region_match);
        resolve_countries(&mut snapshot, &index);
        let by_country = races_by_country(&snapshot);
        let highlighted = highlighted_countries(&index, &by_country)
            .into_keys()
            .collect();

        info!(
            "Season {}: {} races in {} countries",
            year,
            snapshot.len(),
            by_country.len()
        );
        Ok(SeasonOverview {
            year,
            races: snapshot,
            races_by_country: by_country,
            highlighted,
        })
    }

    async fn compare_drivers(&self, metric: DriverMetric) -> Result<Vec<EntitySeries>, StatsError> {
        let selection = self.driver_selection.selection();
        if selection.is_empty() {
            return Err(StatsError::NoMatchingRecords {
                what: "drivers selected".to_string(),
            });
        }
        let metrics = aggregate_driver_metrics(&self.loader).await?;
        non_empty(
            driver_series(&metrics, metric, selection),
            "driver data for the selection",
        )
    }

    async fn compare_constructors(
        &self,
        metric: ConstructorMetric,
    ) -> Result<Vec<EntitySeries>, StatsError> {
        let selection = self.constructor_selection.selection();
        if selection.is_empty() {
            return Err(StatsError::NoMatchingRecords {
                what: "constructors selected".to_string(),
            });
        }
        let (standings, results) = tokio::try_join!(
            load_async(&self.loader, Source::ConstructorStandings),
            load_async(&self.loader, Source::RaceResults),
        )?;
        let standings: Vec<Standing> = typed_rows(Source::ConstructorStandings, &standings);
        let results: Vec<RaceResult> = typed_rows(Source::RaceResults, &results);
        non_empty(
            constructor_series(
                &standings,
                &constructor_season_metrics(&results),
                metric,
                selection,
            ),
            "constructor data for the selection",
        )
    }

    async fn rows<T: FromNormalized>(&self, source: Source) -> Result<Vec<T>, StatsError> {
        let raw = load_async(&self.loader, source).await?;
        Ok(typed_rows(source, &raw))
    }

    fn mark_loaded(&mut self, section: Section) {
        if !self.loaded.insert(section) {
            debug!("Section {:?} requested again, reloading", section);
        }
    }
}

fn non_empty<T>(rows: Vec<T>, what: &str) -> Result<Vec<T>, StatsError> {
    if rows.is_empty() {
        Err(StatsError::NoMatchingRecords {
            what: what.to_string(),
        })
    } else {
        Ok(rows)
    }
}
