// Aggregation engine: group rows by entity and year, reduce each group to a metric

pub mod rankings;
pub mod series;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::{Source, TableLoader, load_async};
use crate::errors::StatsError;
use crate::normalize::{QualifyingResult, RaceResult, Standing, typed_rows};

pub use rankings::{
    ConstructorRankMetric, EngineMetric, TyreMetric, rank_constructors, rank_tyres,
    top_champions, top_engines,
};
pub use series::{ConstructorMetric, EntitySeries, SeriesPoint, constructor_series, driver_series};

/// Entity key to year to value. Ordered so that iteration and serialization are deterministic.
pub type MetricMapping<V> = BTreeMap<String, BTreeMap<i32, V>>;

/// Group rows by entity key, then by year, and reduce every group.
///
/// Rows with an empty entity key are skipped. A (key, year) pair only appears in
/// the output when at least one input row carries it.
pub fn rollup<R, V>(
    rows: &[R],
    key: impl Fn(&R) -> &str,
    year: impl Fn(&R) -> i32,
    reduce: impl Fn(&[&R]) -> V,
) -> MetricMapping<V> {
    let groups = rows
        .iter()
        .filter(|r| !key(r).is_empty())
        .into_group_map_by(|r| (key(r).to_string(), year(r)));

    let mut mapping: MetricMapping<V> = BTreeMap::new();
    for ((entity, year), group) in groups {
        mapping
            .entry(entity)
            .or_default()
            .insert(year, reduce(&group));
    }
    mapping
}

/// 1 for every driver and year in which any standings row has position 1, else 0
pub fn championship_wins(standings: &[Standing]) -> MetricMapping<u32> {
    rollup(
        standings,
        |s| s.entity_id.as_str(),
        |s| s.year,
        |rows| u32::from(rows.iter().any(|s| s.position_number == 1)),
    )
}

/// Every standings row of a driver's year, sorted by descending points
pub fn championship_points(standings: &[Standing]) -> MetricMapping<Vec<Standing>> {
    rollup(
        standings,
        |s| s.entity_id.as_str(),
        |s| s.year,
        |rows| {
            rows.iter()
                .map(|s| (*s).clone())
                .sorted_by(compare_by_points)
                .collect()
        },
    )
}

/// Best (lowest) classified championship position of a driver's year.
///
/// Unclassified rows (position 0) are ignored; a year with only unclassified rows maps to 0.
/// This differs from a plain minimum over all rows, which reports 0 as soon as
/// one row of the year is unclassified: rows at 0 and 4 give 4 here, not 0.
pub fn championship_position(standings: &[Standing]) -> MetricMapping<u32> {
    rollup(
        standings,
        |s| s.entity_id.as_str(),
        |s| s.year,
        |rows| {
            rows.iter()
                .map(|s| s.position_number)
                .filter(|p| *p > 0)
                .min()
                .unwrap_or(0)
        },
    )
}

/// Number of races won per driver and year
pub fn race_wins(results: &[RaceResult]) -> MetricMapping<u32> {
    rollup(
        results,
        |r| r.driver_id.as_str(),
        |r| r.year,
        |rows| count(rows, |r| r.position_number == 1),
    )
}

/// Number of top-3 finishes per driver and year
pub fn podiums(results: &[RaceResult]) -> MetricMapping<u32> {
    rollup(
        results,
        |r| r.driver_id.as_str(),
        |r| r.year,
        |rows| count(rows, |r| (1..=3).contains(&r.position_number)),
    )
}

/// Number of qualifying sessions topped per driver and year
pub fn pole_positions(qualifying: &[QualifyingResult]) -> MetricMapping<u32> {
    rollup(
        qualifying,
        |q| q.driver_id.as_str(),
        |q| q.year,
        |rows| count(rows, |q| q.position_number == 1),
    )
}

/// Race results summed per constructor for one race
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConstructorRaceScore {
    pub constructor_id: String,
    pub display_name: String,
    pub total_points: f64,
    /// Distinct drivers who raced for the constructor, sorted
    pub drivers: Vec<String>,
}

/// Points per constructor for the race identified by `year` and `round`.
///
/// Empty when the race has no results.
pub fn constructor_points_for_race(
    results: &[RaceResult],
    year: i32,
    round: u32,
) -> BTreeMap<String, ConstructorRaceScore> {
    let groups = results
        .iter()
        .filter(|r| r.year == year && r.round == round && !r.constructor_id.is_empty())
        .into_group_map_by(|r| r.constructor_id.clone());

    groups
        .into_iter()
        .map(|(constructor_id, rows)| {
            let display_name = rows
                .iter()
                .map(|r| r.constructor_name.as_str())
                .filter(|n| !n.is_empty())
                .min()
                .map(str::to_string)
                .unwrap_or_else(|| constructor_id.replace('-', " "));
            let drivers: BTreeSet<String> = rows
                .iter()
                .map(|r| {
                    if r.driver_name.is_empty() {
                        r.driver_id.clone()
                    } else {
                        r.driver_name.clone()
                    }
                })
                .collect();
            let score = ConstructorRaceScore {
                constructor_id: constructor_id.clone(),
                display_name,
                total_points: rows.iter().map(|r| r.points).sum(),
                drivers: drivers.into_iter().collect(),
            };
            (constructor_id, score)
        })
        .collect()
}

/// Season counters for a constructor
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstructorSeasonMetrics {
    pub race_wins: u32,
    pub podiums: u32,
    pub pole_positions: u32,
}

/// Wins, podiums and poles per constructor and year.
///
/// Positions come from `positionDisplayOrder`, poles from the `polePosition` flag.
pub fn constructor_season_metrics(
    results: &[RaceResult],
) -> MetricMapping<ConstructorSeasonMetrics> {
    rollup(
        results,
        |r| r.constructor_id.as_str(),
        |r| r.year,
        |rows| ConstructorSeasonMetrics {
            race_wins: count(rows, |r| r.position_display_order == 1),
            podiums: count(rows, |r| (1..=3).contains(&r.position_display_order)),
            pole_positions: count(rows, |r| r.pole_position),
        },
    )
}

/// The per-driver metrics the driver comparison charts switch between
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum DriverMetric {
    ChampionshipWins,
    RaceWins,
    Podiums,
    PolePositions,
    ChampionshipPoints,
    ChampionshipPosition,
}

impl DriverMetric {
    pub const ALL: [DriverMetric; 6] = [
        DriverMetric::ChampionshipWins,
        DriverMetric::RaceWins,
        DriverMetric::Podiums,
        DriverMetric::PolePositions,
        DriverMetric::ChampionshipPoints,
        DriverMetric::ChampionshipPosition,
    ];

    /// Source table the metric is computed from
    pub fn source(&self) -> Source {
        match self {
            DriverMetric::ChampionshipWins
            | DriverMetric::ChampionshipPoints
            | DriverMetric::ChampionshipPosition => Source::DriverStandings,
            DriverMetric::RaceWins | DriverMetric::Podiums => Source::RaceResults,
            DriverMetric::PolePositions => Source::QualifyingResults,
        }
    }
}

impl std::fmt::Display for DriverMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverMetric::ChampionshipWins => write!(f, "Championship Wins"),
            DriverMetric::RaceWins => write!(f, "Race Wins"),
            DriverMetric::Podiums => write!(f, "Podiums"),
            DriverMetric::PolePositions => write!(f, "Pole Positions"),
            DriverMetric::ChampionshipPoints => write!(f, "Championship Points"),
            DriverMetric::ChampionshipPosition => write!(f, "Championship Position"),
        }
    }
}

/// All driver metrics, computed together from the three driver sources
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverMetrics {
    pub championship_wins: MetricMapping<u32>,
    pub race_wins: MetricMapping<u32>,
    pub podiums: MetricMapping<u32>,
    pub pole_positions: MetricMapping<u32>,
    pub championship_points: MetricMapping<Vec<Standing>>,
    pub championship_position: MetricMapping<u32>,
}

/// One flattened metric value, as written by the export command
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    pub metric: DriverMetric,
    pub driver_id: String,
    pub year: i32,
    pub value: f64,
}

impl DriverMetrics {
    pub fn from_rows(
        standings: &[Standing],
        results: &[RaceResult],
        qualifying: &[QualifyingResult],
    ) -> Self {
        Self {
            championship_wins: championship_wins(standings),
            race_wins: race_wins(results),
            podiums: podiums(results),
            pole_positions: pole_positions(qualifying),
            championship_points: championship_points(standings),
            championship_position: championship_position(standings),
        }
    }

    /// Year to scalar value of one metric for one driver, `None` when the driver has no data.
    ///
    /// Championship points resolve to the points of the highest-scoring row of each year.
    pub fn yearly_values(&self, metric: DriverMetric, driver_id: &str) -> Option<BTreeMap<i32, f64>> {
        let counts = match metric {
            DriverMetric::ChampionshipWins => &self.championship_wins,
            DriverMetric::RaceWins => &self.race_wins,
            DriverMetric::Podiums => &self.podiums,
            DriverMetric::PolePositions => &self.pole_positions,
            DriverMetric::ChampionshipPosition => &self.championship_position,
            DriverMetric::ChampionshipPoints => {
                return self.championship_points.get(driver_id).map(|years| {
                    years
                        .iter()
                        .map(|(year, rows)| (*year, rows.first().map(|s| s.points).unwrap_or(0.)))
                        .collect()
                });
            }
        };
        counts.get(driver_id).map(|years| {
            years
                .iter()
                .map(|(year, value)| (*year, f64::from(*value)))
                .collect()
        })
    }

    /// Keep only the given drivers
    pub fn restricted_to(&self, driver_ids: &[String]) -> Self {
        fn keep<V: Clone>(mapping: &MetricMapping<V>, ids: &[String]) -> MetricMapping<V> {
            mapping
                .iter()
                .filter(|(k, _)| ids.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }
        Self {
            championship_wins: keep(&self.championship_wins, driver_ids),
            race_wins: keep(&self.race_wins, driver_ids),
            podiums: keep(&self.podiums, driver_ids),
            pole_positions: keep(&self.pole_positions, driver_ids),
            championship_points: keep(&self.championship_points, driver_ids),
            championship_position: keep(&self.championship_position, driver_ids),
        }
    }

    /// Every (metric, driver, year) value as a flat row
    pub fn rows(&self) -> Vec<MetricRow> {
        let drivers: BTreeSet<&String> = self
            .championship_wins
            .keys()
            .chain(self.race_wins.keys())
            .chain(self.podiums.keys())
            .chain(self.pole_positions.keys())
            .chain(self.championship_points.keys())
            .chain(self.championship_position.keys())
            .collect();

        let mut rows = Vec::new();
        for metric in DriverMetric::ALL {
            for driver_id in &drivers {
                if let Some(values) = self.yearly_values(metric, driver_id) {
                    rows.extend(values.into_iter().map(|(year, value)| MetricRow {
                        metric,
                        driver_id: (*driver_id).clone(),
                        year,
                        value,
                    }));
                }
            }
        }
        rows
    }
}

/// Load the driver sources concurrently and compute every driver metric.
///
/// Fails with the first `DataUnavailable` among the three loads; never returns a
/// partially populated result.
pub async fn aggregate_driver_metrics(
    loader: &Arc<dyn TableLoader>,
) -> Result<DriverMetrics, StatsError> {
    let (standings, results, qualifying) = tokio::try_join!(
        load_async(loader, Source::DriverStandings),
        load_async(loader, Source::RaceResults),
        load_async(loader, Source::QualifyingResults),
    )?;
    debug!(
        "Aggregating driver metrics over {} standings, {} results, {} qualifying rows",
        standings.len(),
        results.len(),
        qualifying.len()
    );

    let metrics = DriverMetrics::from_rows(
        &typed_rows(Source::DriverStandings, &standings),
        &typed_rows(Source::RaceResults, &results),
        &typed_rows(Source::QualifyingResults, &qualifying),
    );
    info!(
        "Aggregated driver metrics for {} drivers",
        metrics.championship_points.len().max(metrics.race_wins.len())
    );
    Ok(metrics)
}

fn count<R>(rows: &[&R], predicate: impl Fn(&R) -> bool) -> u32 {
    rows.iter().filter(|r| predicate(r)).count() as u32
}

fn compare_by_points(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then(a.position_number.cmp(&b.position_number))
        .then(a.position_display_order.cmp(&b.position_display_order))
}
