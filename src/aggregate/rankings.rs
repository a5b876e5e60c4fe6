// Rankings over the reference tables (drivers, constructors, tyres, engines)

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::normalize::{ConstructorSummary, DriverSummary, EngineManufacturer, TyreManufacturer};

/// Engine manufacturers shown by the engines chart
pub const TOP_ENGINES: usize = 5;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum TyreMetric {
    RaceWins,
    PolePositions,
    FastestLaps,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum EngineMetric {
    RaceWins,
    CapacityScore,
    ConfigScore,
    AspirationScore,
    SustainabilityScore,
}

/// Bubble size metric of the constructors overview
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ConstructorRankMetric {
    TotalRaceWins,
    TotalChampionshipWins,
    TotalPoints,
}

/// Drivers with at least one title, most titles first, at most `limit`.
///
/// Ties are ordered by name.
pub fn top_champions(drivers: &[DriverSummary], limit: usize) -> Vec<DriverSummary> {
    drivers
        .iter()
        .filter(|d| d.total_championship_wins > 0)
        .sorted_by(|a, b| {
            b.total_championship_wins
                .cmp(&a.total_championship_wins)
                .then_with(|| a.full_name.cmp(&b.full_name))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Every tyre manufacturer, highest value of `metric` first
pub fn rank_tyres(tyres: &[TyreManufacturer], metric: TyreMetric) -> Vec<TyreManufacturer> {
    let value = |t: &TyreManufacturer| match metric {
        TyreMetric::RaceWins => t.total_race_wins,
        TyreMetric::PolePositions => t.total_pole_positions,
        TyreMetric::FastestLaps => t.total_fastest_laps,
    };
    tyres
        .iter()
        .sorted_by(|a, b| value(b).cmp(&value(a)).then_with(|| a.name.cmp(&b.name)))
        .cloned()
        .collect()
}

/// The [`TOP_ENGINES`] engine manufacturers with the highest value of `metric`
pub fn top_engines(engines: &[EngineManufacturer], metric: EngineMetric) -> Vec<EngineManufacturer> {
    let value = |e: &EngineManufacturer| match metric {
        EngineMetric::RaceWins => f64::from(e.race_wins),
        EngineMetric::CapacityScore => e.capacity_score,
        EngineMetric::ConfigScore => e.config_score,
        EngineMetric::AspirationScore => e.aspiration_score,
        EngineMetric::SustainabilityScore => e.sustainability_score,
    };
    engines
        .iter()
        .sorted_by(|a, b| {
            value(b)
                .total_cmp(&value(a))
                .then_with(|| a.name.cmp(&b.name))
        })
        .take(TOP_ENGINES)
        .cloned()
        .collect()
}

/// Every constructor, highest value of `metric` first
pub fn rank_constructors(
    constructors: &[ConstructorSummary],
    metric: ConstructorRankMetric,
) -> Vec<ConstructorSummary> {
    let value = |c: &ConstructorSummary| match metric {
        ConstructorRankMetric::TotalRaceWins => f64::from(c.total_race_wins),
        ConstructorRankMetric::TotalChampionshipWins => f64::from(c.total_championship_wins),
        ConstructorRankMetric::TotalPoints => c.total_points,
    };
    constructors
        .iter()
        .sorted_by(|a, b| {
            value(b)
                .total_cmp(&value(a))
                .then_with(|| a.constructor_id.cmp(&b.constructor_id))
        })
        .cloned()
        .collect()
}
