// Year-ordered series for the comparison line charts

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::Standing;

use super::{ConstructorSeasonMetrics, DriverMetric, DriverMetrics, MetricMapping};

/// Position plotted for a constructor without a classified championship position
pub const UNCLASSIFIED_POSITION: u32 = 13;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// One line of a comparison chart
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EntitySeries {
    pub entity_id: String,
    pub points: Vec<SeriesPoint>,
}

/// Metrics of the constructor comparison chart
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ConstructorMetric {
    Points,
    PositionNumber,
    RaceWins,
    Podiums,
    PolePositions,
}

/// Series of the selected drivers for one metric, in selection order.
///
/// Drivers without any data for the metric are left out.
pub fn driver_series(
    metrics: &DriverMetrics,
    metric: DriverMetric,
    selection: &[String],
) -> Vec<EntitySeries> {
    selection
        .iter()
        .filter_map(|driver_id| {
            metrics
                .yearly_values(metric, driver_id)
                .map(|values| EntitySeries {
                    entity_id: driver_id.clone(),
                    points: to_points(values),
                })
        })
        .collect()
}

/// Series of the selected constructors for one metric, in selection order.
///
/// Points and positions come from the season standings; a year with several
/// standings rows keeps the highest points and the best classified position.
/// Unclassified positions plot as [`UNCLASSIFIED_POSITION`]. The counters come
/// from [`super::constructor_season_metrics`].
pub fn constructor_series(
    standings: &[Standing],
    season_metrics: &MetricMapping<ConstructorSeasonMetrics>,
    metric: ConstructorMetric,
    selection: &[String],
) -> Vec<EntitySeries> {
    selection
        .iter()
        .filter_map(|constructor_id| {
            let values = match metric {
                ConstructorMetric::Points | ConstructorMetric::PositionNumber => {
                    standings_values(standings, constructor_id, metric)
                }
                ConstructorMetric::RaceWins
                | ConstructorMetric::Podiums
                | ConstructorMetric::PolePositions => season_metrics
                    .get(constructor_id)
                    .map(|years| {
                        years
                            .iter()
                            .map(|(year, m)| (*year, f64::from(counter(m, metric))))
                            .collect()
                    })
                    .unwrap_or_default(),
            };
            if values.is_empty() {
                None
            } else {
                Some(EntitySeries {
                    entity_id: constructor_id.clone(),
                    points: to_points(values),
                })
            }
        })
        .collect()
}

fn standings_values(
    standings: &[Standing],
    constructor_id: &str,
    metric: ConstructorMetric,
) -> BTreeMap<i32, f64> {
    let mut values: BTreeMap<i32, f64> = BTreeMap::new();
    for row in standings.iter().filter(|s| s.entity_id == constructor_id) {
        let value = match metric {
            ConstructorMetric::PositionNumber if row.position_number > 0 => {
                f64::from(row.position_number)
            }
            ConstructorMetric::PositionNumber => f64::from(UNCLASSIFIED_POSITION),
            _ => row.points,
        };
        values
            .entry(row.year)
            .and_modify(|current| {
                *current = match metric {
                    ConstructorMetric::PositionNumber => current.min(value),
                    _ => current.max(value),
                }
            })
            .or_insert(value);
    }
    values
}

fn counter(metrics: &ConstructorSeasonMetrics, metric: ConstructorMetric) -> u32 {
    match metric {
        ConstructorMetric::RaceWins => metrics.race_wins,
        ConstructorMetric::Podiums => metrics.podiums,
        ConstructorMetric::PolePositions => metrics.pole_positions,
        ConstructorMetric::Points | ConstructorMetric::PositionNumber => 0,
    }
}

fn to_points(values: BTreeMap<i32, f64>) -> Vec<SeriesPoint> {
    values
        .into_iter()
        .map(|(year, value)| SeriesPoint { year, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(constructor: &str, year: i32, position: u32, points: f64) -> Standing {
        Standing {
            year,
            entity_id: constructor.to_string(),
            position_number: position,
            position_display_order: position,
            points,
        }
    }

    #[test]
    fn test_driver_series_follows_selection_order() {
        let standings = vec![
            standing("bob", 2021, 2, 100.),
            standing("alice", 2020, 1, 200.),
            standing("alice", 2019, 3, 90.),
        ];
        let metrics = DriverMetrics::from_rows(&standings, &[], &[]);
        let selection = vec!["bob".to_string(), "nobody".to_string(), "alice".to_string()];

        let series = driver_series(&metrics, DriverMetric::ChampionshipPosition, &selection);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].entity_id, "bob");
        assert_eq!(series[1].entity_id, "alice");
        assert_eq!(
            series[1].points,
            vec![
                SeriesPoint { year: 2019, value: 3. },
                SeriesPoint { year: 2020, value: 1. }
            ]
        );
    }

    #[test]
    fn test_constructor_positions_use_unclassified_floor() {
        let standings = vec![standing("minardi", 2001, 0, 0.), standing("minardi", 2002, 9, 2.)];
        let series = constructor_series(
            &standings,
            &MetricMapping::new(),
            ConstructorMetric::PositionNumber,
            &["minardi".to_string()],
        );

        assert_eq!(series[0].points[0].value, f64::from(UNCLASSIFIED_POSITION));
        assert_eq!(series[0].points[1].value, 9.);
    }

    #[test]
    fn test_constructor_counters_come_from_season_metrics() {
        let mut season = MetricMapping::new();
        season.entry("ferrari".to_string()).or_insert_with(BTreeMap::new).insert(
            2004,
            ConstructorSeasonMetrics {
                race_wins: 15,
                podiums: 29,
                pole_positions: 12,
            },
        );

        let selection = vec!["ferrari".to_string(), "williams".to_string()];
        let series = constructor_series(&[], &season, ConstructorMetric::Podiums, &selection);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![SeriesPoint { year: 2004, value: 29. }]);
    }
}
