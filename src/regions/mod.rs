// Geo-join: resolve race coordinates to the region polygon that contains them

use std::collections::{BTreeMap, BTreeSet};

use geo::{Area, Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::season::SeasonRace;

/// GeoJSON feature collection, as read from the region boundary file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

impl Feature {
    /// A single-ring polygon feature from `(lng, lat)` pairs
    pub fn polygon(name: &str, ring: &[(f64, f64)]) -> Self {
        let coordinates: Vec<Vec<f64>> = ring.iter().map(|(x, y)| vec![*x, *y]).collect();
        let mut properties = serde_json::Map::new();
        properties.insert("name".to_string(), serde_json::Value::from(name));
        Self {
            properties: Some(properties),
            geometry: Some(serde_json::json!({
                "type": "Polygon",
                "coordinates": [coordinates],
            })),
        }
    }

    /// Trimmed `name` property, empty when absent
    pub fn name(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Which polygon wins when more than one contains a point
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPolicy {
    /// First containing polygon in input order; assumes regions do not overlap
    #[default]
    FirstMatch,
    /// Containing polygon with the smallest area
    SmallestArea,
}

struct Region {
    name: String,
    shape: MultiPolygon<f64>,
}

/// Named region polygons, in input order
pub struct RegionIndex {
    regions: Vec<Region>,
    policy: MatchPolicy,
}

impl RegionIndex {
    /// Build the index from a feature collection.
    ///
    /// Features without a `Polygon`/`MultiPolygon` geometry are skipped.
    pub fn from_features(collection: &FeatureCollection, policy: MatchPolicy) -> Self {
        let regions: Vec<Region> = collection
            .features
            .iter()
            .filter_map(|feature| {
                let shape = feature.geometry.as_ref().and_then(to_multi_polygon);
                if shape.is_none() {
                    warn!(
                        "Skipping region feature {:?} without polygon geometry",
                        feature.name()
                    );
                }
                shape.map(|shape| Region {
                    name: feature.name().to_string(),
                    shape,
                })
            })
            .collect();
        debug!("Indexed {} region polygons", regions.len());
        Self { regions, policy }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Names of the drawn polygons
    pub fn names(&self) -> BTreeSet<&str> {
        self.regions
            .iter()
            .map(|r| r.name.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Name of the region containing the point, `None` when no named region does
    pub fn locate(&self, lng: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lng, lat);
        let mut containing = self
            .regions
            .iter()
            .filter(|r| !r.name.is_empty() && r.shape.contains(&point));
        let region = match self.policy {
            MatchPolicy::FirstMatch => containing.next(),
            MatchPolicy::SmallestArea => {
                containing.min_by(|a, b| a.shape.unsigned_area().total_cmp(&b.shape.unsigned_area()))
            }
        };
        region.map(|r| r.name.as_str())
    }

    /// Country of a race location, falling back to the declared country.
    ///
    /// A zero latitude or longitude counts as missing coordinates.
    pub fn resolve_country(&self, lat: f64, lng: f64, declared_country: &str) -> String {
        if lat != 0. && lng != 0. {
            if let Some(name) = self.locate(lng, lat) {
                return name.to_string();
            }
        }
        declared_country.trim().to_string()
    }
}

/// Races grouped by resolved country, each group ordered by round.
///
/// Races without a resolved country are left out.
pub fn races_by_country(races: &[SeasonRace]) -> BTreeMap<String, Vec<SeasonRace>> {
    let mut mapping: BTreeMap<String, Vec<SeasonRace>> = BTreeMap::new();
    for race in races {
        let key = race.geo_country.trim();
        if key.is_empty() {
            continue;
        }
        mapping.entry(key.to_string()).or_default().push(race.clone());
    }
    for group in mapping.values_mut() {
        group.sort_by_key(|r| r.round);
    }
    mapping
}

/// The subset of `by_country` whose country matches a drawn polygon
pub fn highlighted_countries(
    index: &RegionIndex,
    by_country: &BTreeMap<String, Vec<SeasonRace>>,
) -> BTreeMap<String, Vec<SeasonRace>> {
    let names = index.names();
    by_country
        .iter()
        .filter(|(country, _)| names.contains(country.as_str()))
        .map(|(country, races)| (country.clone(), races.clone()))
        .collect()
}

fn to_multi_polygon(geometry: &serde_json::Value) -> Option<MultiPolygon<f64>> {
    let kind = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?.clone();
    match kind {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates).ok()?;
            Some(MultiPolygon::new(vec![to_polygon(&rings)?]))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coordinates).ok()?;
            polygons
                .iter()
                .map(|rings| to_polygon(rings))
                .collect::<Option<Vec<Polygon<f64>>>>()
                .map(MultiPolygon::new)
        }
        _ => None,
    }
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| to_line_string(ring));
    let exterior = rings.next()??;
    let interiors = rings.collect::<Option<Vec<LineString<f64>>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn to_line_string(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    ring.iter()
        .map(|position| {
            Some(Coord {
                x: *position.first()?,
                y: *position.get(1)?,
            })
        })
        .collect::<Option<Vec<Coord<f64>>>>()
        .map(LineString::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, min_x: f64, min_y: f64, size: f64) -> Feature {
        Feature::polygon(
            name,
            &[
                (min_x, min_y),
                (min_x + size, min_y),
                (min_x + size, min_y + size),
                (min_x, min_y + size),
                (min_x, min_y),
            ],
        )
    }

    fn race(round: u32, geo_country: &str) -> SeasonRace {
        SeasonRace {
            round,
            geo_country: geo_country.to_string(),
            ..Default::default()
        }
    }

    fn index(features: Vec<Feature>, policy: MatchPolicy) -> RegionIndex {
        RegionIndex::from_features(&FeatureCollection { features }, policy)
    }

    #[test]
    fn test_point_inside_polygon_overrides_declared_country() {
        let index = index(vec![square("Italy", 5., 40., 10.)], MatchPolicy::FirstMatch);
        assert_eq!(index.resolve_country(45.6, 9.3, "ITA"), "Italy");
    }

    #[test]
    fn test_zero_coordinates_fall_back_to_declared_country() {
        let index = index(vec![square("Null Island", -1., -1., 2.)], MatchPolicy::FirstMatch);
        assert_eq!(index.resolve_country(0., 0., " Monaco "), "Monaco");
    }

    #[test]
    fn test_point_outside_every_polygon_falls_back() {
        let index = index(vec![square("Italy", 5., 40., 10.)], MatchPolicy::FirstMatch);
        assert_eq!(index.resolve_country(-33.9, 151.2, "Australia"), "Australia");
    }

    #[test]
    fn test_first_match_in_input_order() {
        let features = vec![square("Big", 0., 0., 10.), square("Small", 1., 1., 2.)];
        let first = index(features.clone(), MatchPolicy::FirstMatch);
        let smallest = index(features, MatchPolicy::SmallestArea);

        assert_eq!(first.locate(2., 2.), Some("Big"));
        assert_eq!(smallest.locate(2., 2.), Some("Small"));
    }

    #[test]
    fn test_multipolygon_and_unsupported_geometries() {
        let mut properties = serde_json::Map::new();
        properties.insert("name".to_string(), serde_json::Value::from("Islands"));
        let islands = Feature {
            properties: Some(properties),
            geometry: Some(serde_json::json!({
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]
                ]
            })),
        };
        let point = Feature {
            properties: None,
            geometry: Some(serde_json::json!({"type": "Point", "coordinates": [3, 3]})),
        };

        let index = index(vec![islands, point], MatchPolicy::FirstMatch);
        assert_eq!(index.len(), 1);
        assert_eq!(index.locate(5.5, 5.5), Some("Islands"));
        assert_eq!(index.locate(3., 3.), None);
    }

    #[test]
    fn test_races_by_country_groups_and_orders() {
        let races = vec![race(5, "Italy"), race(2, "Italy"), race(3, ""), race(1, "Bahrain")];
        let mapping = races_by_country(&races);

        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping["Italy"].iter().map(|r| r.round).collect::<Vec<_>>(),
            vec![2, 5]
        );
    }

    #[test]
    fn test_highlighting_requires_a_drawn_polygon() {
        let index = index(vec![square("Italy", 5., 40., 10.)], MatchPolicy::FirstMatch);
        let mapping = races_by_country(&[race(1, "Italy"), race(2, "MON")]);

        let highlighted = highlighted_countries(&index, &mapping);
        assert_eq!(highlighted.keys().collect::<Vec<_>>(), vec!["Italy"]);
    }
}
