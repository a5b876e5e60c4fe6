// Field normalization: raw CSV text into typed values, per source schema

pub mod rows;
pub mod schema;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::{RawRecord, Source};

pub use rows::{
    Circuit, ConstructorSummary, DriverSummary, EngineManufacturer, FastestLap, FromNormalized,
    QualifyingResult, Race, RaceResult, Standing, TyreManufacturer, typed_rows,
};
pub use schema::{FieldKind, FieldSpec, schema_for};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// A raw record after coercion. Built fresh by [`normalize`]; never aliases the raw row.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    fields: HashMap<String, Value>,
}

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Integer value of a field, 0 when missing or not numeric
    pub fn int(&self, field: &str) -> i64 {
        match self.fields.get(field) {
            Some(Value::Int(v)) => *v,
            Some(Value::Float(v)) if v.is_finite() => v.trunc() as i64,
            _ => 0,
        }
    }

    /// Decimal value of a field, 0 when missing or not numeric
    pub fn float(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(Value::Float(v)) => *v,
            Some(Value::Int(v)) => *v as f64,
            _ => 0.,
        }
    }

    pub fn flag(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Bool(true)))
    }

    /// Text value of a field, empty when missing
    pub fn text(&self, field: &str) -> &str {
        match self.fields.get(field) {
            Some(Value::Text(v)) => v.as_str(),
            _ => "",
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Normalize one raw record according to the schema of its source.
///
/// Total: every schema field is present in the output, holding either the coerced
/// value or the fallback for its kind. Columns the schema does not name are
/// carried through as trimmed text.
pub fn normalize(source: Source, raw: &RawRecord) -> NormalizedRecord {
    let schema = schema_for(source);
    let mut fields: HashMap<String, Value> = raw
        .iter()
        .map(|(k, v)| (k.clone(), Value::Text(v.trim().to_string())))
        .collect();

    for spec in schema {
        fields.insert(spec.name.to_string(), resolve_field(spec, raw));
    }

    NormalizedRecord { fields }
}

/// Normalize every row of a source
pub fn normalize_all(source: Source, raw: &[RawRecord]) -> Vec<NormalizedRecord> {
    raw.iter().map(|r| normalize(source, r)).collect()
}

fn resolve_field(spec: &FieldSpec, raw: &RawRecord) -> Value {
    let fallback = spec.kind.fallback();
    spec.candidates
        .iter()
        .filter_map(|column| raw.get(*column))
        .map(|text| coerce(spec.kind, text))
        .find(|value| *value != fallback)
        .unwrap_or(fallback)
}

/// Coerce one raw string to the given kind, falling back instead of failing.
pub fn coerce(kind: FieldKind, text: &str) -> Value {
    let trimmed = text.trim();
    match kind {
        FieldKind::Int => Value::Int(parse_int(trimmed).unwrap_or(0)),
        FieldKind::Float => Value::Float(parse_float(trimmed).unwrap_or(0.)),
        FieldKind::Bool => Value::Bool(trimmed.eq_ignore_ascii_case("true")),
        FieldKind::Key => Value::Text(normalize_key(trimmed)),
        FieldKind::Text => Value::Text(trimmed.to_string()),
    }
}

/// Canonical form of an entity key: trimmed and lower-cased
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn parse_float(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_int(text: &str) -> Option<i64> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    // "2020.0" style numbers still count as whole numbers
    parse_float(text)
        .filter(|v| v.fract() == 0. && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::raw_record;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_fields_are_coerced() {
        let raw = raw_record(&[
            ("year", " 2020 "),
            ("driverId", "alice"),
            ("points", "12.5"),
            ("positionNumber", "1"),
        ]);
        let record = normalize(Source::DriverStandings, &raw);

        assert_eq!(record.int("year"), 2020);
        assert_eq!(record.float("points"), 12.5);
        assert_eq!(record.int("positionNumber"), 1);
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_zero() {
        let raw = raw_record(&[("year", "n/a"), ("points", ""), ("positionNumber", "NaN")]);
        let record = normalize(Source::DriverStandings, &raw);

        assert_eq!(record.get("year"), Some(&Value::Int(0)));
        assert_eq!(record.get("points"), Some(&Value::Float(0.)));
        assert_eq!(record.get("positionNumber"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_missing_schema_fields_get_fallbacks() {
        let record = normalize(Source::RaceResults, &RawRecord::new());

        assert_eq!(record.get("polePosition"), Some(&Value::Bool(false)));
        assert_eq!(record.get("driverId"), Some(&Value::Text(String::new())));
        assert_eq!(record.len(), schema_for(Source::RaceResults).len());
    }

    #[test]
    fn test_boolean_literal_parsing() {
        let yes = normalize(Source::RaceResults, &raw_record(&[("polePosition", "TRUE")]));
        let no = normalize(Source::RaceResults, &raw_record(&[("polePosition", "false")]));
        let junk = normalize(Source::RaceResults, &raw_record(&[("polePosition", "1")]));

        assert!(yes.flag("polePosition"));
        assert!(!no.flag("polePosition"));
        assert!(!junk.flag("polePosition"));
    }

    #[test]
    fn test_keys_are_trimmed_and_lower_cased() {
        let raw = raw_record(&[("circuitId", "  Monza ")]);
        let record = normalize(Source::Races, &raw);
        assert_eq!(record.text("circuitId"), "monza");
    }

    #[test]
    fn test_candidate_columns_resolve_in_order() {
        let raw = raw_record(&[
            ("id", "Silverstone"),
            ("latitude", "52.07"),
            ("lng", "0"),
            ("longitude", "-1.01"),
            ("countryId", "united-kingdom"),
        ]);
        let record = normalize(Source::Circuits, &raw);

        assert_eq!(record.text("circuitId"), "silverstone");
        assert_eq!(record.float("lat"), 52.07);
        // A zero in the primary column falls through to the alias
        assert_eq!(record.float("lng"), -1.01);
        assert_eq!(record.text("country"), "united-kingdom");
    }

    #[test]
    fn test_input_record_is_left_untouched() {
        let raw = raw_record(&[("year", " 2021 "), ("circuitId", " SPA ")]);
        let before = raw.clone();
        let _ = normalize(Source::Races, &raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_unknown_columns_pass_through_as_text() {
        let raw = raw_record(&[("officialName", " Grand Prix "), ("date", "2020-07-05")]);
        let record = normalize(Source::Races, &raw);
        assert_eq!(record.text("date"), "2020-07-05");
        assert_eq!(record.text("raceName"), "Grand Prix");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_normalize_never_drops_schema_fields(
            year in ".*",
            points in ".*",
            pole in ".*",
        ) {
            let raw = raw_record(&[
                ("year", year.as_str()),
                ("points", points.as_str()),
                ("polePosition", pole.as_str()),
            ]);
            let record = normalize(Source::RaceResults, &raw);
            for spec in schema_for(Source::RaceResults) {
                prop_assert!(record.get(spec.name).is_some());
            }
            prop_assert!(record.float("points").is_finite());
        }
    }
}
