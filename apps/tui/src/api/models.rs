//! Typed, fully-defaulted records parsed from the emissions API payloads.
//!
//! Every numeric field goes through [`coerce_f64`], so missing, `null`,
//! non-numeric or non-finite values read as `0.0` instead of failing the
//! whole payload. Downstream code can assume the records are complete.

use crate::domain::{HotspotLevel, Pollutant};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_count(value: &Value) -> u64 {
    coerce_f64(value).max(0.0).round() as u64
}

pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|value| coerce_f64(&value))
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|value| coerce_string(&value))
}

pub(crate) fn lenient_f64_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().map(coerce_f64).collect())
        .unwrap_or_default())
}

pub(crate) fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().map(coerce_string).collect())
        .unwrap_or_default())
}

/// Nested objects of the wrong shape fall back to their default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_coordinate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HotspotLevel, D::Error> {
    Value::deserialize(deserializer).map(|value| HotspotLevel::parse(&coerce_string(&value)))
}

/// Alternate spellings of the pollutant reading keys, as `(alias, primary)`.
const READING_KEYS: &[(&str, &str)] = &[
    ("Month", "month"),
    ("co2_ppm", "CO2_ppm"),
    ("ch4_ppm", "CH4_ppm"),
    ("pm10", "PM10"),
    ("pm2_5", "PM2_5"),
    ("nox_ppm", "NOx_ppm"),
    ("so2_ppm", "SO2_ppm"),
];

/// Folds each `(alias, primary)` key of an object onto its primary name.
/// When both spellings are present the primary value wins and the alias is
/// discarded, so serde never sees the same field twice.
pub(crate) fn prefer_primary_keys(value: &mut Value, keys: &[(&str, &str)]) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    for (alias, primary) in keys {
        if let Some(aliased) = map.remove(*alias) {
            if !map.contains_key(*primary) {
                map.insert((*primary).to_string(), aliased);
            }
        }
    }
}

/// Items of a JSON array that deserialize cleanly; anything else is dropped.
fn objects<T: DeserializeOwned>(items: Option<&Value>, keys: &[(&str, &str)]) -> Vec<T> {
    items
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| {
                    let mut item = item.clone();
                    prefer_primary_keys(&mut item, keys);
                    serde_json::from_value(item).ok()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonthlyRecord {
    #[serde(alias = "Month", deserialize_with = "lenient_string")]
    pub month: String,
    #[serde(rename = "CO2_ppm", alias = "co2_ppm", deserialize_with = "lenient_f64")]
    pub co2_ppm: f64,
    #[serde(rename = "CH4_ppm", alias = "ch4_ppm", deserialize_with = "lenient_f64")]
    pub ch4_ppm: f64,
    #[serde(rename = "PM10", alias = "pm10", deserialize_with = "lenient_f64")]
    pub pm10: f64,
    #[serde(rename = "PM2_5", alias = "pm2_5", deserialize_with = "lenient_f64")]
    pub pm2_5: f64,
}

pub fn parse_monthly(body: Option<&Value>) -> Vec<MonthlyRecord> {
    objects(body, READING_KEYS)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AverageMetrics {
    #[serde(rename = "CO2_ppm", alias = "co2_ppm", deserialize_with = "lenient_f64")]
    pub co2_ppm: f64,
    #[serde(rename = "CH4_ppm", alias = "ch4_ppm", deserialize_with = "lenient_f64")]
    pub ch4_ppm: f64,
    #[serde(rename = "PM10", alias = "pm10", deserialize_with = "lenient_f64")]
    pub pm10: f64,
    #[serde(rename = "PM2_5", alias = "pm2_5", deserialize_with = "lenient_f64")]
    pub pm2_5: f64,
    #[serde(rename = "NOx_ppm", alias = "nox_ppm", deserialize_with = "lenient_f64")]
    pub nox_ppm: f64,
    #[serde(rename = "SO2_ppm", alias = "so2_ppm", deserialize_with = "lenient_f64")]
    pub so2_ppm: f64,
}

impl AverageMetrics {
    pub const fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Co2 => self.co2_ppm,
            Pollutant::Ch4 => self.ch4_ppm,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Nox => self.nox_ppm,
            Pollutant::So2 => self.so2_ppm,
        }
    }

    fn clamped(self) -> Self {
        Self {
            co2_ppm: self.co2_ppm.max(0.0),
            ch4_ppm: self.ch4_ppm.max(0.0),
            pm10: self.pm10.max(0.0),
            pm2_5: self.pm2_5.max(0.0),
            nox_ppm: self.nox_ppm.max(0.0),
            so2_ppm: self.so2_ppm.max(0.0),
        }
    }
}

/// Reads `average_emissions_ppm` from the averages payload.
pub fn parse_averages(body: Option<&Value>) -> AverageMetrics {
    body.and_then(|body| body.get("average_emissions_ppm"))
        .filter(|inner| inner.is_object())
        .and_then(|inner| {
            let mut inner = inner.clone();
            prefer_primary_keys(&mut inner, READING_KEYS);
            serde_json::from_value::<AverageMetrics>(inner).ok()
        })
        .unwrap_or_default()
        .clamped()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Hotspot {
    #[serde(rename = "Mine_Name", deserialize_with = "lenient_string")]
    pub mine_name: String,
    #[serde(rename = "District", deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(rename = "State", deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(rename = "Latitude", deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    #[serde(rename = "Hotspot_Level", deserialize_with = "lenient_level")]
    pub level: HotspotLevel,
    #[serde(rename = "Emission_Score", deserialize_with = "lenient_f64")]
    pub emission_score: f64,
}

impl Hotspot {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Reads the `data` array of the hotspot list payload.
pub fn parse_hotspots(body: Option<&Value>) -> Vec<Hotspot> {
    objects(body.and_then(|body| body.get("data")), &[])
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelStats {
    #[serde(deserialize_with = "lenient_f64")]
    pub count: f64,
    #[serde(rename = "avgScore", deserialize_with = "lenient_f64")]
    pub avg_score: f64,
    #[serde(rename = "maxScore", deserialize_with = "lenient_f64")]
    pub max_score: f64,
    #[serde(rename = "minScore", deserialize_with = "lenient_f64")]
    pub min_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotStats {
    pub levels: BTreeMap<HotspotLevel, LevelStats>,
    pub total: u64,
}

impl HotspotStats {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn count(&self, level: &HotspotLevel) -> u64 {
        self.levels
            .get(level)
            .map_or(0, |stats| stats.count.max(0.0).round() as u64)
    }
}

/// Reads the `stats` object of the aggregate payload. A missing `total` is
/// recomputed from the per-level counts.
pub fn parse_hotspot_stats(body: Option<&Value>) -> HotspotStats {
    let Some(stats) = body
        .and_then(|body| body.get("stats"))
        .and_then(Value::as_object)
    else {
        return HotspotStats::default();
    };

    let mut parsed = HotspotStats::default();
    let mut reported_total = None;

    for (key, value) in stats {
        if key == "total" {
            reported_total = Some(coerce_count(value));
            continue;
        }
        if !value.is_object() {
            continue;
        }
        let level_stats = serde_json::from_value::<LevelStats>(value.clone()).unwrap_or_default();
        parsed.levels.insert(HotspotLevel::parse(key), level_stats);
    }

    parsed.total = reported_total.unwrap_or_else(|| {
        HotspotLevel::known()
            .iter()
            .chain(parsed.levels.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .map(|level| parsed.count(level))
            .sum()
    });

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn monthly_rows_accept_both_key_styles_and_bad_numbers() {
        let body = json!([
            {"month": "Jan", "CO2_ppm": 412.345, "CH4_ppm": "1.9", "PM10": null, "PM2_5": 33},
            {"Month": "Feb", "co2_ppm": 400, "ch4_ppm": "n/a", "pm10": 80.5},
            "garbage",
            42
        ]);

        let rows = parse_monthly(Some(&body));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "Jan");
        assert!((rows[0].ch4_ppm - 1.9).abs() < f64::EPSILON);
        assert!(rows[0].pm10.abs() < f64::EPSILON);
        assert_eq!(rows[1].month, "Feb");
        assert!(rows[1].ch4_ppm.abs() < f64::EPSILON);
        assert!(rows[1].pm2_5.abs() < f64::EPSILON);
    }

    #[test]
    fn monthly_row_with_both_spellings_keeps_primary_values() {
        let body = json!([
            {"month": "Jan", "Month": "January", "CO2_ppm": 410, "co2_ppm": 999, "pm10": 40}
        ]);

        let rows = parse_monthly(Some(&body));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "Jan");
        assert!((rows[0].co2_ppm - 410.0).abs() < f64::EPSILON);
        assert!((rows[0].pm10 - 40.0).abs() < f64::EPSILON);

        let body = json!({"average_emissions_ppm": {"SO2_ppm": 2, "so2_ppm": 5, "nox_ppm": 3}});
        let averages = parse_averages(Some(&body));
        assert!((averages.so2_ppm - 2.0).abs() < f64::EPSILON);
        assert!((averages.nox_ppm - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn monthly_non_array_is_empty() {
        assert!(parse_monthly(Some(&json!({"detail": "missing"}))).is_empty());
        assert!(parse_monthly(None).is_empty());
    }

    #[test]
    fn averages_default_missing_fields_and_clamp_negatives() {
        let body = json!({"average_emissions_ppm": {"CO2_ppm": 410.2, "NOx_ppm": -3, "SO2_ppm": "7.5"}});
        let averages = parse_averages(Some(&body));
        assert!((averages.co2_ppm - 410.2).abs() < f64::EPSILON);
        assert!(averages.nox_ppm.abs() < f64::EPSILON);
        assert!((averages.so2_ppm - 7.5).abs() < f64::EPSILON);
        assert!(averages.ch4_ppm.abs() < f64::EPSILON);

        assert_eq!(parse_averages(Some(&json!({}))), AverageMetrics::default());
    }

    #[test]
    fn hotspots_keep_entries_without_coordinates() {
        let body = json!({"data": [
            {"Mine_Name": "Jharia", "District": "Dhanbad", "State": "Jharkhand",
             "Latitude": 23.75, "Longitude": 86.42, "Hotspot_Level": "Red", "Emission_Score": 91.2},
            {"Mine_Name": "Talcher", "Hotspot_Level": "Purple", "Latitude": "20.95"}
        ]});

        let hotspots = parse_hotspots(Some(&body));
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].coordinates(), Some((23.75, 86.42)));
        assert_eq!(hotspots[1].coordinates(), None);
        assert_eq!(hotspots[1].level, HotspotLevel::Other("Purple".to_string()));
    }

    #[test]
    fn stats_read_levels_and_total() {
        let body = json!({"stats": {
            "Red": {"count": 12, "avgScore": 88.1, "maxScore": 99.0, "minScore": 70.2},
            "Orange": {},
            "Yellow": {"count": "5"},
            "total": 17
        }});

        let stats = parse_hotspot_stats(Some(&body));
        assert_eq!(stats.count(&HotspotLevel::Red), 12);
        assert_eq!(stats.count(&HotspotLevel::Orange), 0);
        assert_eq!(stats.count(&HotspotLevel::Yellow), 5);
        assert_eq!(stats.total, 17);
    }

    #[test]
    fn stats_total_is_recomputed_when_missing() {
        let body = json!({"stats": {"Red": {"count": 2}, "Yellow": {"count": 3}}});
        assert_eq!(parse_hotspot_stats(Some(&body)).total, 5);
    }
}
