//! Chart-ready series and percentage breakdowns derived from the raw rows.

use crate::api::models::{AverageMetrics, MonthlyRecord};
use crate::domain::Pollutant;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticulatePoint {
    pub month: String,
    pub pm10: f64,
    pub pm2_5: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub co2: Vec<SeriesPoint>,
    pub ch4: Vec<SeriesPoint>,
    pub particulates: Vec<ParticulatePoint>,
}

/// One category of the pollutant breakdown. `value` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub actual: f64,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn chart_series(rows: &[MonthlyRecord]) -> ChartSeries {
    let point = |row: &MonthlyRecord, value: f64| SeriesPoint {
        month: row.month.clone(),
        value: round_to(value, 2),
    };

    ChartSeries {
        co2: rows.iter().map(|row| point(row, row.co2_ppm)).collect(),
        ch4: rows.iter().map(|row| point(row, row.ch4_ppm)).collect(),
        particulates: rows
            .iter()
            .map(|row| ParticulatePoint {
                month: row.month.clone(),
                pm10: round_to(row.pm10, 2),
                pm2_5: round_to(row.pm2_5, 2),
            })
            .collect(),
    }
}

/// Share of `metric` in `total`, in percent with one decimal. Zero total is 0.
pub fn share(metric: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    round_to(metric / total * 100.0, 1)
}

pub fn pollutant_breakdown(averages: &AverageMetrics) -> Vec<PieSlice> {
    let total: f64 = Pollutant::ALL
        .iter()
        .map(|p| averages.get(*p).max(0.0))
        .sum();

    Pollutant::ALL
        .iter()
        .filter_map(|pollutant| {
            let actual = averages.get(*pollutant);
            (actual > 0.0).then(|| PieSlice {
                name: pollutant.label().to_string(),
                value: share(actual, total),
                actual,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub peak_month: String,
}

pub fn summarize(points: &[SeriesPoint]) -> Option<SeriesSummary> {
    let first = points.first()?;
    let mut summary = SeriesSummary {
        min: first.value,
        max: first.value,
        mean: 0.0,
        peak_month: first.month.clone(),
    };

    let mut sum = 0.0;
    for point in points {
        sum += point.value;
        summary.min = summary.min.min(point.value);
        if point.value > summary.max {
            summary.max = point.value;
            summary.peak_month.clone_from(&point.month);
        }
    }
    summary.mean = round_to(sum / points.len() as f64, 2);
    Some(summary)
}

/// `1234567.891` -> `1,234,567.89`.
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages(values: [f64; 6]) -> AverageMetrics {
        AverageMetrics {
            co2_ppm: values[0],
            ch4_ppm: values[1],
            pm10: values[2],
            pm2_5: values[3],
            nox_ppm: values[4],
            so2_ppm: values[5],
        }
    }

    #[test]
    fn breakdown_sums_to_one_hundred() {
        // Deterministic sweep over varied magnitudes, including zeros.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            let mut values = [0.0; 6];
            for value in &mut values {
                seed = seed
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let raw = (seed >> 33) % 100_000;
                *value = if raw % 7 == 0 { 0.0 } else { raw as f64 / 37.0 };
            }
            if values.iter().all(|v| *v == 0.0) {
                continue;
            }

            let slices = pollutant_breakdown(&averages(values));
            let sum: f64 = slices.iter().map(|s| s.value).sum();
            assert!((sum - 100.0).abs() <= 0.5, "sum {sum} for {values:?}");
        }
    }

    #[test]
    fn all_zero_averages_give_no_slices() {
        let slices = pollutant_breakdown(&AverageMetrics::default());
        assert!(slices.is_empty());
        assert_eq!(share(5.0, 0.0), 0.0);
    }

    #[test]
    fn zero_categories_are_excluded() {
        let slices = pollutant_breakdown(&averages([400.0, 0.0, 100.0, 0.0, 0.0, 0.0]));
        let names: Vec<_> = slices.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CO₂", "PM10"]);
        assert_eq!(slices[0].value, 80.0);
        assert_eq!(slices[1].value, 20.0);
        assert!(slices.iter().all(|s| s.actual > 0.0));
    }

    #[test]
    fn series_round_to_two_decimals() {
        let rows = vec![MonthlyRecord {
            month: "Jan".into(),
            co2_ppm: 412.3456,
            ch4_ppm: 1.899,
            pm10: 80.005,
            pm2_5: 33.333,
        }];
        let series = chart_series(&rows);
        assert_eq!(series.co2[0].value, 412.35);
        assert_eq!(series.ch4[0].value, 1.9);
        assert_eq!(series.particulates[0].pm2_5, 33.33);
        assert_eq!(series.particulates[0].month, "Jan");
    }

    #[test]
    fn summary_tracks_peak_month() {
        let points = vec![
            SeriesPoint { month: "Jan".into(), value: 2.0 },
            SeriesPoint { month: "Feb".into(), value: 6.0 },
            SeriesPoint { month: "Mar".into(), value: 1.0 },
        ];
        let summary = summarize(&points).unwrap();
        assert_eq!(summary.peak_month, "Feb");
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.mean, 3.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(-4500.0, 0), "-4,500");
        assert_eq!(format_number(0.0, 1), "0.0");
    }
}
