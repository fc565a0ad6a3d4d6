use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

use crate::app::{App, UploadStatus};
use crate::cli::CliArgs;
use crate::domain::HotspotLevel;
use crate::metrics::{format_number, summarize, PieSlice, SeriesSummary};

const TOP_HOTSPOTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub updated_at: Option<String>,
    pub failed_endpoints: Vec<String>,
    pub error: Option<String>,
    pub upload: Option<String>,
    pub co2: Option<SeriesSummary>,
    pub ch4: Option<SeriesSummary>,
    pub breakdown: Vec<PieSlice>,
    pub hotspot_total: u64,
    pub hotspots_by_level: Vec<(String, u64)>,
    pub hotspots_on_map: usize,
    pub top_hotspots: Vec<HeadlessHotspot>,
    pub mine: Option<HeadlessMine>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessHotspot {
    pub mine_name: String,
    pub district: String,
    pub state: String,
    pub level: String,
    pub emission_score: f64,
}

#[derive(Debug, Serialize)]
pub struct HeadlessMine {
    pub query: String,
    pub found: bool,
    pub message: Option<String>,
    pub suggestions: Vec<String>,
    pub mine_name: Option<String>,
    pub annual_offset_target_tonnes: Option<f64>,
    pub total_trees_required: Option<f64>,
    pub estimated_budget_inr: Option<f64>,
    pub land_critical: Option<bool>,
}

/// Loads everything the flags ask for, then prints a report and exits.
pub async fn run_headless(app: &mut App, args: &CliArgs) -> Result<()> {
    if let Some(path) = &args.upload {
        info!(path = %path.display(), "uploading summary CSV");
        app.upload_input = path.display().to_string();
        app.submit_upload();
        app.settle().await;
    }

    // A successful upload already triggered a refresh.
    if !matches!(app.upload, UploadStatus::Success(_)) {
        app.refresh();
        app.settle().await;
    }

    if let Some(mine) = &args.mine {
        app.mine_offset.query.clone_from(mine);
        app.submit_search();
        app.settle().await;
    }

    let report = build_report(app, args.mine.as_deref());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    if app.overview.snapshot.is_none() {
        return Err(eyre!(
            "could not load dashboard data: {}",
            report.error.as_deref().unwrap_or("no response")
        ));
    }
    Ok(())
}

pub fn build_report(app: &App, mine_query: Option<&str>) -> HeadlessReport {
    let mut report = HeadlessReport {
        updated_at: app.overview.last_updated.map(|at| at.to_rfc3339()),
        failed_endpoints: Vec::new(),
        error: app.overview.error.clone(),
        upload: app.upload.message().map(str::to_string),
        co2: None,
        ch4: None,
        breakdown: Vec::new(),
        hotspot_total: 0,
        hotspots_by_level: Vec::new(),
        hotspots_on_map: app.map.markers().len(),
        top_hotspots: Vec::new(),
        mine: mine_query.map(|query| mine_report(app, query)),
    };

    let Some(snapshot) = &app.overview.snapshot else {
        return report;
    };

    report.failed_endpoints = snapshot
        .failed
        .iter()
        .map(|endpoint| endpoint.label().to_string())
        .collect();
    report.co2 = summarize(&snapshot.series.co2);
    report.ch4 = summarize(&snapshot.series.ch4);
    report.breakdown.clone_from(&snapshot.breakdown);
    report.hotspot_total = snapshot.stats.total;
    report.hotspots_by_level = HotspotLevel::known()
        .iter()
        .map(|level| (level.to_string(), snapshot.stats.count(level)))
        .collect();

    let mut ranked = snapshot.hotspots.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.emission_score.total_cmp(&a.emission_score));
    report.top_hotspots = ranked
        .into_iter()
        .take(TOP_HOTSPOTS)
        .map(|hotspot| HeadlessHotspot {
            mine_name: hotspot.mine_name.clone(),
            district: hotspot.district.clone(),
            state: hotspot.state.clone(),
            level: hotspot.level.to_string(),
            emission_score: hotspot.emission_score,
        })
        .collect();

    report
}

fn mine_report(app: &App, query: &str) -> HeadlessMine {
    let state = &app.mine_offset;
    let record = state.record.as_deref();
    HeadlessMine {
        query: query.to_string(),
        found: record.is_some(),
        message: state.error.clone(),
        suggestions: state.suggestions.clone(),
        mine_name: record.map(|r| r.meta.mine_name.clone()),
        annual_offset_target_tonnes: record.map(|r| r.kpis.annual_offset_target_tonnes),
        total_trees_required: record.map(|r| r.kpis.total_trees_required),
        estimated_budget_inr: record.map(|r| r.kpis.estimated_budget_inr),
        land_critical: record.map(|r| r.kpis.land_is_critical()),
    }
}

fn summary_line(out: &mut String, label: &str, summary: Option<&SeriesSummary>) {
    match summary {
        Some(s) => {
            let _ = writeln!(
                out,
                "{label}: mean {} ppm, range {} to {}, peak in {}",
                format_number(s.mean, 2),
                format_number(s.min, 2),
                format_number(s.max, 2),
                s.peak_month
            );
        }
        None => {
            let _ = writeln!(out, "{label}: no data");
        }
    }
}

pub fn render_text(report: &HeadlessReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nCoal Mine Emissions");
    let _ = writeln!(out, "===================");
    if let Some(at) = &report.updated_at {
        let _ = writeln!(out, "Updated: {at}");
    }
    if let Some(error) = &report.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if !report.failed_endpoints.is_empty() {
        let _ = writeln!(out, "Unavailable: {}", report.failed_endpoints.join(", "));
    }
    if let Some(upload) = &report.upload {
        let _ = writeln!(out, "Upload: {upload}");
    }

    let _ = writeln!(out);
    summary_line(&mut out, "CO₂", report.co2.as_ref());
    summary_line(&mut out, "CH₄", report.ch4.as_ref());

    if !report.breakdown.is_empty() {
        let _ = writeln!(out, "\nPollutant Breakdown:");
        for slice in &report.breakdown {
            let _ = writeln!(
                out,
                "- {}: {} ({}%)",
                slice.name,
                format_number(slice.actual, 2),
                format_number(slice.value, 1)
            );
        }
    }

    let _ = writeln!(
        out,
        "\nHotspots: {} total, {} on map",
        report.hotspot_total, report.hotspots_on_map
    );
    for (level, count) in &report.hotspots_by_level {
        let _ = writeln!(out, "- {level}: {count}");
    }

    if !report.top_hotspots.is_empty() {
        let _ = writeln!(out, "\nTop Hotspots:");
        for hotspot in &report.top_hotspots {
            let _ = writeln!(
                out,
                "- {} | {}, {} | {} | {}",
                hotspot.mine_name,
                hotspot.district,
                hotspot.state,
                hotspot.level,
                format_number(hotspot.emission_score, 2)
            );
        }
    }

    if let Some(mine) = &report.mine {
        let _ = writeln!(out, "\nOffset Plan for \"{}\":", mine.query);
        if mine.found {
            let _ = writeln!(
                out,
                "- Mine: {}",
                mine.mine_name.as_deref().unwrap_or_default()
            );
            let _ = writeln!(
                out,
                "- Offset target: {} t/yr",
                format_number(mine.annual_offset_target_tonnes.unwrap_or_default(), 0)
            );
            let _ = writeln!(
                out,
                "- Trees required: {}",
                format_number(mine.total_trees_required.unwrap_or_default(), 0)
            );
            let _ = writeln!(
                out,
                "- Budget: ₹{}",
                format_number(mine.estimated_budget_inr.unwrap_or_default(), 0)
            );
            if mine.land_critical == Some(true) {
                let _ = writeln!(out, "- Land: CRITICAL deficit");
            }
        } else {
            let _ = writeln!(out, "- {}", mine.message.as_deref().unwrap_or("Not found"));
            if !mine.suggestions.is_empty() {
                let _ = writeln!(out, "- Did you mean: {}", mine.suggestions.join(", "));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{StubGeocoder, StubTransport};
    use crate::app::Services;
    use clap::Parser;
    use std::sync::Arc;

    fn stub() -> StubTransport {
        StubTransport::new()
            .respond(
                "/api/v1/emissions/monthly/",
                200,
                r#"[{"month": "Jan", "CO2_ppm": 410}, {"month": "Feb", "CO2_ppm": 430}]"#,
            )
            .respond(
                "/api/v1/emissions/average/",
                200,
                r#"{"average_emissions_ppm": {"CO2_ppm": 300, "CH4_ppm": 100}}"#,
            )
            .respond(
                "/api/v1/hotspots?limit=10",
                200,
                r#"{"data": [
                    {"Mine_Name": "Dipka", "Latitude": 22.3, "Longitude": 82.5, "Hotspot_Level": "Orange", "Emission_Score": 40},
                    {"Mine_Name": "Gevra", "Latitude": 22.33, "Longitude": 82.55, "Hotspot_Level": "Red", "Emission_Score": 90}
                ]}"#,
            )
            .respond(
                "/api/v1/hotspots/stats",
                200,
                r#"{"stats": {"Red": {"count": 1}, "Orange": {"count": 1}}}"#,
            )
            .respond(
                "/api/v1/emissions/mine-offsets?name=Gevra",
                200,
                r#"{"meta": {"mine_name": "Gevra"}, "kpis": {"total_trees_required": 1500}}"#,
            )
    }

    fn app(api: StubTransport) -> App {
        let services = Services {
            api: Arc::new(api),
            geocoder: Arc::new(StubGeocoder::failing()),
        };
        App::with_services(services, 10)
    }

    #[tokio::test]
    async fn report_covers_overview_and_mine() {
        let mut app = app(stub());
        let args = CliArgs::parse_from(["emissions-dashboard", "--mine", "Gevra", "--json"]);
        run_headless(&mut app, &args).await.unwrap();

        let report = build_report(&app, Some("Gevra"));
        assert_eq!(report.hotspot_total, 2);
        assert_eq!(report.top_hotspots[0].mine_name, "Gevra");
        assert_eq!(report.breakdown[0].value, 75.0);
        assert_eq!(report.co2.as_ref().unwrap().peak_month, "Feb");

        let mine = report.mine.as_ref().unwrap();
        assert!(mine.found);
        assert_eq!(mine.total_trees_required, Some(1500.0));

        let text = render_text(&report);
        assert!(text.contains("- Red: 1"));
        assert!(text.contains("Trees required: 1,500"));
    }

    #[tokio::test]
    async fn total_outage_is_an_error() {
        let mut app = app(StubTransport::new());
        let args = CliArgs::parse_from(["emissions-dashboard", "--headless"]);
        assert!(run_headless(&mut app, &args).await.is_err());
        assert!(render_text(&build_report(&app, None)).contains("Error:"));
    }
}
