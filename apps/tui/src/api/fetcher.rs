use super::models::{
    parse_averages, parse_hotspot_stats, parse_hotspots, parse_monthly, AverageMetrics, Hotspot,
    HotspotStats, MonthlyRecord,
};
use super::transport::{Transport, TransportError};
use crate::domain::Endpoint;
use crate::metrics::{chart_series, pollutant_breakdown, ChartSeries, PieSlice};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

/// Everything one overview refresh produced.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub monthly: Vec<MonthlyRecord>,
    pub averages: AverageMetrics,
    pub hotspots: Vec<Hotspot>,
    pub stats: HotspotStats,
    pub series: ChartSeries,
    pub breakdown: Vec<PieSlice>,
    /// Endpoints whose slot holds defaults because the request failed.
    pub failed: Vec<Endpoint>,
}

impl DashboardSnapshot {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("emissions API unreachable: {0}")]
    Unreachable(#[source] TransportError),
}

enum Slot {
    Body(Value),
    Failed,
    Unreachable(TransportError),
}

impl Slot {
    fn body(&self) -> Option<&Value> {
        match self {
            Self::Body(value) => Some(value),
            Self::Failed | Self::Unreachable(_) => None,
        }
    }

    const fn ok(&self) -> bool {
        matches!(self, Self::Body(_))
    }
}

async fn fetch_slot(
    transport: &dyn Transport,
    endpoint: Endpoint,
    query: &[(&str, String)],
) -> Slot {
    match transport.get(endpoint.path(), query).await {
        Ok(response) if response.is_success() => match response.json() {
            Some(body) => Slot::Body(body),
            None => {
                warn!(endpoint = endpoint.label(), "response was not valid JSON");
                Slot::Failed
            }
        },
        Ok(response) => {
            warn!(
                endpoint = endpoint.label(),
                status = response.status,
                "endpoint returned an error status"
            );
            Slot::Failed
        }
        Err(e) => {
            warn!(endpoint = endpoint.label(), "request failed: {e}");
            Slot::Unreachable(e)
        }
    }
}

/// Fetches the four overview endpoints concurrently.
///
/// Each endpoint is isolated: a failure only defaults its own slot. The call
/// fails as a whole only when no endpoint could be reached at all.
pub async fn fetch_dashboard(
    transport: &dyn Transport,
    hotspot_limit: usize,
) -> Result<DashboardSnapshot, FetchError> {
    let none: [(&str, String); 0] = [];
    let limit = [("limit", hotspot_limit.to_string())];
    let (monthly, averages, hotspots, stats) = tokio::join!(
        fetch_slot(transport, Endpoint::Monthly, &none),
        fetch_slot(transport, Endpoint::Averages, &none),
        fetch_slot(transport, Endpoint::Hotspots, &limit),
        fetch_slot(transport, Endpoint::HotspotStats, &none),
    );

    let slots = [
        (Endpoint::Monthly, monthly),
        (Endpoint::Averages, averages),
        (Endpoint::Hotspots, hotspots),
        (Endpoint::HotspotStats, stats),
    ];

    let unreachable = slots
        .iter()
        .filter_map(|(_, slot)| match slot {
            Slot::Unreachable(e) => Some(e),
            Slot::Body(_) | Slot::Failed => None,
        })
        .collect::<Vec<_>>();
    if unreachable.len() == slots.len() {
        if let Some(e) = unreachable.first() {
            return Err(FetchError::Unreachable((*e).clone()));
        }
    }

    let failed = slots
        .iter()
        .filter(|(_, slot)| !slot.ok())
        .map(|(endpoint, _)| *endpoint)
        .collect::<Vec<_>>();

    let [(_, monthly), (_, averages), (_, hotspots), (_, stats)] = &slots;
    let monthly = parse_monthly(monthly.body());
    let averages = parse_averages(averages.body());

    let snapshot = DashboardSnapshot {
        series: chart_series(&monthly),
        breakdown: pollutant_breakdown(&averages),
        monthly,
        averages,
        hotspots: parse_hotspots(hotspots.body()),
        stats: parse_hotspot_stats(stats.body()),
        failed,
    };

    info!(
        months = snapshot.monthly.len(),
        hotspots = snapshot.hotspots.len(),
        failed = snapshot.failed.len(),
        "dashboard data refreshed"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubTransport;
    use crate::domain::HotspotLevel;

    const MONTHLY: &str = r#"[{"month": "Jan", "CO2_ppm": 410.5, "CH4_ppm": 1.9, "PM10": 80, "PM2_5": 35},
                              {"month": "Feb", "CO2_ppm": 415.25, "CH4_ppm": 2.1, "PM10": 75, "PM2_5": 30}]"#;
    const AVERAGES: &str = r#"{"average_emissions_ppm": {"CO2_ppm": 400, "CH4_ppm": 2, "PM10": 60, "PM2_5": 30, "NOx_ppm": 5, "SO2_ppm": 3}}"#;
    const HOTSPOTS: &str = r#"{"data": [{"Mine_Name": "Jharia", "Latitude": 23.75, "Longitude": 86.42, "Hotspot_Level": "Red", "Emission_Score": 91.2}]}"#;
    const STATS: &str = r#"{"stats": {"Red": {"count": 1}, "Orange": {}, "Yellow": {"count": 0}, "total": 1}}"#;

    fn healthy() -> StubTransport {
        StubTransport::new()
            .respond("/api/v1/emissions/monthly/", 200, MONTHLY)
            .respond("/api/v1/emissions/average/", 200, AVERAGES)
            .respond("/api/v1/hotspots?limit=1000", 200, HOTSPOTS)
            .respond("/api/v1/hotspots/stats", 200, STATS)
    }

    #[tokio::test]
    async fn consolidates_all_four_endpoints() {
        let transport = healthy();
        let snapshot = fetch_dashboard(&transport, 1000).await.unwrap();

        assert_eq!(snapshot.monthly.len(), 2);
        assert_eq!(snapshot.series.co2[1].value, 415.25);
        assert_eq!(snapshot.breakdown.len(), 6);
        assert_eq!(snapshot.hotspots[0].level, HotspotLevel::Red);
        assert_eq!(snapshot.stats.count(&HotspotLevel::Red), 1);
        assert!(!snapshot.is_partial());
        assert_eq!(transport.calls().len(), 4);
    }

    #[tokio::test]
    async fn one_failing_endpoint_only_defaults_its_slot() {
        let transport = healthy().respond("/api/v1/emissions/average/", 500, "boom");
        let snapshot = fetch_dashboard(&transport, 1000).await.unwrap();

        assert_eq!(snapshot.failed, vec![Endpoint::Averages]);
        assert_eq!(snapshot.averages, AverageMetrics::default());
        assert!(snapshot.breakdown.is_empty());
        assert_eq!(snapshot.monthly.len(), 2);
        assert_eq!(snapshot.hotspots.len(), 1);
        assert_eq!(snapshot.stats.total, 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_isolated_too() {
        let transport = healthy().unreachable("/api/v1/hotspots?limit=1000");
        let snapshot = fetch_dashboard(&transport, 1000).await.unwrap();

        assert_eq!(snapshot.failed, vec![Endpoint::Hotspots]);
        assert!(snapshot.hotspots.is_empty());
        assert_eq!(snapshot.monthly.len(), 2);
    }

    #[tokio::test]
    async fn invalid_json_counts_as_failure() {
        let transport = healthy().respond("/api/v1/emissions/monthly/", 200, "<html>");
        let snapshot = fetch_dashboard(&transport, 1000).await.unwrap();
        assert_eq!(snapshot.failed, vec![Endpoint::Monthly]);
        assert!(snapshot.series.co2.is_empty());
        assert!(snapshot.series.particulates.is_empty());
    }

    #[tokio::test]
    async fn everything_unreachable_is_an_error() {
        let transport = StubTransport::new();
        assert!(matches!(
            fetch_dashboard(&transport, 50).await,
            Err(FetchError::Unreachable(_))
        ));
        assert!(transport
            .calls()
            .contains(&"/api/v1/hotspots?limit=50".to_string()));
    }
}
