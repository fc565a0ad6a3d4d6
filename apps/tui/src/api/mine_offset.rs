//! Per-mine carbon offset plans: the typed record, the lookup call and the
//! suggestions offered when a name is not found.
//!
//! The service has shipped two shapes of the same bundle (`kpis` vs
//! `kpi_metrics`, `tree_plan` vs `detailed_plan`, ...). Both are accepted and
//! land in the same record.

use super::models::{
    lenient, lenient_f64, lenient_f64_list, lenient_string, lenient_string_list,
    prefer_primary_keys,
};
use super::transport::{RawResponse, Transport, TransportError};
use crate::domain::MINE_OFFSETS_PATH;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MineMeta {
    #[serde(deserialize_with = "lenient_string")]
    pub mine_name: String,
    #[serde(alias = "region_state", deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(alias = "region_district", deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(alias = "data_status", deserialize_with = "lenient_string")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OffsetKpis {
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_offset_target_tonnes: f64,
    #[serde(alias = "total_trees_planned_count", deserialize_with = "lenient_f64")]
    pub total_trees_required: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_budget_inr: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub land_required_ha: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub land_available_ha: f64,
    #[serde(alias = "land_status_alert", deserialize_with = "lenient_string")]
    pub land_status: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_offset_achieved: f64,
}

impl OffsetKpis {
    pub fn land_is_critical(&self) -> bool {
        self.land_status.eq_ignore_ascii_case("critical")
            || self.land_required_ha > self.land_available_ha
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreePlanEntry {
    #[serde(deserialize_with = "lenient_f64")]
    pub count: f64,
    #[serde(alias = "cost_inr", deserialize_with = "lenient_f64")]
    pub total_cost: f64,
    #[serde(alias = "asr_per_tree_kg", deserialize_with = "lenient_f64")]
    pub asr_per_tree: f64,
    #[serde(alias = "offset_tonnes", deserialize_with = "lenient_f64")]
    pub offset_contribution_tonnes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WasteToWealth {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_methane_captured_kg: f64,
    #[serde(
        alias = "ethanol_production_potential_liters",
        deserialize_with = "lenient_f64"
    )]
    pub ethanol_production_litres: f64,
    #[serde(alias = "process_water_required_liters", deserialize_with = "lenient_f64")]
    pub water_required_litres: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_revenue_inr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarbonCredits {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_offset_credits_tonnes: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub market_price_per_credit_inr: f64,
    #[serde(alias = "potential_revenue_inr", deserialize_with = "lenient_f64")]
    pub total_revenue_potential_inr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaterConservation {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(
        alias = "total_water_conserved_kiloliters_year",
        deserialize_with = "lenient_f64"
    )]
    pub total_water_conserved_kilolitres: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub water_conserved_per_tree_liters_year: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_trees: f64,
    #[serde(alias = "total_cost_inr", deserialize_with = "lenient_f64")]
    pub total_cost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub offset_tonnes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryGraph {
    #[serde(deserialize_with = "lenient_string_list")]
    pub labels: Vec<String>,
    #[serde(deserialize_with = "lenient_f64_list")]
    pub values: Vec<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendGraph {
    #[serde(deserialize_with = "lenient_string_list")]
    pub x_axis_labels: Vec<String>,
    #[serde(deserialize_with = "lenient_f64_list")]
    pub y_axis_data: Vec<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(deserialize_with = "lenient_string")]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    #[serde(deserialize_with = "lenient_string")]
    pub month_year: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub emission_index: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OffsetGraphs {
    #[serde(rename = "graph_1_financial_mix", deserialize_with = "lenient")]
    pub financial_mix: CategoryGraph,
    #[serde(rename = "graph_2_land_compliance", deserialize_with = "lenient")]
    pub land_compliance: CategoryGraph,
    #[serde(rename = "graph_3_emissions_trend", deserialize_with = "lenient")]
    pub emissions_trend: TrendGraph,
    #[serde(deserialize_with = "lenient")]
    pub monthly_emissions: Vec<TrendPoint>,
}

/// Fully-defaulted offset plan for one mine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MineOffsetRecord {
    #[serde(alias = "mine_metadata", deserialize_with = "lenient")]
    pub meta: MineMeta,
    #[serde(alias = "kpi_metrics", deserialize_with = "lenient")]
    pub kpis: OffsetKpis,
    #[serde(alias = "detailed_plan", deserialize_with = "lenient")]
    pub tree_plan: BTreeMap<String, TreePlanEntry>,
    #[serde(alias = "waste_to_wealth_conversion", deserialize_with = "lenient")]
    pub waste_to_wealth: WasteToWealth,
    #[serde(alias = "carbon_credit_potential", deserialize_with = "lenient")]
    pub carbon_credits: CarbonCredits,
    #[serde(alias = "water_conservation_impact", deserialize_with = "lenient")]
    pub water_conservation: WaterConservation,
    #[serde(deserialize_with = "lenient")]
    pub what_if_scenarios: BTreeMap<String, Scenario>,
    #[serde(deserialize_with = "lenient")]
    pub graphs: OffsetGraphs,
}

pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Alternate key spellings per section, as `(alias, primary)`.
const RECORD_KEYS: &[(&str, &str)] = &[
    ("mine_metadata", "meta"),
    ("kpi_metrics", "kpis"),
    ("detailed_plan", "tree_plan"),
    ("waste_to_wealth_conversion", "waste_to_wealth"),
    ("carbon_credit_potential", "carbon_credits"),
    ("water_conservation_impact", "water_conservation"),
];
const META_KEYS: &[(&str, &str)] = &[
    ("region_state", "state"),
    ("region_district", "district"),
    ("data_status", "status"),
];
const KPI_KEYS: &[(&str, &str)] = &[
    ("total_trees_planned_count", "total_trees_required"),
    ("land_status_alert", "land_status"),
];
const TREE_KEYS: &[(&str, &str)] = &[
    ("cost_inr", "total_cost"),
    ("asr_per_tree_kg", "asr_per_tree"),
    ("offset_tonnes", "offset_contribution_tonnes"),
];
const WASTE_KEYS: &[(&str, &str)] = &[
    ("ethanol_production_potential_liters", "ethanol_production_litres"),
    ("process_water_required_liters", "water_required_litres"),
];
const CREDIT_KEYS: &[(&str, &str)] = &[("potential_revenue_inr", "total_revenue_potential_inr")];
const WATER_KEYS: &[(&str, &str)] = &[(
    "total_water_conserved_kiloliters_year",
    "total_water_conserved_kilolitres",
)];
const SCENARIO_KEYS: &[(&str, &str)] = &[("total_cost_inr", "total_cost")];

/// Rewrites both payload shapes onto one set of keys so a bundle that
/// carries two spellings of a field still deserializes.
fn normalize_keys(value: &mut Value) {
    prefer_primary_keys(value, RECORD_KEYS);
    let Some(sections) = value.as_object_mut() else {
        return;
    };
    for (section, keys) in [
        ("meta", META_KEYS),
        ("kpis", KPI_KEYS),
        ("waste_to_wealth", WASTE_KEYS),
        ("carbon_credits", CREDIT_KEYS),
        ("water_conservation", WATER_KEYS),
    ] {
        if let Some(section) = sections.get_mut(section) {
            prefer_primary_keys(section, keys);
        }
    }
    for (section, keys) in [("tree_plan", TREE_KEYS), ("what_if_scenarios", SCENARIO_KEYS)] {
        if let Some(entries) = sections.get_mut(section).and_then(Value::as_object_mut) {
            for entry in entries.values_mut() {
                prefer_primary_keys(entry, keys);
            }
        }
    }
}

impl MineOffsetRecord {
    pub fn from_value(mut value: Value) -> Self {
        normalize_keys(&mut value);
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Cost split across species, from the graph when present.
    pub fn financial_mix(&self) -> Vec<(String, f64)> {
        let graph = &self.graphs.financial_mix;
        if !graph.labels.is_empty() {
            return graph
                .labels
                .iter()
                .cloned()
                .zip(graph.values.iter().copied().chain(std::iter::repeat(0.0)))
                .collect();
        }
        self.tree_plan
            .iter()
            .map(|(species, entry)| (title_case(species), entry.total_cost))
            .collect()
    }

    /// Required vs available land in hectares.
    pub fn land_compliance(&self) -> Vec<(String, f64)> {
        let graph = &self.graphs.land_compliance;
        if !graph.labels.is_empty() {
            return graph
                .labels
                .iter()
                .cloned()
                .zip(graph.values.iter().copied().chain(std::iter::repeat(0.0)))
                .collect();
        }
        vec![
            ("Required Land".to_string(), self.kpis.land_required_ha),
            ("Available Land".to_string(), self.kpis.land_available_ha),
        ]
    }

    pub fn emissions_trend(&self) -> Vec<(String, f64)> {
        let graph = &self.graphs.emissions_trend;
        if !graph.x_axis_labels.is_empty() {
            return graph
                .x_axis_labels
                .iter()
                .cloned()
                .zip(graph.y_axis_data.iter().copied().chain(std::iter::repeat(0.0)))
                .collect();
        }
        self.graphs
            .monthly_emissions
            .iter()
            .map(|point| (point.month_year.clone(), point.emission_index))
            .collect()
    }

    pub fn scenarios(&self) -> Vec<(String, &Scenario)> {
        self.what_if_scenarios
            .iter()
            .map(|(key, scenario)| {
                let name = key.strip_prefix("scenario_").unwrap_or(key);
                (title_case(name), scenario)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Box<MineOffsetRecord>),
    NotFound {
        message: String,
        /// Names the service offered instead, if any.
        available: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("enter a mine name to search")]
    EmptyQuery,
    #[error("could not reach the emissions API: {0}")]
    Transport(#[from] TransportError),
}

fn available_mines(body: Option<&Value>) -> Vec<String> {
    body.and_then(|body| body.get("available_mines"))
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn not_found(query: &str, response: &RawResponse) -> SearchOutcome {
    let body = response.json();
    let message = body
        .as_ref()
        .and_then(|body| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| response.detail())
        .unwrap_or_else(|| format!("Mine '{query}' not found."));

    SearchOutcome::NotFound {
        message,
        available: available_mines(body.as_ref()),
    }
}

/// Looks up the offset plan for `query`. Blank queries never hit the network.
pub async fn search_mine_offsets(
    transport: &dyn Transport,
    query: &str,
) -> Result<SearchOutcome, SearchError> {
    let name = query.trim();
    if name.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let response = transport
        .get(MINE_OFFSETS_PATH, &[("name", name.to_string())])
        .await?;

    if !response.is_success() {
        warn!(mine = name, status = response.status, "mine offset lookup failed");
        return Ok(not_found(name, &response));
    }

    match response.json() {
        Some(body) if body.is_object() && body.get("error").is_none() => {
            info!(mine = name, "mine offset plan loaded");
            Ok(SearchOutcome::Found(Box::new(MineOffsetRecord::from_value(
                body,
            ))))
        }
        Some(_) => Ok(not_found(name, &response)),
        None => Ok(SearchOutcome::NotFound {
            message: format!("Unexpected response while looking up '{name}'."),
            available: Vec::new(),
        }),
    }
}

/// Best fuzzy matches for `query`, highest score first.
pub fn rank_suggestions<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let query = query.trim();

    let mut scored = candidates
        .into_iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, query)
                .map(|score| (score, candidate))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);

    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubTransport;
    use serde_json::json;

    const LONG_FORM: &str = r#"{
        "meta": {"mine_name": "Gevra", "region_state": "Chhattisgarh", "region_district": "Korba", "data_status": "success"},
        "kpi_metrics": {"annual_offset_target_tonnes": 120000, "total_trees_planned_count": 150000,
                        "estimated_budget_inr": 22500000.5, "land_required_ha": 310.5, "land_available_ha": 250,
                        "land_status_alert": "CRITICAL"},
        "detailed_plan": {"teak": {"count": 40000, "cost_inr": 9000000, "asr_per_tree_kg": 22.5, "offset_tonnes": 900}},
        "waste_to_wealth_conversion": {"ethanol_production_potential_liters": 1400},
        "carbon_credit_potential": {"potential_revenue_inr": 99600000},
        "water_conservation_impact": {"total_water_conserved_kiloliters_year": 225000},
        "what_if_scenarios": {"scenario_low_budget": {"description": "100% Pioneer Mix", "total_cost_inr": 1000, "total_trees": 10}},
        "graphs": {"graph_3_emissions_trend": {"x_axis_labels": ["Jan 24", "Feb 24"], "y_axis_data": [101.5, "oops"]}}
    }"#;

    #[test]
    fn long_form_payload_maps_onto_record() {
        let record = MineOffsetRecord::from_value(serde_json::from_str(LONG_FORM).unwrap());
        assert_eq!(record.meta.mine_name, "Gevra");
        assert_eq!(record.meta.district, "Korba");
        assert!((record.kpis.total_trees_required - 150_000.0).abs() < f64::EPSILON);
        assert!(record.kpis.land_is_critical());
        assert!((record.tree_plan["teak"].total_cost - 9_000_000.0).abs() < f64::EPSILON);
        assert!((record.waste_to_wealth.ethanol_production_litres - 1400.0).abs() < f64::EPSILON);
        assert!((record.carbon_credits.total_revenue_potential_inr - 99_600_000.0).abs() < 1.0);
        assert!(
            (record.water_conservation.total_water_conserved_kilolitres - 225_000.0).abs() < 1.0
        );
        assert_eq!(record.scenarios()[0].0, "Low Budget");
        assert_eq!(
            record.emissions_trend(),
            vec![("Jan 24".to_string(), 101.5), ("Feb 24".to_string(), 0.0)]
        );
        assert_eq!(record.financial_mix(), vec![("Teak".to_string(), 9_000_000.0)]);
    }

    #[test]
    fn short_form_payload_maps_onto_record() {
        let body = json!({
            "mine_metadata": {"mine_name": "Jharia", "district": "Dhanbad", "state": "Jharkhand"},
            "kpis": {"total_trees_required": 1200, "land_required_ha": 1.2, "land_available_ha": 2, "land_status": "Available"},
            "tree_plan": {"pioneer": {"count": 300, "total_cost": 450}},
            "graphs": {"monthly_emissions": [{"month_year": "Jan 24", "emission_index": 100}]}
        });
        let record = MineOffsetRecord::from_value(body);
        assert_eq!(record.meta.state, "Jharkhand");
        assert!(!record.kpis.land_is_critical());
        assert_eq!(record.financial_mix(), vec![("Pioneer".to_string(), 450.0)]);
        assert_eq!(record.emissions_trend(), vec![("Jan 24".to_string(), 100.0)]);
        assert_eq!(record.land_compliance()[1], ("Available Land".to_string(), 2.0));
    }

    #[test]
    fn payload_with_both_key_styles_keeps_every_section() {
        let body = json!({
            "meta": {"mine_name": "Gevra", "state": "Chhattisgarh", "region_state": "CG"},
            "mine_metadata": {"mine_name": "Ignored"},
            "kpis": {"total_trees_required": 1200, "total_trees_planned_count": 99},
            "kpi_metrics": {"total_trees_required": 5},
            "detailed_plan": {"teak": {"total_cost": 450, "cost_inr": 1, "offset_tonnes": 12}},
            "what_if_scenarios": {"scenario_fast": {"total_cost": 10, "total_cost_inr": 20}}
        });
        let record = MineOffsetRecord::from_value(body);
        assert_eq!(record.meta.mine_name, "Gevra");
        assert_eq!(record.meta.state, "Chhattisgarh");
        assert!((record.kpis.total_trees_required - 1200.0).abs() < f64::EPSILON);
        assert!((record.tree_plan["teak"].total_cost - 450.0).abs() < f64::EPSILON);
        assert!(
            (record.tree_plan["teak"].offset_contribution_tonnes - 12.0).abs() < f64::EPSILON
        );
        assert!((record.what_if_scenarios["scenario_fast"].total_cost - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_sections_default() {
        let record = MineOffsetRecord::from_value(json!({"kpis": "nope", "tree_plan": [1, 2]}));
        assert_eq!(record, MineOffsetRecord::default());
    }

    #[tokio::test]
    async fn blank_query_sends_nothing() {
        let transport = StubTransport::new();
        let result = search_mine_offsets(&transport, "   ").await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn found_plan_is_returned() {
        let transport =
            StubTransport::new().respond("/api/v1/emissions/mine-offsets?name=Gevra", 200, LONG_FORM);
        let outcome = search_mine_offsets(&transport, "  Gevra ").await.unwrap();
        let SearchOutcome::Found(record) = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(record.meta.mine_name, "Gevra");
    }

    #[tokio::test]
    async fn error_body_is_not_found_with_alternatives() {
        let transport = StubTransport::new().respond(
            "/api/v1/emissions/mine-offsets?name=Gevr",
            200,
            r#"{"error": "Mine 'Gevr' not found.", "available_mines": ["Gevra", "Dipka"]}"#,
        );
        let outcome = search_mine_offsets(&transport, "Gevr").await.unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::NotFound {
                message: "Mine 'Gevr' not found.".to_string(),
                available: vec!["Gevra".to_string(), "Dipka".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn error_status_is_not_found() {
        let transport = StubTransport::new().respond(
            "/api/v1/emissions/mine-offsets?name=X",
            404,
            r#"{"detail": "No such mine"}"#,
        );
        let outcome = search_mine_offsets(&transport, "X").await.unwrap();
        assert!(matches!(
            outcome,
            SearchOutcome::NotFound { ref message, .. } if message == "No such mine"
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let transport = StubTransport::new();
        assert!(matches!(
            search_mine_offsets(&transport, "Gevra").await,
            Err(SearchError::Transport(_))
        ));
    }

    #[test]
    fn suggestions_rank_closest_first() {
        let candidates = ["Dipka", "Gevra", "Gevra OC", "Kusmunda", "Gevra"];
        let ranked = rank_suggestions("gevra", candidates, MAX_SUGGESTIONS);
        assert_eq!(ranked.first().map(String::as_str), Some("Gevra"));
        assert!(ranked.contains(&"Gevra OC".to_string()));
        assert!(!ranked.contains(&"Kusmunda".to_string()));
        assert_eq!(ranked.iter().filter(|n| *n == "Gevra").count(), 1);
    }
}
