use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_HOTSPOT_LIMIT: usize = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOG_FILE: &str = "emissions-dashboard.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub geocoder_url: String,
    pub hotspot_limit: usize,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
    pub debug: bool,
    /// Settings that fell back to a default, reported once logging is up.
    pub warnings: Vec<String>,
}

/// Loads `.env` and reads the configuration from the process environment.
pub fn init_app_config() -> Result<AppConfig> {
    dotenv().ok();
    AppConfig::from_lookup(|key| env::var(key).ok())
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("{key}={raw:?} is not valid, using the default"));
            default
        }),
        None => default,
    }
}

fn validate_url(key: &str, value: String) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/').to_string();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed)
    } else {
        Err(eyre!("{key} must be an http(s) URL, got {value:?}"))
    }
}

impl AppConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = validate_url(
            "EMISSIONS_API_URL",
            lookup("EMISSIONS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let geocoder_url = validate_url(
            "GEOCODER_URL",
            lookup("GEOCODER_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
        )?;

        let mut warnings = Vec::new();
        let hotspot_limit =
            parse_or(&lookup, "HOTSPOT_LIMIT", DEFAULT_HOTSPOT_LIMIT, &mut warnings).max(1);
        let timeout_secs =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, &mut warnings).max(1);
        let log_file = lookup("LOG_FILE")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);
        let debug = lookup("DEBUG").is_some_and(|flag| matches!(flag.trim(), "1" | "true"));

        Ok(Self {
            api_url,
            geocoder_url,
            hotspot_limit,
            request_timeout: Duration::from_secs(timeout_secs),
            log_file,
            debug,
            warnings,
        })
    }

    /// Emits the fallback notices collected while parsing.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }
}
