use super::transport::TransportError;
use crate::map::GeoPoint;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocodeAddress {
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub state_district: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocodeResult {
    pub address: GeocodeAddress,
    pub display_name: Option<String>,
    /// Set by Nominatim, with a 200 status, for points it cannot place.
    pub error: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl GeocodeResult {
    /// Turns an in-body `error` answer into a decode failure.
    pub fn found(mut self, url: &str) -> Result<Self, TransportError> {
        match self.error.take() {
            Some(message) => Err(TransportError::Decode {
                url: url.to_string(),
                message,
            }),
            None => Ok(self),
        }
    }

    /// Most specific place name available.
    pub fn place_name(&self) -> String {
        let address = &self.address;
        non_blank(address.village.as_ref())
            .or_else(|| non_blank(address.town.as_ref()))
            .or_else(|| non_blank(address.city.as_ref()))
            .or_else(|| {
                self.display_name
                    .as_deref()
                    .and_then(|name| name.split(',').next())
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
            })
            .unwrap_or("Unknown Location")
            .to_string()
    }

    pub fn district(&self) -> String {
        non_blank(self.address.state_district.as_ref())
            .or_else(|| non_blank(self.address.county.as_ref()))
            .unwrap_or("Unknown")
            .to_string()
    }

    pub fn state(&self) -> String {
        non_blank(self.address.state.as_ref())
            .unwrap_or("Unknown")
            .to_string()
    }

    pub fn country(&self) -> String {
        non_blank(self.address.country.as_ref())
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, TransportError>;
}

/// Nominatim-compatible `/reverse` lookups.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, TransportError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(%url, lat = point.lat, lng = point.lng, "reverse geocode");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.lat.to_string()),
                ("lon", point.lng.to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<GeocodeResult>()
            .await
            .map_err(|e| TransportError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?
            .found(&url)
    }
}
