use crate::api::geocode::GeocodeResult;
use crate::api::models::Hotspot;
use crate::domain::HotspotLevel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance in degrees. Good enough for picking the nearest marker.
    pub fn distance(self, other: Self) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

/// Geographic centre of India, used before anything has been selected.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(22.9734, 78.6569);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Default,
    MapClick,
    Hotspot,
}

/// The one location the overview's detail card describes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLocation {
    pub lat: String,
    pub lng: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub level: Option<HotspotLevel>,
    pub emission: Option<f64>,
    pub source: SelectionSource,
}

fn coordinate(value: f64) -> String {
    format!("{value:.4}")
}

impl Default for SelectedLocation {
    fn default() -> Self {
        Self {
            lat: coordinate(DEFAULT_CENTER.lat),
            lng: coordinate(DEFAULT_CENTER.lng),
            name: "Central India".to_string(),
            district: "Madhya Pradesh".to_string(),
            state: "Madhya Pradesh".to_string(),
            country: "India".to_string(),
            level: None,
            emission: None,
            source: SelectionSource::Default,
        }
    }
}

impl SelectedLocation {
    /// Placeholder shown while the reverse lookup for a click is running.
    pub fn locating(point: GeoPoint) -> Self {
        Self {
            lat: coordinate(point.lat),
            lng: coordinate(point.lng),
            name: "Locating...".to_string(),
            district: String::new(),
            state: String::new(),
            country: String::new(),
            level: None,
            emission: None,
            source: SelectionSource::MapClick,
        }
    }

    pub fn from_geocode(point: GeoPoint, result: &GeocodeResult) -> Self {
        Self {
            name: result.place_name(),
            district: result.district(),
            state: result.state(),
            country: result.country(),
            ..Self::locating(point)
        }
    }

    pub fn geocode_failed(point: GeoPoint) -> Self {
        Self {
            name: "Selected Area".to_string(),
            district: "Unknown".to_string(),
            state: "Unknown".to_string(),
            country: "India".to_string(),
            ..Self::locating(point)
        }
    }

    pub fn from_hotspot(point: GeoPoint, hotspot: &Hotspot) -> Self {
        Self {
            lat: coordinate(point.lat),
            lng: coordinate(point.lng),
            name: hotspot.mine_name.clone(),
            district: hotspot.district.clone(),
            state: hotspot.state.clone(),
            country: "India".to_string(),
            level: Some(hotspot.level.clone()),
            emission: Some(hotspot.emission_score),
            source: SelectionSource::Hotspot,
        }
    }
}
