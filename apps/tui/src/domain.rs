use ratatui::style::Color;

/// Severity classification attached to each hotspot by the upstream service.
///
/// Unknown strings are kept verbatim in `Other` so a new level never breaks
/// parsing or rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HotspotLevel {
    Red,
    Orange,
    Yellow,
    Other(String),
}

impl HotspotLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "red" => Self::Red,
            "orange" => Self::Orange,
            "yellow" => Self::Yellow,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Other(value) => value.as_str(),
        }
    }

    pub const fn known() -> [Self; 3] {
        [Self::Red, Self::Orange, Self::Yellow]
    }

    pub const fn color(&self) -> Color {
        match self {
            Self::Red => Color::Rgb(239, 68, 68),
            Self::Orange => Color::Rgb(249, 115, 22),
            Self::Yellow => Color::Rgb(234, 179, 8),
            Self::Other(_) => Color::Gray,
        }
    }

    /// Marker radius in map canvas units. Strictly decreasing Red > Orange > Yellow.
    pub const fn marker_size(&self) -> f64 {
        match self {
            Self::Red => 0.9,
            Self::Orange => 0.65,
            Self::Yellow | Self::Other(_) => 0.4,
        }
    }
}

impl Default for HotspotLevel {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl std::fmt::Display for HotspotLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six pollutant categories reported by the averages endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Co2,
    Ch4,
    Pm10,
    Pm25,
    Nox,
    So2,
}

impl Pollutant {
    pub const ALL: [Self; 6] = [
        Self::Co2,
        Self::Ch4,
        Self::Pm10,
        Self::Pm25,
        Self::Nox,
        Self::So2,
    ];


    pub const fn label(self) -> &'static str {
        match self {
            Self::Co2 => "CO₂",
            Self::Ch4 => "CH₄",
            Self::Pm10 => "PM10",
            Self::Pm25 => "PM2.5",
            Self::Nox => "NOₓ",
            Self::So2 => "SO₂",
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::Co2 => Color::Rgb(59, 130, 246),
            Self::Ch4 => Color::Rgb(139, 92, 246),
            Self::Pm10 => Color::Rgb(16, 185, 129),
            Self::Pm25 => Color::Rgb(245, 158, 11),
            Self::Nox => Color::Rgb(236, 72, 153),
            Self::So2 => Color::Rgb(45, 212, 191),
        }
    }
}

/// The four read endpoints that make up one overview refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Monthly,
    Averages,
    Hotspots,
    HotspotStats,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Monthly => "/api/v1/emissions/monthly/",
            Self::Averages => "/api/v1/emissions/average/",
            Self::Hotspots => "/api/v1/hotspots",
            Self::HotspotStats => "/api/v1/hotspots/stats",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "monthly series",
            Self::Averages => "averages",
            Self::Hotspots => "hotspots",
            Self::HotspotStats => "hotspot stats",
        }
    }
}

pub const MINE_OFFSETS_PATH: &str = "/api/v1/emissions/mine-offsets";
pub const UPLOAD_PATH: &str = "/api/v1/emissions/upload/";
