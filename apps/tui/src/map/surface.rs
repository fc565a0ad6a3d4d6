use super::location::GeoPoint;
use crate::domain::HotspotLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct HotspotMarker {
    /// Position of the source entry in the full hotspot list.
    pub hotspot: usize,
    pub point: GeoPoint,
    pub level: HotspotLevel,
    pub label: String,
}

/// What the map controller needs from whatever draws the map.
pub trait MapSurface {
    fn initialize(&mut self, center: GeoPoint);
    fn set_hotspots(&mut self, markers: &[HotspotMarker]);
    fn set_click_marker(&mut self, point: Option<GeoPoint>);
    fn set_highlight(&mut self, marker: Option<usize>);
    fn set_cursor(&mut self, point: GeoPoint);
}

/// Retained drawing state for the terminal canvas map.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    center: GeoPoint,
    lat_span: f64,
    lng_span: f64,
    markers: Vec<HotspotMarker>,
    click_marker: Option<GeoPoint>,
    highlight: Option<usize>,
    cursor: GeoPoint,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            lat_span: 32.0,
            lng_span: 40.0,
            markers: Vec::new(),
            click_marker: None,
            highlight: None,
            cursor: GeoPoint::new(0.0, 0.0),
        }
    }
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// `[west, east]` in degrees of longitude.
    pub fn x_bounds(&self) -> [f64; 2] {
        [
            self.center.lng - self.lng_span / 2.0,
            self.center.lng + self.lng_span / 2.0,
        ]
    }

    /// `[south, north]` in degrees of latitude.
    pub fn y_bounds(&self) -> [f64; 2] {
        [
            self.center.lat - self.lat_span / 2.0,
            self.center.lat + self.lat_span / 2.0,
        ]
    }

    pub fn markers(&self) -> &[HotspotMarker] {
        &self.markers
    }

    pub const fn click_marker(&self) -> Option<GeoPoint> {
        self.click_marker
    }

    pub fn highlighted(&self) -> Option<&HotspotMarker> {
        self.highlight.and_then(|i| self.markers.get(i))
    }

    pub const fn cursor(&self) -> GeoPoint {
        self.cursor
    }

    fn contains(&self, point: GeoPoint) -> bool {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        (west..=east).contains(&point.lng) && (south..=north).contains(&point.lat)
    }

    /// Pans so `point` is visible again, keeping a small margin.
    fn follow(&mut self, point: GeoPoint) {
        if self.contains(point) {
            return;
        }
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        if point.lng < west {
            self.center.lng -= west - point.lng + 1.0;
        } else if point.lng > east {
            self.center.lng += point.lng - east + 1.0;
        }
        if point.lat < south {
            self.center.lat -= south - point.lat + 1.0;
        } else if point.lat > north {
            self.center.lat += point.lat - north + 1.0;
        }
    }
}

impl MapSurface for CanvasSurface {
    fn initialize(&mut self, center: GeoPoint) {
        self.center = center;
        self.cursor = center;
        self.markers.clear();
        self.click_marker = None;
        self.highlight = None;
    }

    fn set_hotspots(&mut self, markers: &[HotspotMarker]) {
        self.markers = markers.to_vec();
        self.highlight = None;
    }

    fn set_click_marker(&mut self, point: Option<GeoPoint>) {
        self.click_marker = point;
    }

    fn set_highlight(&mut self, marker: Option<usize>) {
        self.highlight = marker.filter(|i| *i < self.markers.len());
    }

    fn set_cursor(&mut self, point: GeoPoint) {
        self.cursor = point;
        self.follow(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_surround_center() {
        let mut surface = CanvasSurface::new();
        surface.initialize(GeoPoint::new(22.0, 78.0));
        assert_eq!(surface.x_bounds(), [58.0, 98.0]);
        assert_eq!(surface.y_bounds(), [6.0, 38.0]);
    }

    #[test]
    fn cursor_outside_view_pans_map() {
        let mut surface = CanvasSurface::new();
        surface.initialize(GeoPoint::new(22.0, 78.0));
        surface.set_cursor(GeoPoint::new(22.0, 100.0));
        let [west, east] = surface.x_bounds();
        assert!(west <= 100.0 && 100.0 <= east);
    }

    #[test]
    fn highlight_out_of_range_is_ignored() {
        let mut surface = CanvasSurface::new();
        surface.set_highlight(Some(3));
        assert!(surface.highlighted().is_none());
    }
}
