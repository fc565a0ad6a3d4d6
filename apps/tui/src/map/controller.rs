use super::location::{GeoPoint, SelectedLocation, DEFAULT_CENTER};
use super::surface::{HotspotMarker, MapSurface};
use crate::api::geocode::GeocodeResult;
use crate::api::models::Hotspot;
use crate::api::transport::TransportError;
use crate::app::input::helpers::cycle_index;
use tracing::{debug, warn};

/// Cursor step per arrow key press, in degrees.
pub const CURSOR_STEP: f64 = 0.5;

/// How close the cursor must be to a marker for Enter to pick the marker.
const PICK_RADIUS: f64 = 0.6;

/// A reverse lookup the caller has to run and hand back via
/// [`MapController::resolve_lookup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLookup {
    pub point: GeoPoint,
    pub generation: u64,
}

/// Owns the map surface and the single active selection.
///
/// Either the click marker or a hotspot highlight is shown, never both.
/// Every new selection bumps `generation`, so a lookup that finishes after
/// the user has moved on is dropped instead of overwriting the newer pick.
#[derive(Debug)]
pub struct MapController<S: MapSurface> {
    surface: S,
    hotspots: Vec<Hotspot>,
    markers: Vec<HotspotMarker>,
    click_marker: Option<GeoPoint>,
    highlighted: Option<usize>,
    cursor: GeoPoint,
    selection: SelectedLocation,
    generation: u64,
    lookup_pending: bool,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(mut surface: S) -> Self {
        surface.initialize(DEFAULT_CENTER);
        surface.set_cursor(DEFAULT_CENTER);
        Self {
            surface,
            hotspots: Vec::new(),
            markers: Vec::new(),
            click_marker: None,
            highlighted: None,
            cursor: DEFAULT_CENTER,
            selection: SelectedLocation::default(),
            generation: 0,
            lookup_pending: false,
        }
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn selection(&self) -> &SelectedLocation {
        &self.selection
    }

    pub const fn click_marker(&self) -> Option<GeoPoint> {
        self.click_marker
    }

    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn markers(&self) -> &[HotspotMarker] {
        &self.markers
    }

    pub const fn cursor(&self) -> GeoPoint {
        self.cursor
    }

    pub const fn lookup_pending(&self) -> bool {
        self.lookup_pending
    }

    /// Replaces every hotspot marker. Entries without both coordinates are
    /// not drawn.
    pub fn set_hotspots(&mut self, hotspots: &[Hotspot]) {
        self.hotspots = hotspots.to_vec();
        self.markers = hotspots
            .iter()
            .enumerate()
            .filter_map(|(index, hotspot)| {
                let (lat, lng) = hotspot.coordinates()?;
                Some(HotspotMarker {
                    hotspot: index,
                    point: GeoPoint::new(lat, lng),
                    level: hotspot.level.clone(),
                    label: hotspot.mine_name.clone(),
                })
            })
            .collect();

        debug!(
            total = hotspots.len(),
            drawn = self.markers.len(),
            "hotspot markers redrawn"
        );
        self.highlighted = None;
        self.surface.set_hotspots(&self.markers);
        self.surface.set_highlight(None);
    }

    /// Drops a click marker at `point` and asks for a reverse lookup.
    pub fn click(&mut self, point: GeoPoint) -> PendingLookup {
        self.generation += 1;
        self.lookup_pending = true;
        self.click_marker = Some(point);
        self.highlighted = None;
        self.selection = SelectedLocation::locating(point);

        self.surface.set_highlight(None);
        self.surface.set_click_marker(Some(point));

        PendingLookup {
            point,
            generation: self.generation,
        }
    }

    /// Enter on the map: picks the marker under the cursor, or clicks the
    /// bare map there.
    pub fn activate_cursor(&mut self) -> Option<PendingLookup> {
        let nearest = self
            .markers
            .iter()
            .enumerate()
            .map(|(i, marker)| (i, marker.point.distance(self.cursor)))
            .filter(|(_, distance)| *distance <= PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        match nearest {
            Some(marker) => {
                self.select_hotspot(marker);
                None
            }
            None => Some(self.click(self.cursor)),
        }
    }

    /// Applies the outcome of a lookup. Returns false when it was stale.
    pub fn resolve_lookup(
        &mut self,
        lookup: PendingLookup,
        result: Result<GeocodeResult, TransportError>,
    ) -> bool {
        if lookup.generation != self.generation || !self.lookup_pending {
            debug!(
                generation = lookup.generation,
                current = self.generation,
                "discarding stale reverse lookup"
            );
            return false;
        }

        self.lookup_pending = false;
        self.selection = match result {
            Ok(found) => SelectedLocation::from_geocode(lookup.point, &found),
            Err(e) => {
                warn!("reverse geocoding failed: {e}");
                SelectedLocation::geocode_failed(lookup.point)
            }
        };
        true
    }

    /// Selects a hotspot marker by its position in [`Self::markers`].
    pub fn select_hotspot(&mut self, marker: usize) -> bool {
        let Some(found) = self.markers.get(marker) else {
            return false;
        };
        let Some(hotspot) = self.hotspots.get(found.hotspot) else {
            return false;
        };

        self.generation += 1;
        self.lookup_pending = false;
        self.selection = SelectedLocation::from_hotspot(found.point, hotspot);
        self.cursor = found.point;
        self.click_marker = None;
        self.highlighted = Some(marker);

        self.surface.set_click_marker(None);
        self.surface.set_highlight(Some(marker));
        self.surface.set_cursor(self.cursor);
        true
    }

    /// Tab / Shift-Tab through the drawn markers.
    pub fn cycle_hotspot(&mut self, forward: bool) -> bool {
        cycle_index(self.highlighted, self.markers.len(), forward)
            .is_some_and(|next| self.select_hotspot(next))
    }

    pub fn move_cursor(&mut self, d_lat: f64, d_lng: f64) {
        self.cursor = GeoPoint::new(
            (self.cursor.lat + d_lat).clamp(-85.0, 85.0),
            (self.cursor.lng + d_lng).clamp(-180.0, 180.0),
        );
        self.surface.set_cursor(self.cursor);
    }

    /// Back to the default selection with no markers picked.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.lookup_pending = false;
        self.click_marker = None;
        self.highlighted = None;
        self.cursor = DEFAULT_CENTER;
        self.selection = SelectedLocation::default();

        self.surface.set_click_marker(None);
        self.surface.set_highlight(None);
        self.surface.set_cursor(DEFAULT_CENTER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::geocode::GeocodeAddress;
    use crate::domain::HotspotLevel;
    use crate::map::SelectionSource;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        markers: usize,
        click_marker: Option<GeoPoint>,
        highlight: Option<usize>,
        redraws: usize,
    }

    impl MapSurface for RecordingSurface {
        fn initialize(&mut self, _center: GeoPoint) {}

        fn set_hotspots(&mut self, markers: &[HotspotMarker]) {
            self.markers = markers.len();
            self.redraws += 1;
        }

        fn set_click_marker(&mut self, point: Option<GeoPoint>) {
            self.click_marker = point;
        }

        fn set_highlight(&mut self, marker: Option<usize>) {
            self.highlight = marker;
        }

        fn set_cursor(&mut self, _point: GeoPoint) {}
    }

    fn hotspot(name: &str, coords: Option<(f64, f64)>, level: &str) -> Hotspot {
        Hotspot {
            mine_name: name.to_string(),
            district: "Dhanbad".to_string(),
            state: "Jharkhand".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            level: HotspotLevel::parse(level),
            emission_score: 72.5,
        }
    }

    fn controller() -> MapController<RecordingSurface> {
        let mut map = MapController::new(RecordingSurface::default());
        map.set_hotspots(&[
            hotspot("Jharia", Some((23.75, 86.42)), "Red"),
            hotspot("Nowhere", None, "Orange"),
            hotspot("Korba", Some((22.35, 82.68)), "Purple"),
        ]);
        map
    }

    fn geocoded(village: &str) -> GeocodeResult {
        GeocodeResult {
            address: GeocodeAddress {
                village: Some(village.to_string()),
                ..GeocodeAddress::default()
            },
            ..GeocodeResult::default()
        }
    }

    #[test]
    fn markers_skip_hotspots_without_coordinates() {
        let map = controller();
        assert_eq!(map.markers().len(), 2);
        assert_eq!(map.surface().markers, 2);
        assert_eq!(map.markers()[1].hotspot, 2);
        assert_eq!(
            map.markers()[1].level,
            HotspotLevel::Other("Purple".to_string())
        );
    }

    #[test]
    fn tab_cycles_markers_and_wraps() {
        let mut map = controller();
        assert!(map.cycle_hotspot(false));
        assert_eq!(map.highlighted(), Some(1));
        assert!(map.cycle_hotspot(true));
        assert_eq!(map.highlighted(), Some(0));
        assert_eq!(map.surface().highlight, Some(0));

        let mut empty = MapController::new(RecordingSurface::default());
        assert!(!empty.cycle_hotspot(true));
        assert_eq!(empty.highlighted(), None);
    }

    #[test]
    fn new_dataset_redraws_and_clears_highlight() {
        let mut map = controller();
        map.select_hotspot(0);
        map.set_hotspots(&[hotspot("Talcher", Some((20.95, 85.23)), "Yellow")]);
        assert_eq!(map.surface().redraws, 2);
        assert_eq!(map.surface().markers, 1);
        assert!(map.highlighted().is_none());
        assert!(map.surface().highlight.is_none());
    }

    #[test]
    fn click_after_hotspot_leaves_single_provenance() {
        let mut map = controller();
        assert!(map.select_hotspot(1));
        assert_eq!(map.surface().highlight, Some(1));
        assert!(map.surface().click_marker.is_none());
        assert_eq!(map.selection().source, SelectionSource::Hotspot);
        assert_eq!(map.selection().name, "Korba");

        let point = GeoPoint::new(21.0, 84.0);
        let lookup = map.click(point);
        assert_eq!(map.surface().click_marker, Some(point));
        assert!(map.surface().highlight.is_none());
        assert!(map.highlighted().is_none());

        assert!(map.resolve_lookup(lookup, Ok(geocoded("Sonepur"))));
        assert_eq!(map.selection().name, "Sonepur");
        assert_eq!(map.selection().source, SelectionSource::MapClick);
    }

    #[test]
    fn hotspot_after_click_clears_click_marker() {
        let mut map = controller();
        map.click(GeoPoint::new(21.0, 84.0));
        map.select_hotspot(0);
        assert!(map.surface().click_marker.is_none());
        assert_eq!(map.surface().highlight, Some(0));
    }

    #[test]
    fn failed_lookup_falls_back_to_selected_area() {
        let mut map = controller();
        let lookup = map.click(GeoPoint::new(21.0, 84.0));
        let failure = TransportError::Status {
            url: "reverse".to_string(),
            status: 503,
        };
        assert!(map.resolve_lookup(lookup, Err(failure)));
        assert_eq!(map.selection().name, "Selected Area");
        assert_eq!(map.selection().country, "India");
        assert!(!map.lookup_pending());
    }

    #[test]
    fn stale_lookup_is_ignored() {
        let mut map = controller();
        let first = map.click(GeoPoint::new(21.0, 84.0));
        let second = map.click(GeoPoint::new(24.0, 86.0));

        assert!(!map.resolve_lookup(first, Ok(geocoded("Old"))));
        assert_eq!(map.selection().name, "Locating...");

        assert!(map.resolve_lookup(second, Ok(geocoded("New"))));
        assert_eq!(map.selection().name, "New");

        let third = map.click(GeoPoint::new(22.0, 85.0));
        map.select_hotspot(0);
        assert!(!map.resolve_lookup(third, Ok(geocoded("Late"))));
        assert_eq!(map.selection().name, "Jharia");
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let mut map = controller();
        assert!(map.cycle_hotspot(false));
        assert_eq!(map.highlighted(), Some(1));
        assert!(map.cycle_hotspot(true));
        assert_eq!(map.highlighted(), Some(0));

        let mut empty = MapController::new(RecordingSurface::default());
        assert!(!empty.cycle_hotspot(true));
    }

    #[test]
    fn enter_near_marker_selects_it_without_lookup() {
        let mut map = controller();
        map.cycle_hotspot(true);
        map.reset();
        map.move_cursor(23.75 - map.cursor().lat, 86.42 - map.cursor().lng);
        assert!(map.activate_cursor().is_none());
        assert_eq!(map.selection().name, "Jharia");

        map.move_cursor(-5.0, 0.0);
        assert!(map.activate_cursor().is_some());
        assert!(map.lookup_pending());
    }

    #[test]
    fn reset_restores_default() {
        let mut map = controller();
        map.click(GeoPoint::new(21.0, 84.0));
        map.reset();
        assert_eq!(map.selection(), &SelectedLocation::default());
        assert!(map.click_marker().is_none());
        assert!(!map.lookup_pending());
    }
}
