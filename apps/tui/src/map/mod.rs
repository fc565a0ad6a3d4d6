mod controller;
mod location;
mod surface;

pub use controller::{MapController, PendingLookup, CURSOR_STEP};
pub use location::{GeoPoint, SelectedLocation, SelectionSource, DEFAULT_CENTER};
pub use surface::{CanvasSurface, HotspotMarker, MapSurface};
