pub mod fetcher;
pub mod geocode;
pub mod mine_offset;
pub mod models;
pub mod transport;
pub mod upload;

#[cfg(test)]
pub mod testing;

pub use fetcher::{fetch_dashboard, DashboardSnapshot, FetchError};
pub use geocode::{GeocodeResult, NominatimGeocoder, ReverseGeocoder};
pub use mine_offset::{search_mine_offsets, MineOffsetRecord, SearchError, SearchOutcome};
pub use transport::{HttpTransport, Transport, TransportError};
pub use upload::{upload_csv, UploadError, UploadReceipt};
