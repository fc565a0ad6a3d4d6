use crate::api::{
    fetch_dashboard, search_mine_offsets, upload_csv, DashboardSnapshot, FetchError,
    GeocodeResult, HttpTransport, NominatimGeocoder, ReverseGeocoder, SearchError, SearchOutcome,
    Transport, TransportError, UploadError, UploadReceipt,
};
use crate::config::AppConfig;
use crate::map::PendingLookup;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// The network collaborators, shared with background tasks.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn Transport>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        Ok(Self {
            api: Arc::new(HttpTransport::new(&config.api_url, config.request_timeout)?),
            geocoder: Arc::new(NominatimGeocoder::new(
                &config.geocoder_url,
                config.request_timeout,
            )?),
        })
    }
}

/// Results posted back to the UI loop by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    DashboardLoaded(Result<DashboardSnapshot, FetchError>),
    SearchFinished {
        query: String,
        outcome: Result<SearchOutcome, SearchError>,
    },
    LocationResolved {
        lookup: PendingLookup,
        result: Result<GeocodeResult, TransportError>,
    },
    UploadFinished(Result<UploadReceipt, UploadError>),
}

/// Spawns network work onto the runtime. Nothing here blocks the caller.
#[derive(Debug, Clone)]
pub struct AppActions {
    services: Services,
    sender: UnboundedSender<AppEvent>,
    hotspot_limit: usize,
}

impl AppActions {
    pub const fn new(
        services: Services,
        sender: UnboundedSender<AppEvent>,
        hotspot_limit: usize,
    ) -> Self {
        Self {
            services,
            sender,
            hotspot_limit,
        }
    }

    fn post(sender: &UnboundedSender<AppEvent>, event: AppEvent) {
        if sender.send(event).is_err() {
            debug!("event receiver closed, dropping result");
        }
    }

    pub fn refresh_dashboard(&self) {
        let api = Arc::clone(&self.services.api);
        let sender = self.sender.clone();
        let limit = self.hotspot_limit;
        tokio::spawn(async move {
            let result = fetch_dashboard(api.as_ref(), limit).await;
            Self::post(&sender, AppEvent::DashboardLoaded(result));
        });
    }

    pub fn search_mine(&self, query: String) {
        let api = Arc::clone(&self.services.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = search_mine_offsets(api.as_ref(), &query).await;
            Self::post(&sender, AppEvent::SearchFinished { query, outcome });
        });
    }

    pub fn reverse_geocode(&self, lookup: PendingLookup) {
        let geocoder = Arc::clone(&self.services.geocoder);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = geocoder.reverse(lookup.point).await;
            Self::post(&sender, AppEvent::LocationResolved { lookup, result });
        });
    }

    pub fn upload(&self, path: PathBuf) {
        let api = Arc::clone(&self.services.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = upload_csv(api.as_ref(), &path).await;
            Self::post(&sender, AppEvent::UploadFinished(result));
        });
    }
}
