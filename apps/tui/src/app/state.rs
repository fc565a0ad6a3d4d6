use super::actions::{AppActions, AppEvent, Services};
use super::upload::{UploadEvent, UploadStatus};
use crate::api::mine_offset::{rank_suggestions, MAX_SUGGESTIONS};
use crate::api::upload::validate_csv_path;
use crate::api::{DashboardSnapshot, FetchError, MineOffsetRecord, SearchError, SearchOutcome};
use crate::config::AppConfig;
use crate::map::{CanvasSurface, MapController};
use chrono::{DateTime, Local};
use color_eyre::Result;
use ratatui::style::Color;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tachyonfx::{fx, Effect, Interpolation};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Overview,
    MineOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    UploadPath,
}

#[derive(Debug)]
pub enum OverviewEvent {
    FetchStarted,
    FetchFinished(Result<DashboardSnapshot, FetchError>),
}

/// Overview data plus its own loading and error flags.
#[derive(Debug, Default)]
pub struct OverviewState {
    in_flight: usize,
    pub snapshot: Option<DashboardSnapshot>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl OverviewState {
    /// True while any refresh is outstanding.
    pub const fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn apply(&mut self, event: OverviewEvent) {
        match event {
            OverviewEvent::FetchStarted => {
                self.in_flight += 1;
            }
            OverviewEvent::FetchFinished(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(snapshot) => {
                        self.error = None;
                        self.snapshot = Some(snapshot);
                        self.last_updated = Some(Local::now());
                    }
                    // The previous snapshot stays on screen.
                    Err(e) => {
                        warn!("dashboard refresh failed: {e}");
                        self.error = Some(e.to_string());
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum MineOffsetEvent {
    SearchStarted,
    Found(Box<MineOffsetRecord>),
    NotFound {
        message: String,
        suggestions: Vec<String>,
    },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct MineOffsetState {
    in_flight: usize,
    pub query: String,
    pub error: Option<String>,
    pub record: Option<Box<MineOffsetRecord>>,
    pub suggestions: Vec<String>,
    pub suggestion_index: Option<usize>,
}

impl MineOffsetState {
    pub const fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// The query to send, or `None` when it is blank.
    pub fn submit(&self) -> Option<String> {
        let query = self.query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    pub fn apply(&mut self, event: MineOffsetEvent) {
        if !matches!(event, MineOffsetEvent::SearchStarted) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        match event {
            MineOffsetEvent::SearchStarted => {
                self.in_flight += 1;
            }
            MineOffsetEvent::Found(record) => {
                self.record = Some(record);
                self.error = None;
                self.suggestions.clear();
                self.suggestion_index = None;
            }
            MineOffsetEvent::NotFound {
                message,
                suggestions,
            } => {
                self.record = None;
                self.error = Some(message);
                self.suggestions = suggestions;
                self.suggestion_index = None;
            }
            MineOffsetEvent::Failed(message) => {
                self.record = None;
                self.error = Some(message);
                self.suggestions.clear();
                self.suggestion_index = None;
            }
        }
    }
}

pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub status_message: String,
    pub overview: OverviewState,
    pub mine_offset: MineOffsetState,
    pub upload: UploadStatus,
    pub upload_input: String,
    pub map: MapController<CanvasSurface>,
    pub throbber: ThrobberState,
    pub transition_fx: Mutex<Option<Effect>>,
    pub last_tick: Duration,
    last_frame: Instant,
    actions: AppActions,
    events: UnboundedReceiver<AppEvent>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("input_mode", &self.input_mode)
            .field("overview", &self.overview)
            .field("mine_offset", &self.mine_offset)
            .field("upload", &self.upload)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let services = Services::from_config(config)?;
        Ok(Self::with_services(services, config.hotspot_limit))
    }

    pub fn with_services(services: Services, hotspot_limit: usize) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            running: true,
            screen: AppScreen::Overview,
            input_mode: InputMode::Normal,
            show_help: false,
            status_message: String::new(),
            overview: OverviewState::default(),
            mine_offset: MineOffsetState::default(),
            upload: UploadStatus::default(),
            upload_input: String::new(),
            map: MapController::new(CanvasSurface::new()),
            throbber: ThrobberState::default(),
            transition_fx: Mutex::new(None),
            last_tick: Duration::ZERO,
            last_frame: Instant::now(),
            actions: AppActions::new(services, sender, hotspot_limit),
            events,
        }
    }

    /// Overview to mine offsets.
    pub fn forward(&mut self) {
        if self.screen == AppScreen::Overview {
            self.screen = AppScreen::MineOffset;
            self.input_mode = InputMode::Normal;
            self.start_transition();
        }
    }

    /// Mine offsets back to the overview.
    pub fn back(&mut self) {
        if self.screen == AppScreen::MineOffset {
            self.screen = AppScreen::Overview;
            self.start_transition();
        }
    }

    fn start_transition(&self) {
        if let Ok(mut effect) = self.transition_fx.lock() {
            *effect = Some(fx::fade_from_fg(
                Color::Black,
                (350, Interpolation::QuadOut),
            ));
        }
    }

    pub fn refresh(&mut self) {
        self.overview.apply(OverviewEvent::FetchStarted);
        self.actions.refresh_dashboard();
    }

    pub fn submit_search(&mut self) {
        let Some(query) = self.mine_offset.submit() else {
            self.status_message = "Type a mine name, then press Enter".to_string();
            return;
        };
        info!(mine = %query, "searching offset plan");
        self.mine_offset.apply(MineOffsetEvent::SearchStarted);
        self.actions.search_mine(query);
    }

    /// Enter on the map.
    pub fn click_map(&mut self) {
        if let Some(lookup) = self.map.activate_cursor() {
            self.actions.reverse_geocode(lookup);
        }
    }

    pub fn begin_upload(&mut self) {
        if self.upload.is_pending() {
            self.status_message = "An upload is already running".to_string();
            return;
        }
        self.input_mode = InputMode::UploadPath;
        self.upload_input.clear();
        let _ = self.upload.process(&UploadEvent::Dismiss);
    }

    pub fn cancel_upload(&mut self) {
        self.input_mode = InputMode::Normal;
        self.upload_input.clear();
    }

    pub fn submit_upload(&mut self) {
        let path = PathBuf::from(self.upload_input.trim());
        self.input_mode = InputMode::Normal;

        if let Err(e) = validate_csv_path(&path) {
            if let Err(e) = self.upload.process(&UploadEvent::Rejected(e.user_message())) {
                warn!("{e}");
            }
            return;
        }

        match self.upload.process(&UploadEvent::Start) {
            Ok(()) => self.actions.upload(path),
            Err(e) => warn!("{e}"),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::DashboardLoaded(result) => {
                self.status_message.clear();
                if let Ok(snapshot) = &result {
                    self.map.set_hotspots(&snapshot.hotspots);
                    if snapshot.is_partial() {
                        let failed = snapshot
                            .failed
                            .iter()
                            .map(|endpoint| endpoint.label())
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.status_message = format!("Partial data: {failed} unavailable");
                    }
                }
                self.overview.apply(OverviewEvent::FetchFinished(result));
            }
            AppEvent::SearchFinished { query, outcome } => {
                let event = self.search_event(&query, outcome);
                self.mine_offset.apply(event);
            }
            AppEvent::LocationResolved { lookup, result } => {
                self.map.resolve_lookup(lookup, result);
            }
            AppEvent::UploadFinished(result) => {
                let (event, refetch) = match result {
                    Ok(receipt) => (UploadEvent::Succeeded(receipt), true),
                    Err(e) => (UploadEvent::Failed(e.user_message()), false),
                };
                if let Err(e) = self.upload.process(&event) {
                    warn!("{e}");
                }
                if refetch {
                    self.refresh();
                }
            }
        }
    }

    fn search_event(
        &self,
        query: &str,
        outcome: Result<SearchOutcome, SearchError>,
    ) -> MineOffsetEvent {
        match outcome {
            Ok(SearchOutcome::Found(record)) => MineOffsetEvent::Found(record),
            Ok(SearchOutcome::NotFound { message, available }) => MineOffsetEvent::NotFound {
                message,
                suggestions: self.suggestions_for(query, &available),
            },
            Err(e) => MineOffsetEvent::Failed(e.to_string()),
        }
    }

    /// Names offered by the service, else the known hotspot mines.
    fn suggestions_for(&self, query: &str, available: &[String]) -> Vec<String> {
        if !available.is_empty() {
            let ranked = rank_suggestions(query, available.iter().map(String::as_str), MAX_SUGGESTIONS);
            if ranked.is_empty() {
                return available.iter().take(MAX_SUGGESTIONS).cloned().collect();
            }
            return ranked;
        }

        let known = self
            .overview
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.hotspots.as_slice())
            .unwrap_or_default();
        rank_suggestions(
            query,
            known.iter().map(|hotspot| hotspot.mine_name.as_str()),
            MAX_SUGGESTIONS,
        )
    }

    /// Applies every event that has already arrived.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn busy(&self) -> bool {
        self.overview.loading()
            || self.mine_offset.loading()
            || self.upload.is_pending()
            || self.map.lookup_pending()
    }

    /// Waits for background work to finish, applying results as they land.
    pub async fn settle(&mut self) {
        while self.busy() {
            match self.events.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        self.last_tick = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.drain_events();

        if self.busy() {
            self.throbber.calc_next();
        }

        if let Ok(mut effect) = self.transition_fx.lock() {
            if effect.as_ref().is_some_and(Effect::done) {
                *effect = None;
            }
        }
    }
}
