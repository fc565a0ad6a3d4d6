pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod event;
pub mod logging;
pub mod map;
pub mod metrics;
pub mod terminal;
pub mod ui;

pub use domain::{Endpoint, HotspotLevel, Pollutant};
