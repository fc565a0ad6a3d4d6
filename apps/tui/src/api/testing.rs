//! In-memory stand-ins for the HTTP collaborators, used by unit tests.

use super::geocode::{GeocodeResult, ReverseGeocoder};
use super::transport::{FileUpload, RawResponse, Transport, TransportError};
use crate::map::GeoPoint;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Reply {
    Respond(u16, String),
    Unreachable,
}

/// Routes keyed by `path` or `path?key=value&...` in the order the query was given.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
    uploads: Mutex<Vec<FileUpload>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, route: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(route.to_string(), Reply::Respond(status, body.to_string()));
        self
    }

    pub fn unreachable(mut self, route: &str) -> Self {
        self.routes.insert(route.to_string(), Reply::Unreachable);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reply(&self, route: String) -> Result<RawResponse, TransportError> {
        let reply = self.routes.get(&route).cloned();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.clone());

        match reply {
            Some(Reply::Respond(status, body)) => Ok(RawResponse::new(status, body)),
            Some(Reply::Unreachable) | None => Err(TransportError::Request {
                url: route,
                message: "connection refused".to_string(),
            }),
        }
    }
}

fn route_key(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let pairs = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{pairs}")
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RawResponse, TransportError> {
        self.reply(route_key(path, query))
    }

    async fn post_file(
        &self,
        path: &str,
        upload: FileUpload,
    ) -> Result<RawResponse, TransportError> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(upload);
        self.reply(path.to_string())
    }
}

/// Geocoder that answers every lookup with the same result.
#[derive(Debug)]
pub struct StubGeocoder {
    result: Option<GeocodeResult>,
}

impl StubGeocoder {
    pub const fn answering(result: GeocodeResult) -> Self {
        Self {
            result: Some(result),
        }
    }

    pub const fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, TransportError> {
        let url = format!("reverse?lat={}&lon={}", point.lat, point.lng);
        match self.result.clone() {
            Some(result) => result.found(&url),
            None => Err(TransportError::Status { url, status: 503 }),
        }
    }
}
