use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body parsed as JSON, `None` when it is not valid JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Human readable error text from a FastAPI style `detail` field.
    pub fn detail(&self) -> Option<String> {
        let body = self.json()?;
        match body.get("detail")? {
            Value::String(text) => Some(text.clone()),
            Value::Array(items) => {
                let messages = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect::<Vec<_>>();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("could not build HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    fn request(url: &str, error: &reqwest::Error) -> Self {
        Self::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// A file attached to a multipart POST.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field: &'static str,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// The narrow HTTP surface the dashboard needs from the emissions API.
///
/// Non-success statuses are returned as `Ok` so callers can decide how to
/// degrade; only failures to complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)])
        -> Result<RawResponse, TransportError>;

    async fn post_file(&self, path: &str, upload: FileUpload)
        -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::request(url, &e))?;
        debug!(%url, status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::request(&url, &e))?;
        Self::read(&url, response).await
    }

    async fn post_file(
        &self,
        path: &str,
        upload: FileUpload,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        debug!(%url, file = %upload.file_name, bytes = upload.bytes.len(), "POST multipart");

        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)
            .map_err(|e| TransportError::request(&url, &e))?;
        let form = reqwest::multipart::Form::new().part(upload.field, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::request(&url, &e))?;
        Self::read(&url, response).await
    }
}
