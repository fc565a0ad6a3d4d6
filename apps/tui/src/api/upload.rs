use super::models::coerce_count;
use super::transport::{FileUpload, Transport, TransportError};
use crate::domain::UPLOAD_PATH;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please select a valid .csv file.")]
    NotCsv,
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl UploadError {
    /// Inline text shown next to the upload control.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotCsv => self.to_string(),
            other => format!("Upload Failed: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReceipt {
    pub inserted_count: u64,
}

impl UploadReceipt {
    pub fn success_message(self) -> String {
        format!(
            "Success! {} records updated. Refreshing charts...",
            self.inserted_count
        )
    }
}

pub fn validate_csv_path(path: &Path) -> Result<(), UploadError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv && path.file_name().is_some() {
        Ok(())
    } else {
        Err(UploadError::NotCsv)
    }
}

/// Sends a summary CSV to the ingestion endpoint.
pub async fn upload_csv(
    transport: &dyn Transport,
    path: &Path,
) -> Result<UploadReceipt, UploadError> {
    validate_csv_path(path)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let response = transport
        .post_file(
            UPLOAD_PATH,
            FileUpload {
                field: "file",
                file_name,
                mime: "text/csv",
                bytes,
            },
        )
        .await?;

    if !response.is_success() {
        let detail = response
            .detail()
            .unwrap_or_else(|| format!("server responded with HTTP {}", response.status));
        return Err(UploadError::Rejected(detail));
    }

    let inserted_count = response
        .json()
        .and_then(|body| body.pointer("/data/inserted_count").map(coerce_count))
        .unwrap_or(0);

    info!(path = %path.display(), inserted_count, "CSV uploaded");
    Ok(UploadReceipt { inserted_count })
}
