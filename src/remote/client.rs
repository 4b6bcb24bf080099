//! History backend HTTP client
//!
//! Talks to the backend that parses uploaded exports and answers sort,
//! detail and monthly queries. Every response is turned into domain types by
//! the adapter before leaving this module.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::adapter;
use super::domain::{DetailKind, DetailView, MonthlyTopSong, RemoteError, UploadPayload};
use super::dto;
use crate::model::Dataset;
use crate::view::SortRequest;

/// Default backend location when running locally
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

const USER_AGENT: &str = concat!("HistoryViewer/", env!("CARGO_PKG_VERSION"));

/// History backend client
pub struct HistoryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HistoryClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Upload a `.zip` export and return the parsed rows
    pub async fn upload(&self, path: &Path) -> Result<UploadPayload, RemoteError> {
        let file_name = zip_file_name(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RemoteError::InvalidFile(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let body = read_success_body(response).await?;
        adapter::parse_upload_body(&body)
    }

    /// Ask the backend for the full dataset of one granularity in a new order
    pub async fn sort(&self, request: &SortRequest) -> Result<Dataset, RemoteError> {
        let url = format!("{}/data/{}", self.base_url, request.granularity.as_str());

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("column", request.spec.column.wire_name()),
                ("direction", request.spec.direction.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let body = read_success_body(response).await?;
        adapter::parse_dataset(request.granularity, &body)
    }

    /// Look up the tracks behind one album or artist
    pub async fn detail(&self, kind: DetailKind, name: &str) -> Result<DetailView, RemoteError> {
        let url = format!(
            "{}/data/detail/{}/{}",
            self.base_url,
            kind.as_str(),
            urlencoding::encode(name)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let body = read_success_body(response).await?;
        let detail: dto::DetailResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))?;
        adapter::to_detail(kind, name, detail)
    }

    /// Fetch the monthly top songs; "no data yet" is an empty list
    pub async fn monthly_top_songs(&self) -> Result<Vec<MonthlyTopSong>, RemoteError> {
        let response = self
            .http_client
            .get(format!("{}/monthly-top-songs", self.base_url))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let body = match read_success_body(response).await {
            Ok(body) => body,
            Err(RemoteError::NotFound) => {
                tracing::debug!("No monthly data on the backend yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let rows: dto::DataResponse<dto::MonthlyRow> =
            serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(adapter::to_monthly(rows.data))
    }
}

/// File name of an upload, rejecting anything that is not a `.zip`
fn zip_file_name(path: &Path) -> Result<String, RemoteError> {
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(RemoteError::InvalidFile(format!(
            "{} is not a .zip archive",
            path.display()
        )));
    }

    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| RemoteError::InvalidFile(path.display().to_string()))
}

/// Map the status code to an error, or return the body text
async fn read_success_body(response: reqwest::Response) -> Result<String, RemoteError> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RemoteError::NotFound);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(RemoteError::RateLimited);
    }

    if !status.is_success() {
        // Try to surface the server's own message
        let message = response
            .json::<dto::ApiMessage>()
            .await
            .ok()
            .and_then(dto::ApiMessage::text)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .text()
        .await
        .map_err(|e| RemoteError::Network(e.to_string()))
}
