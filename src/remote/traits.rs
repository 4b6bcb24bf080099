//! Trait definition for the history backend.
//!
//! The view session only talks to the backend through [`HistoryApi`], so
//! tests can substitute a mock for the real HTTP client.

use std::path::Path;

use async_trait::async_trait;

use super::client::HistoryClient;
use super::domain::{DetailKind, DetailView, MonthlyTopSong, RemoteError, UploadPayload};
use crate::model::Dataset;
use crate::view::SortRequest;

/// Everything the front-end needs from the backend.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Upload an export archive and return its rows.
    async fn upload(&self, path: &Path) -> Result<UploadPayload, RemoteError>;

    /// Return the full dataset of `request.granularity` in the requested order.
    async fn sort(&self, request: &SortRequest) -> Result<Dataset, RemoteError>;

    /// Constituent tracks of one album or artist.
    async fn detail(&self, kind: DetailKind, name: &str) -> Result<DetailView, RemoteError>;

    /// Monthly top songs, empty when the backend has none yet.
    async fn monthly_top_songs(&self) -> Result<Vec<MonthlyTopSong>, RemoteError>;
}

#[async_trait]
impl HistoryApi for HistoryClient {
    async fn upload(&self, path: &Path) -> Result<UploadPayload, RemoteError> {
        self.upload(path).await
    }

    async fn sort(&self, request: &SortRequest) -> Result<Dataset, RemoteError> {
        self.sort(request).await
    }

    async fn detail(&self, kind: DetailKind, name: &str) -> Result<DetailView, RemoteError> {
        self.detail(kind, name).await
    }

    async fn monthly_top_songs(&self) -> Result<Vec<MonthlyTopSong>, RemoteError> {
        self.monthly_top_songs().await
    }
}
