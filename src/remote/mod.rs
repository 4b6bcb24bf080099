//! Remote collaborators - the history backend.
//!
//! # Architecture
//!
//! Same layering for every endpoint:
//! - **Domain models** (`domain.rs`) - what the rest of the crate sees
//! - **DTOs** (`dto.rs`) - exact response shapes, leniently typed
//! - **Adapter** (`adapter.rs`) - DTO to domain conversion, default substitution
//! - **Client** (`client.rs`) - `reqwest` HTTP client
//! - **Traits** (`traits.rs`) - [`HistoryApi`] seam plus test mocks
//!
//! # Usage
//!
//! ```ignore
//! use history_viewer::remote::{HistoryClient, DEFAULT_BASE_URL};
//!
//! let client = HistoryClient::new(DEFAULT_BASE_URL, Duration::from_secs(30))?;
//! let payload = client.upload(Path::new("my_spotify_data.zip")).await?;
//! let datasets = payload.into_datasets();
//! ```

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use client::{DEFAULT_BASE_URL, HistoryClient};
pub use domain::{
    DetailKind, DetailRow, DetailSummary, DetailView, MonthlyTop, MonthlyTopSong, RemoteError,
    UploadPayload,
};
pub use traits::HistoryApi;
