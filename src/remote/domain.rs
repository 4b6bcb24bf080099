//! Internal domain models for backend responses.
//!
//! These types are OUR types - they don't change when the wire format
//! changes. Every response is converted into them by the adapter.

use std::fmt;
use std::str::FromStr;

use crate::aggregate;
use crate::model::{
    AlbumAggregate, ArtistAggregate, Column, Datasets, Granularity, TrackRecord,
};

/// Rows returned by a successful upload.
///
/// The backend may or may not pre-aggregate; missing rollups are filled in by
/// [`UploadPayload::into_datasets`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPayload {
    pub songs: Vec<TrackRecord>,
    pub albums: Option<Vec<AlbumAggregate>>,
    pub artists: Option<Vec<ArtistAggregate>>,
}

impl UploadPayload {
    pub fn into_datasets(self) -> Datasets {
        aggregate::ingest(self.songs, self.albums, self.artists)
    }
}

/// Grouping a detail lookup is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Album,
    Artist,
}

impl DetailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Artist => "artist",
        }
    }

    /// Columns left once the grouping columns are stripped.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Album => &[Column::Song, Column::Plays, Column::MinutesPlayed],
            Self::Artist => &[Column::Song, Column::Album, Column::Plays, Column::MinutesPlayed],
        }
    }
}

impl From<DetailKind> for Granularity {
    fn from(kind: DetailKind) -> Self {
        match kind {
            DetailKind::Album => Granularity::Album,
            DetailKind::Artist => Granularity::Artist,
        }
    }
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Granularity>()? {
            Granularity::Album => Ok(Self::Album),
            Granularity::Artist => Ok(Self::Artist),
            Granularity::Song => Err("details exist for albums and artists only".to_string()),
        }
    }
}

/// One track inside an album or artist detail view.
///
/// The artist column is always redundant here; the album column is kept only
/// for artist details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailRow {
    pub song: String,
    pub album: Option<String>,
    pub plays: u64,
    pub minutes_played: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetailSummary {
    pub total_plays: u64,
    pub total_minutes: f64,
    pub song_count: u64,
}

/// Constituent tracks of one album or artist.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub kind: DetailKind,
    pub name: String,
    /// Ordered by plays, most played first.
    pub rows: Vec<DetailRow>,
    pub summary: DetailSummary,
}

/// A ranked entry of the monthly top-songs feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyTopSong {
    /// `YYYY-MM`
    pub month: String,
    pub song: String,
    pub artist: String,
    pub album: String,
    pub plays: u64,
    pub minutes_played: f64,
}

/// Top songs of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTop {
    pub month: String,
    pub songs: Vec<MonthlyTopSong>,
}

impl MonthlyTop {
    /// Human-readable month, e.g. "March 2024".
    pub fn label(&self) -> String {
        format_month(&self.month)
    }
}

/// Render `YYYY-MM` as "March 2024"; anything unparsable is returned as-is.
pub fn format_month(month: &str) -> String {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map(|date| date.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

/// Group feed entries per month, keeping the backend's month and rank order.
pub fn group_by_month(entries: Vec<MonthlyTopSong>) -> Vec<MonthlyTop> {
    let mut months: Vec<MonthlyTop> = Vec::new();
    for entry in entries {
        match months.iter_mut().find(|m| m.month == entry.month) {
            Some(month) => month.songs.push(entry),
            None => months.push(MonthlyTop {
                month: entry.month.clone(),
                songs: vec![entry],
            }),
        }
    }
    months
}

/// Errors from talking to the backend
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Invalid upload file: {0}")]
    InvalidFile(String),

    #[error("API contract violation: expected {expected}, got {actual}")]
    ContractViolation { expected: String, actual: String },
}

impl RemoteError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
