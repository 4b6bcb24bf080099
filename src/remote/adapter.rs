//! Adapter layer: Convert backend DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! Missing or malformed fields are replaced with defaults here, so nothing
//! downstream has to deal with partial rows.

use super::domain::{
    DetailKind, DetailRow, DetailSummary, DetailView, MonthlyTopSong, RemoteError, UploadPayload,
};
use super::dto;
use crate::aggregate::sort_by_plays;
use crate::model::{AlbumAggregate, ArtistAggregate, Dataset, Granularity, TrackRecord};

const MS_PER_MINUTE: f64 = 60_000.0;

pub fn to_track(row: dto::TrackRow) -> TrackRecord {
    let minutes_played = row
        .minutes_played
        .or_else(|| row.total_ms_played.map(|ms| ms / MS_PER_MINUTE))
        .unwrap_or_default();

    TrackRecord {
        song: row.song.unwrap_or_default(),
        artist: row.artist.unwrap_or_default(),
        album: row.album.unwrap_or_default(),
        plays: row.plays.unwrap_or_default(),
        minutes_played,
    }
}

pub fn to_album(row: dto::AlbumRow) -> AlbumAggregate {
    AlbumAggregate {
        album: row.album.unwrap_or_default(),
        artist: row.artist.unwrap_or_default(),
        plays: row.plays.unwrap_or_default(),
        minutes_played: row.minutes_played.unwrap_or_default(),
        song_count: row.song_count.unwrap_or_default(),
    }
}

pub fn to_artist(row: dto::ArtistRow) -> ArtistAggregate {
    ArtistAggregate {
        artist: row.artist.unwrap_or_default(),
        plays: row.plays.unwrap_or_default(),
        minutes_played: row.minutes_played.unwrap_or_default(),
        album_count: row.album_count.unwrap_or_default(),
        song_count: row.song_count.unwrap_or_default(),
    }
}

/// Convert an upload body into a payload, tolerating both contracts.
pub fn to_upload_payload(data: dto::UploadData) -> UploadPayload {
    match data {
        dto::UploadData::Flat(rows) => UploadPayload {
            songs: rows.into_iter().map(to_track).collect(),
            albums: None,
            artists: None,
        },
        dto::UploadData::Grouped(grouped) => UploadPayload {
            songs: grouped.song.into_iter().map(to_track).collect(),
            albums: grouped
                .album
                .map(|rows| rows.into_iter().map(to_album).collect()),
            artists: grouped
                .artist
                .map(|rows| rows.into_iter().map(to_artist).collect()),
        },
    }
}

/// Parse a raw upload body (the backend's JSON) into a payload.
pub fn parse_upload_body(body: &str) -> Result<UploadPayload, RemoteError> {
    let response: dto::UploadResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;
    Ok(to_upload_payload(response.data))
}

/// Parse a re-ordered dataset for `granularity`, keeping the backend's order.
pub fn parse_dataset(granularity: Granularity, body: &str) -> Result<Dataset, RemoteError> {
    let parse_err = |e: serde_json::Error| RemoteError::Parse(e.to_string());
    let dataset = match granularity {
        Granularity::Song => {
            let response: dto::DataResponse<dto::TrackRow> =
                serde_json::from_str(body).map_err(parse_err)?;
            Dataset::Songs(response.data.into_iter().map(to_track).collect())
        }
        Granularity::Album => {
            let response: dto::DataResponse<dto::AlbumRow> =
                serde_json::from_str(body).map_err(parse_err)?;
            Dataset::Albums(response.data.into_iter().map(to_album).collect())
        }
        Granularity::Artist => {
            let response: dto::DataResponse<dto::ArtistRow> =
                serde_json::from_str(body).map_err(parse_err)?;
            Dataset::Artists(response.data.into_iter().map(to_artist).collect())
        }
    };
    Ok(dataset)
}

/// Convert a detail response, stripping the grouping columns.
///
/// Album details lose both album and artist; artist details lose the artist.
pub fn to_detail(
    kind: DetailKind,
    name: &str,
    response: dto::DetailResponse,
) -> Result<DetailView, RemoteError> {
    if let Some(actual) = response.kind.as_deref() {
        if !actual.eq_ignore_ascii_case(kind.as_str()) {
            return Err(RemoteError::ContractViolation {
                expected: kind.as_str().to_string(),
                actual: actual.to_string(),
            });
        }
    }

    let mut tracks: Vec<TrackRecord> = response.data.into_iter().map(to_track).collect();
    sort_by_plays(&mut tracks);

    let rows = tracks
        .into_iter()
        .map(|track| DetailRow {
            song: track.song,
            album: match kind {
                DetailKind::Album => None,
                DetailKind::Artist => Some(track.album),
            },
            plays: track.plays,
            minutes_played: track.minutes_played,
        })
        .collect::<Vec<_>>();

    let summary = DetailSummary {
        total_plays: response.summary.total_plays.unwrap_or_default(),
        total_minutes: response.summary.total_minutes.unwrap_or_default(),
        song_count: response
            .summary
            .song_count
            .unwrap_or(rows.len() as u64),
    };

    Ok(DetailView {
        kind,
        name: response.name.unwrap_or_else(|| name.to_string()),
        rows,
        summary,
    })
}

pub fn to_monthly(rows: Vec<dto::MonthlyRow>) -> Vec<MonthlyTopSong> {
    rows.into_iter()
        .map(|row| MonthlyTopSong {
            month: row.month.unwrap_or_default(),
            song: row.song.unwrap_or_default(),
            artist: row.artist.unwrap_or_default(),
            album: row.album.unwrap_or_default(),
            plays: row.plays.unwrap_or_default(),
            minutes_played: row.minutes_played.unwrap_or_default(),
        })
        .collect()
}
