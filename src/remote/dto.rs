//! Backend Data Transfer Objects
//!
//! These types match what the history backend returns. Field names follow
//! the table headers the backend emits ("Song", "Minutes Played", ...), with
//! aliases for the snake_case and camelCase variants seen in older exports.
//! DO NOT use these types outside the remote module - convert to domain types.
//!
//! Every field is optional and leniently typed: a number may arrive as a JSON
//! number or as a numeric string, and anything unusable becomes `None`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let number = match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite() && *n >= 0.0))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let count = match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count)
}

/// One play-level row
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackRow {
    #[serde(rename = "Song", alias = "song", alias = "track_name", default, deserialize_with = "lenient_text")]
    pub song: Option<String>,
    #[serde(rename = "Artist", alias = "artist", alias = "artist_name", default, deserialize_with = "lenient_text")]
    pub artist: Option<String>,
    #[serde(rename = "Album", alias = "album", alias = "album_name", default, deserialize_with = "lenient_text")]
    pub album: Option<String>,
    #[serde(rename = "Plays", alias = "plays", alias = "play_count", default, deserialize_with = "lenient_count")]
    pub plays: Option<u64>,
    #[serde(rename = "Minutes Played", alias = "minutesPlayed", alias = "minutes_played", default, deserialize_with = "lenient_float")]
    pub minutes_played: Option<f64>,
    /// Older exports carry raw milliseconds instead of minutes
    #[serde(default, deserialize_with = "lenient_float", skip_serializing_if = "Option::is_none")]
    pub total_ms_played: Option<f64>,
}

/// One pre-aggregated album row
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlbumRow {
    #[serde(rename = "Album", alias = "album", default, deserialize_with = "lenient_text")]
    pub album: Option<String>,
    #[serde(rename = "Artist", alias = "artist", default, deserialize_with = "lenient_text")]
    pub artist: Option<String>,
    #[serde(rename = "Plays", alias = "plays", default, deserialize_with = "lenient_count")]
    pub plays: Option<u64>,
    #[serde(rename = "Minutes Played", alias = "minutesPlayed", alias = "minutes_played", default, deserialize_with = "lenient_float")]
    pub minutes_played: Option<f64>,
    #[serde(rename = "Song Count", alias = "songCount", alias = "song_count", default, deserialize_with = "lenient_count")]
    pub song_count: Option<u64>,
}

/// One pre-aggregated artist row
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistRow {
    #[serde(rename = "Artist", alias = "artist", default, deserialize_with = "lenient_text")]
    pub artist: Option<String>,
    #[serde(rename = "Plays", alias = "plays", default, deserialize_with = "lenient_count")]
    pub plays: Option<u64>,
    #[serde(rename = "Minutes Played", alias = "minutesPlayed", alias = "minutes_played", default, deserialize_with = "lenient_float")]
    pub minutes_played: Option<f64>,
    #[serde(rename = "Album Count", alias = "albumCount", alias = "album_count", default, deserialize_with = "lenient_count")]
    pub album_count: Option<u64>,
    #[serde(rename = "Song Count", alias = "songCount", alias = "song_count", default, deserialize_with = "lenient_count")]
    pub song_count: Option<u64>,
}

/// Upload payload grouped by granularity
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GroupedData {
    #[serde(alias = "songs")]
    pub song: Vec<TrackRow>,
    #[serde(alias = "albums", default)]
    pub album: Option<Vec<AlbumRow>>,
    #[serde(alias = "artists", default)]
    pub artist: Option<Vec<ArtistRow>>,
}

/// Either a flat list of track rows or rows grouped by granularity
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UploadData {
    Flat(Vec<TrackRow>),
    Grouped(GroupedData),
}

/// `POST /upload` success body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub data: UploadData,
}

/// Body of any non-success response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn text(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// `GET /data/{granularity}` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Summary block of a detail response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetailSummaryDto {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_plays: Option<u64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub total_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub song_count: Option<u64>,
}

/// `GET /data/detail/{type}/{name}` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub data: Vec<TrackRow>,
    #[serde(default)]
    pub summary: DetailSummaryDto,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One entry of `GET /monthly-top-songs`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonthlyRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub month: Option<String>,
    #[serde(alias = "Song", default, deserialize_with = "lenient_text")]
    pub song: Option<String>,
    #[serde(alias = "Artist", default, deserialize_with = "lenient_text")]
    pub artist: Option<String>,
    #[serde(alias = "Album", default, deserialize_with = "lenient_text")]
    pub album: Option<String>,
    #[serde(alias = "Plays", default, deserialize_with = "lenient_count")]
    pub plays: Option<u64>,
    #[serde(alias = "Minutes Played", alias = "minutesPlayed", default, deserialize_with = "lenient_float")]
    pub minutes_played: Option<f64>,
}
