//! Test utilities and fixtures for history-viewer tests.
//!
//! Record factories keep test tables short, and [`serve_once`] stands in for
//! the backend in HTTP client tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{serve_once, track};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (base_url, request) = serve_once(200, r#"{"data":[]}"#).await;
//!     // ... point a client at base_url, then inspect request.await
//! }
//! ```

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, Uri, header};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::model::{AlbumAggregate, ArtistAggregate, TrackRecord};

/// Creates a song row.
pub fn track(song: &str, artist: &str, album: &str, plays: u64, minutes: f64) -> TrackRecord {
    TrackRecord {
        song: song.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        plays,
        minutes_played: minutes,
    }
}

/// Creates an album row with one song.
pub fn album(name: &str, artist: &str, plays: u64) -> AlbumAggregate {
    AlbumAggregate {
        album: name.to_string(),
        artist: artist.to_string(),
        plays,
        minutes_played: plays as f64 * 3.0,
        song_count: 1,
    }
}

/// Creates an artist row with one album and one song.
pub fn artist(name: &str, plays: u64) -> ArtistAggregate {
    ArtistAggregate {
        artist: name.to_string(),
        plays,
        minutes_played: plays as f64 * 3.0,
        album_count: 1,
        song_count: 1,
    }
}

/// Creates `count` distinct songs named `Song 0`, `Song 1`, ...
///
/// Plays repeat with a short period so that sorting by plays has ties.
pub fn many_tracks(count: usize) -> Vec<TrackRecord> {
    (0..count)
        .map(|i| {
            let plays = (i % 17) as u64 + 1;
            track(
                &format!("Song {i}"),
                &format!("Artist {}", i % 7),
                &format!("Album {}", i % 13),
                plays,
                plays as f64 * 3.5,
            )
        })
        .collect()
}

/// Serves a canned JSON response and records the first request it sees.
///
/// Returns the base URL to point a client at (ending in `/api`) and a handle
/// that resolves to `"{METHOD} {path?query}\n\n{body}"` for that request.
/// The server stops once the request has been recorded.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");

    let status = StatusCode::from_u16(status).expect("Invalid status code");
    let body = body.to_string();
    let (seen_tx, seen_rx) = oneshot::channel::<String>();
    let seen_tx = Arc::new(Mutex::new(Some(seen_tx)));

    let app = Router::new().fallback(move |method: Method, uri: Uri, request: Bytes| {
        let seen_tx = seen_tx.clone();
        let body = body.clone();
        async move {
            let seen = format!("{method} {uri}\n\n{}", String::from_utf8_lossy(&request));
            if let Some(tx) = seen_tx.lock().unwrap().take() {
                let _ = tx.send(seen);
            }
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }
    });

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await;
    });

    let handle = tokio::spawn(async move {
        let request = seen_rx.await.unwrap_or_default();
        let _ = stop_tx.send(());
        request
    });

    (format!("http://{addr}/api"), handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_once_records_request_and_replies() {
        let (base_url, request) = serve_once(418, r#"{"message":"teapot"}"#).await;

        let response = reqwest::Client::new()
            .post(format!("{base_url}/data/song?column=Plays"))
            .body("hello")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 418);
        assert_eq!(response.text().await.unwrap(), r#"{"message":"teapot"}"#);

        let request = request.await.unwrap();
        assert_eq!(request, "POST /api/data/song?column=Plays\n\nhello");
    }
}
