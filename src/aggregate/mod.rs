//! Rollups from play-level records to album and artist summaries.
//!
//! # Grouping rules
//!
//! - Albums and artists are grouped by exact name; no case-folding or
//!   whitespace normalization.
//! - Empty album/artist names are replaced with [`UNKNOWN_ALBUM`] /
//!   [`UNKNOWN_ARTIST`] before grouping.
//! - An album's artist is taken from the first record seen for that album.
//!   Later records with another artist do not change it, so compilations are
//!   attributed to whichever artist happens to come first.
//! - `minutes_played` is rounded to one decimal after every accumulation
//!   step, not only at the end.
//!
//! Every dataset comes out ordered by plays, descending, with ties kept in
//! first-seen order. That is the natural order before any user sort.

use std::collections::{HashMap, HashSet};

use crate::model::{
    AlbumAggregate, ArtistAggregate, Datasets, Record, TrackRecord, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
};

/// Round to one decimal place.
pub fn round_minutes(minutes: f64) -> f64 {
    (minutes * 10.0).round() / 10.0
}

fn album_key(track: &TrackRecord) -> &str {
    if track.album.is_empty() {
        UNKNOWN_ALBUM
    } else {
        &track.album
    }
}

fn artist_key(track: &TrackRecord) -> &str {
    if track.artist.is_empty() {
        UNKNOWN_ARTIST
    } else {
        &track.artist
    }
}

/// Stable sort by plays, most played first.
pub fn sort_by_plays<R: Record>(rows: &mut [R]) {
    rows.sort_by(|a, b| b.plays().cmp(&a.plays()));
}

/// Roll tracks up per album.
pub fn rollup_albums(tracks: &[TrackRecord]) -> Vec<AlbumAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut albums: Vec<AlbumAggregate> = Vec::new();

    for track in tracks {
        let key = album_key(track);
        let slot = *index.entry(key).or_insert_with(|| {
            albums.push(AlbumAggregate {
                album: key.to_string(),
                artist: artist_key(track).to_string(),
                ..Default::default()
            });
            albums.len() - 1
        });

        let album = &mut albums[slot];
        album.plays += track.plays;
        album.minutes_played = round_minutes(album.minutes_played + track.minutes_played);
        album.song_count += 1;
    }

    sort_by_plays(&mut albums);
    albums
}

/// Roll tracks up per artist.
pub fn rollup_artists(tracks: &[TrackRecord]) -> Vec<ArtistAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut artists: Vec<ArtistAggregate> = Vec::new();
    let mut album_sets: Vec<HashSet<&str>> = Vec::new();

    for track in tracks {
        let key = artist_key(track);
        let slot = *index.entry(key).or_insert_with(|| {
            artists.push(ArtistAggregate {
                artist: key.to_string(),
                ..Default::default()
            });
            album_sets.push(HashSet::new());
            artists.len() - 1
        });

        let albums = &mut album_sets[slot];
        albums.insert(album_key(track));

        let artist = &mut artists[slot];
        artist.plays += track.plays;
        artist.minutes_played = round_minutes(artist.minutes_played + track.minutes_played);
        artist.song_count += 1;
        artist.album_count = albums.len() as u64;
    }

    sort_by_plays(&mut artists);
    artists
}

/// Build all three datasets from play-level records.
pub fn aggregate(tracks: &[TrackRecord]) -> Datasets {
    let mut songs = tracks.to_vec();
    sort_by_plays(&mut songs);

    let datasets = Datasets {
        albums: rollup_albums(tracks),
        artists: rollup_artists(tracks),
        songs,
    };

    tracing::debug!(
        songs = datasets.songs.len(),
        albums = datasets.albums.len(),
        artists = datasets.artists.len(),
        "Aggregated listening history"
    );
    datasets
}

/// Combine backend output with local rollups.
///
/// Pre-aggregated rows from the backend win when present; whatever is missing
/// is computed from the song rows.
pub fn ingest(
    songs: Vec<TrackRecord>,
    albums: Option<Vec<AlbumAggregate>>,
    artists: Option<Vec<ArtistAggregate>>,
) -> Datasets {
    let mut albums = albums.unwrap_or_else(|| rollup_albums(&songs));
    let mut artists = artists.unwrap_or_else(|| rollup_artists(&songs));
    let mut songs = songs;

    sort_by_plays(&mut songs);
    sort_by_plays(&mut albums);
    sort_by_plays(&mut artists);

    Datasets {
        songs,
        albums,
        artists,
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Small name pools so groups actually collide
    fn arb_track() -> impl Strategy<Value = TrackRecord> {
        (
            prop::sample::select(vec!["s1", "s2", "s3", "s4"]),
            prop::sample::select(vec!["", "Ana", "Bo", "Cy"]),
            prop::sample::select(vec!["", "Red", "Green", "Blue"]),
            0u64..500,
            0u32..10_000,
        )
            .prop_map(|(song, artist, album, plays, tenths)| TrackRecord {
                song: song.to_string(),
                artist: artist.to_string(),
                album: album.to_string(),
                plays,
                minutes_played: f64::from(tenths) / 10.0,
            })
    }

    fn arb_tracks() -> impl Strategy<Value = Vec<TrackRecord>> {
        prop::collection::vec(arb_track(), 0..60)
    }

    proptest! {
        /// Rollups never gain or lose plays
        #[test]
        fn rollups_preserve_total_plays(tracks in arb_tracks()) {
            let total: u64 = tracks.iter().map(|t| t.plays).sum();
            let datasets = aggregate(&tracks);
            prop_assert_eq!(datasets.albums.iter().map(|a| a.plays).sum::<u64>(), total);
            prop_assert_eq!(datasets.artists.iter().map(|a| a.plays).sum::<u64>(), total);
            prop_assert_eq!(datasets.songs.iter().map(|s| s.plays).sum::<u64>(), total);
        }

        /// Album song counts match the records per album key
        #[test]
        fn album_song_count_matches_records(tracks in arb_tracks()) {
            for album in rollup_albums(&tracks) {
                let expected = tracks.iter().filter(|t| album_key(t) == album.album).count();
                prop_assert_eq!(album.song_count, expected as u64);
            }
        }

        /// Artist album counts are distinct album names, not sums
        #[test]
        fn artist_album_count_is_distinct(tracks in arb_tracks()) {
            for artist in rollup_artists(&tracks) {
                let expected: HashSet<&str> = tracks
                    .iter()
                    .filter(|t| artist_key(t) == artist.artist)
                    .map(album_key)
                    .collect();
                prop_assert_eq!(artist.album_count, expected.len() as u64);
            }
        }

        /// Same input, same output, down to float rounding
        #[test]
        fn aggregate_is_deterministic(tracks in arb_tracks()) {
            prop_assert_eq!(aggregate(&tracks), aggregate(&tracks));
        }

        /// Every output is ordered by plays, descending
        #[test]
        fn outputs_are_ordered_by_plays(tracks in arb_tracks()) {
            let datasets = aggregate(&tracks);
            prop_assert!(datasets.albums.windows(2).all(|w| w[0].plays >= w[1].plays));
            prop_assert!(datasets.artists.windows(2).all(|w| w[0].plays >= w[1].plays));
            prop_assert!(datasets.songs.windows(2).all(|w| w[0].plays >= w[1].plays));
        }
    }
}
