//! Core data models for listening history.
//!
//! Defines the play-level [`TrackRecord`] and its two rollups,
//! [`AlbumAggregate`] and [`ArtistAggregate`]. The three kinds are closed over
//! by [`Dataset`] (owned) and [`Row`] (borrowed), both discriminated by
//! [`Granularity`].
//!
//! An empty text field means the value is missing: it sorts last and never
//! matches a search.

pub mod schema;

pub use schema::{Column, ColumnKind, Granularity};

/// Placeholder used for tracks without album metadata.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
/// Placeholder used for tracks without artist metadata.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// One listening-history entry as delivered by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRecord {
    pub song: String,
    pub artist: String,
    pub album: String,
    pub plays: u64,
    pub minutes_played: f64,
}

/// Plays rolled up per album name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumAggregate {
    pub album: String,
    /// Artist of the first record seen for this album.
    pub artist: String,
    pub plays: u64,
    pub minutes_played: f64,
    pub song_count: u64,
}

/// Plays rolled up per artist name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistAggregate {
    pub artist: String,
    pub plays: u64,
    pub minutes_played: f64,
    /// Distinct album names seen for this artist.
    pub album_count: u64,
    pub song_count: u64,
}

/// A single cell, typed by its column's [`ColumnKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> CellValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(n) => Some(n),
            Self::Text(_) => None,
        }
    }
}

fn text(s: &str) -> Option<CellValue<'_>> {
    (!s.is_empty()).then_some(CellValue::Text(s))
}

fn number<N: Into<f64>>(n: N) -> Option<CellValue<'static>> {
    Some(CellValue::Number(n.into()))
}

/// Behaviour shared by the three record kinds.
pub trait Record {
    const GRANULARITY: Granularity;

    /// Value of `column`, or `None` when this kind lacks it or it is empty.
    fn value(&self, column: Column) -> Option<CellValue<'_>>;

    fn plays(&self) -> u64;

    fn minutes_played(&self) -> f64;

    fn row(&self) -> Row<'_>;
}

impl Record for TrackRecord {
    const GRANULARITY: Granularity = Granularity::Song;

    fn value(&self, column: Column) -> Option<CellValue<'_>> {
        match column {
            Column::Song => text(&self.song),
            Column::Artist => text(&self.artist),
            Column::Album => text(&self.album),
            Column::Plays => number(self.plays as f64),
            Column::MinutesPlayed => number(self.minutes_played),
            Column::SongCount | Column::AlbumCount => None,
        }
    }

    fn plays(&self) -> u64 {
        self.plays
    }

    fn minutes_played(&self) -> f64 {
        self.minutes_played
    }

    fn row(&self) -> Row<'_> {
        Row::Song(self)
    }
}

impl Record for AlbumAggregate {
    const GRANULARITY: Granularity = Granularity::Album;

    fn value(&self, column: Column) -> Option<CellValue<'_>> {
        match column {
            Column::Album => text(&self.album),
            Column::Artist => text(&self.artist),
            Column::Plays => number(self.plays as f64),
            Column::MinutesPlayed => number(self.minutes_played),
            Column::SongCount => number(self.song_count as f64),
            Column::Song | Column::AlbumCount => None,
        }
    }

    fn plays(&self) -> u64 {
        self.plays
    }

    fn minutes_played(&self) -> f64 {
        self.minutes_played
    }

    fn row(&self) -> Row<'_> {
        Row::Album(self)
    }
}

impl Record for ArtistAggregate {
    const GRANULARITY: Granularity = Granularity::Artist;

    fn value(&self, column: Column) -> Option<CellValue<'_>> {
        match column {
            Column::Artist => text(&self.artist),
            Column::Plays => number(self.plays as f64),
            Column::MinutesPlayed => number(self.minutes_played),
            Column::AlbumCount => number(self.album_count as f64),
            Column::SongCount => number(self.song_count as f64),
            Column::Song | Column::Album => None,
        }
    }

    fn plays(&self) -> u64 {
        self.plays
    }

    fn minutes_played(&self) -> f64 {
        self.minutes_played
    }

    fn row(&self) -> Row<'_> {
        Row::Artist(self)
    }
}

/// A borrowed record of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    Song(&'a TrackRecord),
    Album(&'a AlbumAggregate),
    Artist(&'a ArtistAggregate),
}

impl Row<'_> {
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Song(_) => Granularity::Song,
            Self::Album(_) => Granularity::Album,
            Self::Artist(_) => Granularity::Artist,
        }
    }

    pub fn value(&self, column: Column) -> Option<CellValue<'_>> {
        match self {
            Self::Song(r) => r.value(column),
            Self::Album(r) => r.value(column),
            Self::Artist(r) => r.value(column),
        }
    }

    pub fn plays(&self) -> u64 {
        match self {
            Self::Song(r) => r.plays,
            Self::Album(r) => r.plays,
            Self::Artist(r) => r.plays,
        }
    }

    pub fn minutes_played(&self) -> f64 {
        match self {
            Self::Song(r) => r.minutes_played,
            Self::Album(r) => r.minutes_played,
            Self::Artist(r) => r.minutes_played,
        }
    }
}

/// All rows of one granularity.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Songs(Vec<TrackRecord>),
    Albums(Vec<AlbumAggregate>),
    Artists(Vec<ArtistAggregate>),
}

impl Dataset {
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Songs(_) => Granularity::Song,
            Self::Albums(_) => Granularity::Album,
            Self::Artists(_) => Granularity::Artist,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Songs(rows) => rows.len(),
            Self::Albums(rows) => rows.len(),
            Self::Artists(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        match self {
            Self::Songs(rows) => rows.get(index).map(Record::row),
            Self::Albums(rows) => rows.get(index).map(Record::row),
            Self::Artists(rows) => rows.get(index).map(Record::row),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).filter_map(|i| self.row(i))
    }
}

/// The three datasets produced from one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub songs: Vec<TrackRecord>,
    pub albums: Vec<AlbumAggregate>,
    pub artists: Vec<ArtistAggregate>,
}

impl Datasets {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.albums.is_empty() && self.artists.is_empty()
    }

    /// Split into per-granularity datasets, indexed by [`Granularity`].
    pub fn into_parts(self) -> [Dataset; 3] {
        [
            Dataset::Songs(self.songs),
            Dataset::Albums(self.albums),
            Dataset::Artists(self.artists),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_missing() {
        let track = TrackRecord {
            song: "Song".to_string(),
            ..Default::default()
        };
        assert_eq!(track.value(Column::Song), Some(CellValue::Text("Song")));
        assert_eq!(track.value(Column::Album), None);
    }

    #[test]
    fn test_columns_outside_schema_are_missing() {
        let album = AlbumAggregate {
            album: "M".to_string(),
            ..Default::default()
        };
        assert_eq!(album.value(Column::AlbumCount), None);
        assert_eq!(album.value(Column::Song), None);
        assert_eq!(album.value(Column::SongCount), Some(CellValue::Number(0.0)));
    }

    #[test]
    fn test_value_kind_matches_column_kind() {
        let artist = ArtistAggregate {
            artist: "X".to_string(),
            plays: 3,
            minutes_played: 1.5,
            album_count: 1,
            song_count: 2,
        };
        for column in Granularity::Artist.columns() {
            let value = artist.value(*column).unwrap();
            match column.kind() {
                ColumnKind::Numeric => assert!(value.as_number().is_some()),
                ColumnKind::Text => assert!(value.as_text().is_some()),
            }
        }
    }

    #[test]
    fn test_dataset_rows_follow_variant() {
        let dataset = Dataset::Albums(vec![AlbumAggregate::default(), AlbumAggregate::default()]);
        assert_eq!(dataset.granularity(), Granularity::Album);
        assert_eq!(dataset.len(), 2);
        assert!(dataset.rows().all(|r| r.granularity() == Granularity::Album));
        assert!(dataset.row(2).is_none());
    }

    #[test]
    fn test_into_parts_is_indexed_by_granularity() {
        let parts = Datasets::default().into_parts();
        for g in Granularity::ALL {
            assert_eq!(parts[g.index()].granularity(), g);
        }
    }
}
