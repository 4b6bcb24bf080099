//! Granularities and their column schemas.
//!
//! Every column carries an explicit [`ColumnKind`], so sorting and display
//! never have to guess whether a value is a number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The grouping level at which plays are displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Song,
    Album,
    Artist,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Song, Self::Album, Self::Artist];

    /// Columns shown for this granularity, in display order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Song => &[
                Column::Song,
                Column::Artist,
                Column::Album,
                Column::Plays,
                Column::MinutesPlayed,
            ],
            Self::Album => &[
                Column::Album,
                Column::Artist,
                Column::Plays,
                Column::MinutesPlayed,
                Column::SongCount,
            ],
            Self::Artist => &[
                Column::Artist,
                Column::Plays,
                Column::MinutesPlayed,
                Column::AlbumCount,
                Column::SongCount,
            ],
        }
    }

    /// Text columns the free-text filter looks at.
    pub fn search_columns(self) -> &'static [Column] {
        match self {
            Self::Song => &[Column::Song, Column::Artist, Column::Album],
            Self::Album => &[Column::Album, Column::Artist],
            Self::Artist => &[Column::Artist],
        }
    }

    pub fn has_column(self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    /// Sort key used when none is chosen, or when the chosen one is absent.
    pub fn default_sort_key(self) -> Column {
        Column::Plays
    }

    /// Index into per-granularity arrays.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Song => 0,
            Self::Album => 1,
            Self::Artist => 2,
        }
    }

    /// Path segment used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::Album => "album",
            Self::Artist => "artist",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "song" | "songs" | "track" | "tracks" => Ok(Self::Song),
            "album" | "albums" => Ok(Self::Album),
            "artist" | "artists" => Ok(Self::Artist),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

/// How a column's values compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// A sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Song,
    Artist,
    Album,
    Plays,
    MinutesPlayed,
    SongCount,
    AlbumCount,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Self::Song,
        Self::Artist,
        Self::Album,
        Self::Plays,
        Self::MinutesPlayed,
        Self::SongCount,
        Self::AlbumCount,
    ];

    pub fn kind(self) -> ColumnKind {
        match self {
            Self::Song | Self::Artist | Self::Album => ColumnKind::Text,
            Self::Plays | Self::MinutesPlayed | Self::SongCount | Self::AlbumCount => {
                ColumnKind::Numeric
            }
        }
    }

    /// Header name, also the key used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Song => "Song",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Plays => "Plays",
            Self::MinutesPlayed => "Minutes Played",
            Self::SongCount => "Song Count",
            Self::AlbumCount => "Album Count",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Column {
    type Err = String;

    /// Accepts wire names as well as compact forms like `minutes` or `song_count`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "song" | "title" | "track" => Ok(Self::Song),
            "artist" => Ok(Self::Artist),
            "album" => Ok(Self::Album),
            "plays" | "playcount" => Ok(Self::Plays),
            "minutes" | "minutesplayed" => Ok(Self::MinutesPlayed),
            "songs" | "songcount" => Ok(Self::SongCount),
            "albums" | "albumcount" => Ok(Self::AlbumCount),
            _ => Err(format!("unknown column '{}'", s.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_has_default_sort_key() {
        for g in Granularity::ALL {
            assert!(g.has_column(g.default_sort_key()));
        }
    }

    #[test]
    fn test_search_columns_are_text_columns_of_schema() {
        for g in Granularity::ALL {
            for c in g.search_columns() {
                assert_eq!(c.kind(), ColumnKind::Text);
                assert!(g.has_column(*c));
            }
        }
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!("Minutes Played".parse::<Column>(), Ok(Column::MinutesPlayed));
        assert_eq!("minutes".parse::<Column>(), Ok(Column::MinutesPlayed));
        assert_eq!("album_count".parse::<Column>(), Ok(Column::AlbumCount));
        assert_eq!("PLAYS".parse::<Column>(), Ok(Column::Plays));
        assert!("genre".parse::<Column>().is_err());
    }

    #[test]
    fn test_column_wire_names_roundtrip() {
        for c in Column::ALL {
            assert_eq!(c.wire_name().parse::<Column>(), Ok(c));
        }
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("Albums".parse::<Granularity>(), Ok(Granularity::Album));
        assert_eq!("track".parse::<Granularity>(), Ok(Granularity::Song));
        assert!("genre".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_album_count_only_on_artists() {
        assert!(!Granularity::Song.has_column(Column::AlbumCount));
        assert!(!Granularity::Album.has_column(Column::AlbumCount));
        assert!(Granularity::Artist.has_column(Column::AlbumCount));
    }
}
