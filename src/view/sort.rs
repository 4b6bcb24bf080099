//! Column comparator shared by all three granularities.
//!
//! Missing values sink to the end in both directions. Numeric columns compare
//! as numbers and text columns as case-sensitive strings, as declared by
//! [`Column::kind`]. Sorting is always stable, so equal keys keep their
//! previous relative order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{CellValue, Column, ColumnKind, Granularity, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// A column together with a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Plays, most played first.
    pub fn default_for(granularity: Granularity) -> Self {
        Self {
            column: granularity.default_sort_key(),
            direction: SortDirection::Desc,
        }
    }

    /// Sort after a header click: a new column starts descending, the active
    /// one flips.
    pub fn toggled(self, column: Column) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Desc,
            }
        }
    }
}

fn present_cmp(a: CellValue<'_>, b: CellValue<'_>, kind: ColumnKind) -> Option<Ordering> {
    match kind {
        ColumnKind::Numeric => Some(a.as_number()?.total_cmp(&b.as_number()?)),
        ColumnKind::Text => Some(a.as_text()?.cmp(b.as_text()?)),
    }
}

fn normalize(value: Option<CellValue<'_>>, kind: ColumnKind) -> Option<CellValue<'_>> {
    match (value, kind) {
        (Some(v @ CellValue::Number(_)), ColumnKind::Numeric) => Some(v),
        (Some(v @ CellValue::Text(_)), ColumnKind::Text) => Some(v),
        _ => None,
    }
}

/// Compare two records on `column` in `direction`.
pub fn compare<R: Record>(a: &R, b: &R, column: Column, direction: SortDirection) -> Ordering {
    let kind = column.kind();
    let a = normalize(a.value(column), kind);
    let b = normalize(b.value(column), kind);

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = present_cmp(a, b, kind).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable in-place sort of `indices` into `rows`.
pub fn sort_indices<R: Record>(rows: &[R], indices: &mut [usize], spec: SortSpec) {
    indices.sort_by(|&a, &b| compare(&rows[a], &rows[b], spec.column, spec.direction));
}

/// Stable in-place sort of `rows`.
pub fn sort_rows<R: Record>(rows: &mut [R], spec: SortSpec) {
    rows.sort_by(|a, b| compare(a, b, spec.column, spec.direction));
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::TrackRecord;
    use proptest::prelude::*;

    fn arb_rows() -> impl Strategy<Value = Vec<TrackRecord>> {
        prop::collection::vec(
            (0u64..5, prop::sample::select(vec!["", "a", "B", "c"])),
            0..40,
        )
        .prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (plays, album))| TrackRecord {
                    song: i.to_string(),
                    artist: "X".to_string(),
                    album: album.to_string(),
                    plays,
                    minutes_played: 0.0,
                })
                .collect()
        })
    }

    fn arb_spec() -> impl Strategy<Value = SortSpec> {
        (
            prop::sample::select(Granularity::Song.columns().to_vec()),
            prop::sample::select(vec![SortDirection::Asc, SortDirection::Desc]),
        )
            .prop_map(|(column, direction)| SortSpec { column, direction })
    }

    proptest! {
        /// Sorting an already sorted sequence changes nothing
        #[test]
        fn sorting_is_idempotent(mut rows in arb_rows(), spec in arb_spec()) {
            sort_rows(&mut rows, spec);
            let once = rows.clone();
            sort_rows(&mut rows, spec);
            prop_assert_eq!(rows, once);
        }

        /// A constant key keeps the original order
        #[test]
        fn constant_key_preserves_order(rows in arb_rows(), direction in prop::sample::select(vec![SortDirection::Asc, SortDirection::Desc])) {
            let mut flat: Vec<TrackRecord> = rows
                .into_iter()
                .map(|r| TrackRecord { plays: 1, ..r })
                .collect();
            let before = flat.clone();
            sort_rows(&mut flat, SortSpec { column: Column::Plays, direction });
            prop_assert_eq!(flat, before);
        }

        /// Missing values always end up after present ones
        #[test]
        fn missing_values_are_last(mut rows in arb_rows(), direction in prop::sample::select(vec![SortDirection::Asc, SortDirection::Desc])) {
            sort_rows(&mut rows, SortSpec { column: Column::Album, direction });
            let first_missing = rows.iter().position(|r| r.album.is_empty()).unwrap_or(rows.len());
            prop_assert!(rows[first_missing..].iter().all(|r| r.album.is_empty()));
        }
    }
}
