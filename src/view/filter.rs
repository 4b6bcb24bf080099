//! Free-text filtering.
//!
//! Which fields are searched depends on the record kind (see
//! [`Granularity::search_columns`](crate::model::Granularity::search_columns)).
//! Matching is a case-insensitive substring test on the trimmed term.

use crate::model::{Record, Row};

/// A prepared search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    needle: String,
}

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    /// Whitespace-only terms filter nothing.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.is_empty() || self.matches_row(record.row())
    }

    fn matches_row(&self, row: Row<'_>) -> bool {
        row.granularity().search_columns().iter().any(|column| {
            row.value(*column)
                .and_then(|v| v.as_text())
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        })
    }
}

/// Indices of `rows` matching `term`, in their original order.
pub fn matching_indices<R: Record>(rows: &[R], term: &SearchTerm) -> Vec<usize> {
    if term.is_empty() {
        return (0..rows.len()).collect();
    }
    rows.iter()
        .enumerate()
        .filter(|(_, row)| term.matches(*row))
        .map(|(i, _)| i)
        .collect()
}

/// Rows matching `term`, in their original order.
pub fn filter<'a, R: Record>(rows: &'a [R], term: &str) -> Vec<&'a R> {
    let term = SearchTerm::new(term);
    rows.iter().filter(|row| term.matches(*row)).collect()
}
