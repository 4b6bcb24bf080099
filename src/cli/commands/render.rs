//! Plain-text tables for terminal output.

use crate::model::{CellValue, Column, ColumnKind, Row};
use crate::remote::{DetailRow, DetailView, MonthlyTop};
use crate::view::{Coordinator, Status};

/// Longest text cell before it is cut.
const MAX_TEXT_WIDTH: usize = 40;

/// `1234567` -> `1,234,567`
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Minutes with one decimal and thousands separators.
pub fn format_minutes(minutes: f64) -> String {
    let fixed = format!("{:.1}", minutes);
    match fixed.split_once('.') {
        Some((whole, frac)) => format!("{}.{}", group_thousands(whole), frac),
        None => fixed,
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_WIDTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_TEXT_WIDTH - 3).collect();
    format!("{cut}...")
}

/// Render one cell of a history row.
pub fn cell(row: &Row<'_>, column: Column) -> String {
    match row.value(column) {
        Some(CellValue::Text(text)) => truncate(text),
        Some(CellValue::Number(n)) if column == Column::MinutesPlayed => format_minutes(n),
        Some(CellValue::Number(n)) => format_count(n.max(0.0) as u64),
        None => String::new(),
    }
}

/// Lay out a table with a rank column; numeric columns are right-aligned.
pub fn table(headers: &[String], numeric: &[bool], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }
    let rank_width = rows.len().to_string().len().max(1);

    let line = |rank: &str, cells: &[String]| {
        let mut out = format!("{rank:>rank_width$}");
        for (i, value) in cells.iter().enumerate() {
            let width = widths[i];
            if numeric[i] {
                out.push_str(&format!("  {value:>width$}"));
            } else {
                out.push_str(&format!("  {value:<width$}"));
            }
        }
        out.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line("#", headers));
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&line(&(i + 1).to_string(), row));
        out.push('\n');
    }
    out
}

fn headers_for(columns: &[Column]) -> (Vec<String>, Vec<bool>) {
    let headers = columns.iter().map(|c| c.wire_name().to_string()).collect();
    let numeric = columns
        .iter()
        .map(|c| c.kind() == ColumnKind::Numeric)
        .collect();
    (headers, numeric)
}

/// The visible page of the coordinator plus its footer.
pub fn page(coordinator: &Coordinator) -> String {
    match coordinator.status() {
        Status::Idle => return "No history loaded.\n".to_string(),
        Status::Uploading => return "Uploading...\n".to_string(),
        Status::Failed(message) => return format!("Upload failed: {message}\n"),
        Status::NoData => {
            let term = &coordinator.state().filter_term;
            return if term.trim().is_empty() {
                "No data.\n".to_string()
            } else {
                format!("No rows match \"{}\".\n", term.trim())
            };
        }
        Status::Ready => {}
    }

    let columns = coordinator.columns();
    let (headers, numeric) = headers_for(columns);
    let page = coordinator.page();
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| columns.iter().map(|&c| cell(row, c)).collect())
        .collect();

    let mut out = table(&headers, &numeric, &rows);
    out.push('\n');
    out.push_str(&footer(coordinator));
    if page.has_more {
        out.push_str(&format!(
            "{} more rows not shown.\n",
            format_count((page.total - page.rows.len()) as u64)
        ));
    }
    if coordinator.is_busy(coordinator.state().granularity) {
        out.push_str("Sorting on the server...\n");
    }
    if let Some(notice) = coordinator.notice() {
        out.push_str(&format!("Note: {notice}\n"));
    }
    out
}

/// Row count and totals for the filtered sequence.
pub fn footer(coordinator: &Coordinator) -> String {
    let stats = coordinator.stats();
    let shown = coordinator.page().rows.len();
    let sort = coordinator.active_sort();
    format!(
        "Showing {} of {} {} rows | {} plays | {} minutes | sorted by {} {}\n",
        format_count(shown as u64),
        format_count(stats.count as u64),
        coordinator.state().granularity,
        format_count(stats.total_plays),
        format_minutes(stats.total_minutes),
        sort.column,
        sort.direction,
    )
}

fn detail_cells(row: &DetailRow, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| match column {
            Column::Song => truncate(&row.song),
            Column::Album => row.album.as_deref().map(truncate).unwrap_or_default(),
            Column::Plays => format_count(row.plays),
            Column::MinutesPlayed => format_minutes(row.minutes_played),
            _ => String::new(),
        })
        .collect()
}

/// Detail table, limited to `visible` rows, followed by the summary.
pub fn detail(view: &DetailView, visible: usize) -> String {
    let columns = view.kind.columns();
    let (headers, numeric) = headers_for(columns);
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .take(visible)
        .map(|row| detail_cells(row, columns))
        .collect();

    let mut out = format!("{} {}\n\n", capitalized(view.kind.as_str()), view.name);
    out.push_str(&table(&headers, &numeric, &rows));
    out.push('\n');
    out.push_str(&format!(
        "{} songs | {} plays | {} minutes\n",
        format_count(view.summary.song_count),
        format_count(view.summary.total_plays),
        format_minutes(view.summary.total_minutes),
    ));
    if view.rows.len() > visible {
        out.push_str(&format!(
            "{} more rows not shown.\n",
            format_count((view.rows.len() - visible) as u64)
        ));
    }
    out
}

/// Monthly rankings, one block per month.
pub fn monthly(months: &[MonthlyTop]) -> String {
    if months.is_empty() {
        return "No monthly data yet.\n".to_string();
    }
    let mut out = String::new();
    for month in months {
        out.push_str(&month.label());
        out.push('\n');
        for (rank, song) in month.songs.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {} - {} ({} plays, {} min)\n",
                rank + 1,
                truncate(&song.song),
                truncate(&song.artist),
                format_count(song.plays),
                format_minutes(song.minutes_played),
            ));
        }
        out.push('\n');
    }
    out
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
