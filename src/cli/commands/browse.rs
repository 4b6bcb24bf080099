//! Interactive browsing of one upload.
//!
//! Reads one command per line from stdin and prints the table again after
//! every change. Remote sorts and detail lookups run on the shared runtime.

use std::io::{BufRead, Write};
use std::path::Path;
use tokio::runtime::Runtime;

use super::{client, render};
use crate::config::Config;
use crate::model::{Granularity, Row};
use crate::remote::DetailKind;
use crate::view::{Coordinator, CoordinatorSettings, Session, Status, ViewEvent};

const HELP: &str = "\
Commands:
  by <song|album|artist>   switch table
  sort <column>            sort by column, again to flip direction
  filter [text]            keep matching rows (no text clears)
  more                     show more rows
  detail <n>               songs behind album/artist in row n
  stats                    row count and totals
  help                     this text
  quit                     leave
";

#[derive(Debug, Clone, PartialEq)]
enum BrowseCommand {
    Event(ViewEvent),
    Detail(usize),
    Stats,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Parse one input line; blank lines yield `None`.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "by" => Self::Event(ViewEvent::GranularityChanged(rest.parse()?)),
            "sort" => Self::Event(ViewEvent::SortClicked(rest.parse()?)),
            "filter" => Self::Event(ViewEvent::FilterChanged(rest.to_string())),
            "more" => Self::Event(ViewEvent::RevealMore),
            "detail" => match rest.parse::<usize>() {
                Ok(rank) if rank > 0 => Self::Detail(rank),
                _ => return Err("Usage: detail <row number>".to_string()),
            },
            "stats" => Self::Stats,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("Unknown command '{other}'. Type `help`.")),
        };
        Ok(Some(command))
    }
}

/// Upload an export, then read commands from stdin until `quit`
pub fn cmd_browse(rt: &Runtime, config: &Config, path: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(client(config)?, CoordinatorSettings::from(&config.view));

    if let Status::Failed(message) = rt.block_on(session.upload(path)) {
        anyhow::bail!("Upload failed: {}", message);
    }
    print!("{}", render::page(session.coordinator()));
    println!("Type `help` for commands.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match BrowseCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => print!("{HELP}"),
            BrowseCommand::Stats => print!("{}", render::footer(session.coordinator())),
            BrowseCommand::Detail(rank) => {
                match detail_target(session.coordinator(), rank) {
                    Ok((kind, name)) => match rt.block_on(session.api().detail(kind, &name)) {
                        Ok(view) => print!("{}", render::detail(&view, config.view.initial_rows)),
                        Err(e) => eprintln!("Detail failed: {}", e.user_message()),
                    },
                    Err(message) => eprintln!("{message}"),
                }
            }
            BrowseCommand::Event(ViewEvent::SortClicked(column))
                if !session.coordinator().columns().contains(&column) =>
            {
                eprintln!(
                    "{} is not a column of the {} table",
                    column,
                    session.coordinator().state().granularity
                );
            }
            BrowseCommand::Event(event) => {
                rt.block_on(session.dispatch(event));
                print!("{}", render::page(session.coordinator()));
            }
        }
    }
    Ok(())
}

/// Album or artist shown at 1-based `rank` in the current table.
fn detail_target(coordinator: &Coordinator, rank: usize) -> Result<(DetailKind, String), String> {
    if coordinator.state().granularity == Granularity::Song {
        return Err("Switch to the album or artist table first (`by album`).".to_string());
    }
    let row = coordinator
        .ordered_rows()
        .nth(rank - 1)
        .ok_or_else(|| format!("There is no row {rank}."))?;

    match row {
        Row::Album(album) => Ok((DetailKind::Album, album.album.clone())),
        Row::Artist(artist) => Ok((DetailKind::Artist, artist.artist.clone())),
        Row::Song(_) => Err("Songs have no detail view.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::Column;
    use crate::test_utils::track;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            BrowseCommand::parse("by Album").unwrap(),
            Some(BrowseCommand::Event(ViewEvent::GranularityChanged(
                Granularity::Album
            )))
        );
        assert_eq!(
            BrowseCommand::parse("sort minutes played").unwrap(),
            Some(BrowseCommand::Event(ViewEvent::SortClicked(
                Column::MinutesPlayed
            )))
        );
        assert_eq!(
            BrowseCommand::parse("filter  the beatles ").unwrap(),
            Some(BrowseCommand::Event(ViewEvent::FilterChanged(
                "the beatles".to_string()
            )))
        );
        assert_eq!(
            BrowseCommand::parse("filter").unwrap(),
            Some(BrowseCommand::Event(ViewEvent::FilterChanged(String::new())))
        );
        assert_eq!(
            BrowseCommand::parse("detail 3").unwrap(),
            Some(BrowseCommand::Detail(3))
        );
        assert_eq!(BrowseCommand::parse("q").unwrap(), Some(BrowseCommand::Quit));
        assert_eq!(BrowseCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(BrowseCommand::parse("by genre").is_err());
        assert!(BrowseCommand::parse("sort colour").is_err());
        assert!(BrowseCommand::parse("detail 0").is_err());
        assert!(BrowseCommand::parse("dance").is_err());
    }

    #[test]
    fn test_detail_target() {
        let mut c = Coordinator::default();
        c.handle(ViewEvent::DatasetsLoaded(aggregate(&[
            track("A", "X", "M", 3, 9.0),
            track("B", "Y", "N", 5, 4.0),
        ])));

        assert!(detail_target(&c, 1).is_err());

        c.handle(ViewEvent::GranularityChanged(Granularity::Artist));
        assert_eq!(
            detail_target(&c, 1).unwrap(),
            (DetailKind::Artist, "Y".to_string())
        );
        assert!(detail_target(&c, 3).is_err());

        c.handle(ViewEvent::GranularityChanged(Granularity::Album));
        assert_eq!(
            detail_target(&c, 2).unwrap(),
            (DetailKind::Album, "M".to_string())
        );
    }
}
