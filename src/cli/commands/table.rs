//! One-shot table commands: `upload` and `inspect`.

use std::path::Path;
use tokio::runtime::Runtime;
use tracing::info;

use super::{ViewArgs, client, render};
use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::model::Datasets;
use crate::remote::{HistoryApi, adapter};
use crate::view::{CoordinatorSettings, Session, Status, ViewEvent};

/// Upload an export and print the first page
pub fn cmd_upload(rt: &Runtime, config: &Config, path: &Path, args: &ViewArgs) -> anyhow::Result<()> {
    let api = client(config)?;
    rt.block_on(async {
        let mut session = Session::new(api, settings(config, args));

        info!("Uploading {}", path.display());
        if let Status::Failed(message) = session.upload(path).await {
            anyhow::bail!("Upload failed: {}", message);
        }

        shape(&mut session, args).await?;
        print!("{}", render::page(session.coordinator()));
        Ok(())
    })
}

/// Load a saved upload response and print the first page, all locally
pub fn cmd_inspect(
    rt: &Runtime,
    config: &Config,
    path: &Path,
    args: &ViewArgs,
) -> anyhow::Result<()> {
    let datasets = load_response(path)?;
    let api = client(config)?;
    rt.block_on(async {
        let mut session = Session::new(api, settings(config, args).local_only());
        session.dispatch(ViewEvent::DatasetsLoaded(datasets)).await;

        shape(&mut session, args).await?;
        print!("{}", render::page(session.coordinator()));
        Ok(())
    })
}

/// Read an upload response body from disk
pub(super) fn load_response(path: &Path) -> Result<Datasets> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }
    let body = std::fs::read_to_string(path).with_context(format!("reading {}", path.display()))?;
    let payload = adapter::parse_upload_body(&body)
        .with_context(format!("parsing {}", path.display()))?;
    Ok(payload.into_datasets())
}

fn settings(config: &Config, args: &ViewArgs) -> CoordinatorSettings {
    let mut settings = CoordinatorSettings::from(&config.view);
    if let Some(rows) = args.rows {
        settings.window.initial = rows;
    }
    settings
}

/// Replay the requested granularity, filter and sort as user events
pub(super) async fn shape<A: HistoryApi>(
    session: &mut Session<A>,
    args: &ViewArgs,
) -> anyhow::Result<()> {
    let column = args.sort.unwrap_or_else(|| args.by.default_sort_key());
    if !args.by.has_column(column) {
        anyhow::bail!("{} is not a column of the {} table", column, args.by);
    }

    session
        .dispatch(ViewEvent::GranularityChanged(args.by))
        .await;
    if let Some(term) = &args.filter {
        session.dispatch(ViewEvent::FilterChanged(term.clone())).await;
    }
    if session.coordinator().active_sort().column != column {
        session.dispatch(ViewEvent::SortClicked(column)).await;
    }
    if args.asc {
        session.dispatch(ViewEvent::SortClicked(column)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Granularity};
    use crate::remote::UploadPayload;
    use crate::remote::traits::mocks::MockHistoryApi;
    use crate::test_utils::{many_tracks, track};
    use crate::view::{SortDirection, SortSpec};

    fn mock_session(rows: usize) -> Session<MockHistoryApi> {
        let api = MockHistoryApi::with_payload(UploadPayload {
            songs: many_tracks(rows),
            ..Default::default()
        });
        Session::new(api, CoordinatorSettings::default())
    }

    #[tokio::test]
    async fn test_shape_applies_all_options() {
        let mut session = mock_session(20);
        session.upload(Path::new("export.zip")).await;

        let args = ViewArgs {
            by: Granularity::Artist,
            sort: Some(Column::AlbumCount),
            asc: true,
            filter: Some("artist 1".to_string()),
            rows: None,
        };
        shape(&mut session, &args).await.unwrap();

        let coordinator = session.coordinator();
        assert_eq!(coordinator.state().granularity, Granularity::Artist);
        assert_eq!(coordinator.state().filter_term, "artist 1");
        assert_eq!(
            coordinator.active_sort(),
            SortSpec {
                column: Column::AlbumCount,
                direction: SortDirection::Asc,
            }
        );
        assert_eq!(coordinator.stats().count, 1);
    }

    #[tokio::test]
    async fn test_shape_default_is_plays_desc() {
        let mut session = mock_session(5);
        session.upload(Path::new("export.zip")).await;
        shape(&mut session, &ViewArgs::default()).await.unwrap();
        assert_eq!(
            session.coordinator().active_sort(),
            SortSpec::default_for(Granularity::Song)
        );
    }

    #[tokio::test]
    async fn test_shape_rejects_foreign_column() {
        let mut session = mock_session(5);
        let args = ViewArgs {
            by: Granularity::Song,
            sort: Some(Column::AlbumCount),
            ..Default::default()
        };
        assert!(shape(&mut session, &args).await.is_err());
    }

    #[test]
    fn test_load_response_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.json");
        std::fs::write(
            &path,
            r#"{"message":"ok","data":[{"Song":"A","Artist":"X","Album":"M","Plays":3}]}"#,
        )
        .unwrap();

        let datasets = load_response(&path).unwrap();
        assert_eq!(datasets.songs, vec![track("A", "X", "M", 3, 0.0)]);
        assert_eq!(datasets.albums.len(), 1);
    }

    #[test]
    fn test_load_response_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_response(&missing), Err(Error::NotFound(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        let err = load_response(&broken).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn test_rows_override_window() {
        let args = ViewArgs {
            rows: Some(7),
            ..Default::default()
        };
        assert_eq!(settings(&Config::default(), &args).window.initial, 7);
    }
}
