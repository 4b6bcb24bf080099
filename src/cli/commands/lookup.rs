//! Album/artist detail and monthly top songs.

use tokio::runtime::Runtime;

use super::{client, render};
use crate::config::Config;
use crate::remote::{DetailKind, RemoteError, domain::group_by_month};

/// Print the songs behind one album or artist
pub fn cmd_detail(rt: &Runtime, config: &Config, kind: DetailKind, name: &str) -> anyhow::Result<()> {
    let api = client(config)?;
    rt.block_on(async {
        match api.detail(kind, name).await {
            Ok(view) => print!("{}", render::detail(&view, config.view.initial_rows)),
            Err(RemoteError::NotFound) => println!("No {} named \"{}\".", kind, name),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    })
}

/// Print the top songs of every month
pub fn cmd_monthly(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    let api = client(config)?;
    rt.block_on(async {
        let songs = api.monthly_top_songs().await?;
        print!("{}", render::monthly(&group_by_month(songs)));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serve_once;

    fn config_for(base_url: String) -> Config {
        let mut config = Config::default();
        config.server.base_url = base_url;
        config
    }

    #[test]
    fn test_detail_not_found_is_not_an_error() {
        let rt = Runtime::new().unwrap();
        let (base_url, request) = rt.block_on(serve_once(404, r#"{"message":"No data"}"#));

        cmd_detail(&rt, &config_for(base_url), DetailKind::Album, "Blue").unwrap();
        let request = rt.block_on(request).unwrap();
        assert!(request.starts_with("GET /api/data/detail/album/Blue"));
    }

    #[test]
    fn test_monthly_server_error_propagates() {
        let rt = Runtime::new().unwrap();
        let (base_url, _request) = rt.block_on(serve_once(500, r#"{"error":"boom"}"#));

        let err = cmd_monthly(&rt, &config_for(base_url)).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
