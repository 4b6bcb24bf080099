//! Crate error type for work that touches the filesystem.
//!
//! The backend client and the config layer keep their own `thiserror` enums
//! ([`RemoteError`], [`ConfigError`]). Commands that read saved responses or
//! write the config file lift those into [`Error`] with a short context
//! string, and `anyhow` takes over at the binary edge.
//!
//! ```ignore
//! use history_viewer::error::{Result, ResultExt};
//!
//! fn read_export(path: &Path) -> Result<UploadPayload> {
//!     let body = std::fs::read_to_string(path).with_context("reading export")?;
//!     adapter::parse_upload_body(&body).with_context("parsing export")
//! }
//! ```

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::remote::RemoteError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend request failed or its body did not parse
    #[error("Backend error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Saved response file does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Wrap with a description of what was being attempted.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Attach context while converting into [`Error`].
pub trait ResultExt<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(ctx))
    }
}
