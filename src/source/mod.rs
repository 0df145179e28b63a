//! Line sources.
//!
//! The pipeline reads its input through the [`LineSource`] capability, a
//! forward-only, non-restartable sequence of text lines that can be closed.
//! Two backends implement it:
//! - [`LocalFileSource`]: a file on the local filesystem
//! - [`RemoteObjectSource`]: an object streamed from a storage bucket
//!
//! The backend is chosen once, from [`SourceConfig`], by [`open_source`].

mod lines;
mod local;
mod remote;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::SourceError;

pub use local::LocalFileSource;
pub use remote::{RemoteObject, RemoteObjectSource};

/// Sequential reader of raw record lines.
#[async_trait]
pub trait LineSource: Send {
    /// Next line without its terminator; `None` once the stream is exhausted
    /// or the source has been closed.
    async fn next_line(&mut self) -> Result<Option<String>, SourceError>;

    /// Releases the underlying stream. Safe to call more than once and after
    /// partial consumption.
    async fn close(&mut self);

    /// Lines consumed so far, header included.
    fn lines_read(&self) -> u64;

    /// Human-readable description of where lines come from.
    fn location(&self) -> String;
}

/// Which backend to open, and its parameters.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Local {
        path: PathBuf,
        max_line_bytes: usize,
    },
    Remote {
        object: RemoteObject,
        token: Option<String>,
        timeout: Duration,
        max_line_bytes: usize,
    },
}

/// Opens the configured source and, if `has_header` is set, discards the
/// first line.
///
/// # Errors
///
/// - `SourceUnavailable` / `CredentialsMissing` from the backend
/// - `HeaderReadError` if a header is expected but the stream is empty or
///   unreadable; the source is closed before returning
pub async fn open_source(
    config: &SourceConfig,
    has_header: bool,
) -> Result<Box<dyn LineSource>, SourceError> {
    let mut source: Box<dyn LineSource> = match config {
        SourceConfig::Local {
            path,
            max_line_bytes,
        } => Box::new(LocalFileSource::open(path, *max_line_bytes).await?),
        SourceConfig::Remote {
            object,
            token,
            timeout,
            max_line_bytes,
        } => Box::new(
            RemoteObjectSource::open(object.clone(), token.as_deref(), *timeout, *max_line_bytes)
                .await?,
        ),
    };
    log::info!("Opened source {}", source.location());

    if has_header {
        skip_header(source.as_mut()).await?;
    }
    Ok(source)
}

async fn skip_header(source: &mut dyn LineSource) -> Result<(), SourceError> {
    match source.next_line().await {
        Ok(Some(header)) => {
            log::debug!("Skipped header: {}", header);
            Ok(())
        }
        Ok(None) => {
            source.close().await;
            Err(SourceError::HeaderReadError(format!(
                "{} is empty",
                source.location()
            )))
        }
        Err(e) => {
            source.close().await;
            Err(SourceError::HeaderReadError(e.to_string()))
        }
    }
}
