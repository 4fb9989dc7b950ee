//! Command-line error type.

use photomark_core::{EditorError, annotation::ParseColorError};
use photomark_render::{DecodeError, ExportError, RendererError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the `photomark` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid color: {0}")]
    Color(#[from] ParseColorError),
    #[error("invalid display size `{0}`; expected WIDTHxHEIGHT")]
    DisplaySize(String),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("render failed: {0}")]
    Render(#[from] RendererError),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<DecodeError> for CliError {
    fn from(err: DecodeError) -> Self {
        CliError::Editor(err.into())
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        CliError::Editor(err.into())
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Read { .. }
            | CliError::Json { .. }
            | CliError::Color(_)
            | CliError::DisplaySize(_) => 2,
            CliError::Editor(e) if e.is_retryable() => 75,
            _ => 1,
        }
    }
}
