//! Error type for the command-line tool

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mp2 error: {0}")]
    Mp2(#[from] mp2_core::Error),
}
