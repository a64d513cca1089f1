//! CLI error types.

use std::convert::Infallible;

use gfmx_config::ConfigError;
use gfmx_renderer::{DocumentError, WalkError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Walk(#[from] WalkError<Infallible>),
}
