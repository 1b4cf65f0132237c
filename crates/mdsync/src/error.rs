//! CLI error types.

use mdsync_config::ConfigError;
use mdsync_confluence::{ConfluenceError, ImportError, PublishError};
use mdsync_convert::ConvertError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Convert(#[from] ConvertError),
}
