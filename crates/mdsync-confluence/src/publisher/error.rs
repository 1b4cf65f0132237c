//! Error types for publish operations.

use mdsync_convert::ConvertError;

use crate::error::ConfluenceError;
use crate::images::ImageError;

/// Error during a publish.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// No parent page ID was given and none is configured.
    #[error("parent page ID required (via --parent or confluence.parent_page_id)")]
    MissingParentPage,

    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Markdown conversion failed.
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// Image upload failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Reading the document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
