//! Error types for document conversion.

use std::str::Utf8Error;

/// Error during document conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Input bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Decode(#[from] Utf8Error),

    /// The Markdown renderer failed to produce HTML.
    #[error("markdown render failed: {0}")]
    Render(String),
}
