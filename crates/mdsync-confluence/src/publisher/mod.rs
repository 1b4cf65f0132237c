//! Page publisher for Confluence.
//!
//! This module provides the [`Publisher`] struct that encapsulates the entire
//! workflow for publishing a Markdown document as a child of a parent page:
//!
//! 1. Look up a child of the parent with the same title
//! 2. Convert Markdown to Confluence storage format
//! 3. Upload local images to the existing page (or the parent, for new pages)
//! 4. Update the existing page at its next version, or create a new one
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use mdsync_confluence::{ConfluenceClient, PublishConfig, Publisher};
//!
//! let client = ConfluenceClient::from_config("https://kms.example.com", "user", "token")?;
//! let config = PublishConfig {
//!     space_key: "DOC".to_owned(),
//!     parent_page_id: Some("123456".to_owned()),
//! };
//! let publisher = Publisher::new(&client, config);
//!
//! let result = publisher.publish(Path::new("docs/guide.md"), None, None)?;
//! println!("{}", result.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod result;

pub use error::PublishError;
pub use executor::{Publisher, file_title};
pub use result::{DryRunResult, PublishAction, PublishResult};

/// Remote placement of published pages.
#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Space new pages are created in.
    pub space_key: String,
    /// Parent used when a publish call does not name one.
    pub parent_page_id: Option<String>,
}
