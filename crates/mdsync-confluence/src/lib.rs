//! Confluence integration for mdsync.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST API client with Basic authentication
//! - [`ContentApi`]: the remote operations everything else is written against
//! - [`ImageResolver`]: uploads local images and embeds them as `<ac:image>` macros
//! - [`Publisher`]: creates or updates a page from a Markdown document
//! - [`Importer`]: converts existing pages back to Markdown
//! - `MockContentApi`: in-memory server for tests (behind `mock` feature flag)

pub mod api;
mod client;
mod error;
pub mod images;
mod importer;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod publisher;
pub mod types;

pub use api::ContentApi;
pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use images::{AttachmentCache, ImageError, ImageResolver};
pub use importer::{ImportError, ImportedPage, Importer};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockContentApi, MockPage, MockUpload};
pub use publisher::{
    DryRunResult, PublishAction, PublishConfig, PublishError, PublishResult, Publisher, file_title,
};
pub use types::{Page, SearchQuery};
