//! Conversion between Markdown and Confluence storage format.
//!
//! This crate holds the text pipelines used by `mdsync` in both directions:
//! - [`StorageToMarkdown`]: imports a Confluence page body (XHTML storage format
//!   with `ac:` macros) into Markdown
//! - [`MarkdownToStorage`]: renders Markdown with `pulldown-cmark` and rewrites
//!   the HTML into storage format macros (code, expand, diagrams, task lists, TOC)
//! - [`color`]: nearest-palette mapping for inline highlight colours
//!
//! Both converters are organised as ordered lists of named rewrite rules. The
//! order matters: every rule runs on the output of the previous one and never
//! needs to see patterns an earlier rule already consumed.
//!
//! # Example
//!
//! ```
//! use mdsync_convert::{MarkdownToStorage, StorageToMarkdown};
//!
//! let storage = MarkdownToStorage::new().convert("# Title\n\n**Bold** text").unwrap();
//! assert!(storage.contains("<strong>Bold</strong>"));
//!
//! let markdown = StorageToMarkdown::new().convert("<h1>Title</h1><p>Body</p>");
//! assert_eq!(markdown, "# Title\n\nBody\n");
//! ```

pub mod color;
mod error;
pub mod front_matter;
pub mod html;
mod markdown;
mod rule;
mod storage;

pub use error::ConvertError;
pub use markdown::MarkdownToStorage;
pub use rule::Rule;
pub use storage::{StorageToMarkdown, storage_bytes_to_markdown};
