//! Image upload and embedding.
//!
//! [`ImageResolver::resolve_images`] rewrites every image reference in a
//! converted page body into an `<ac:image>` macro:
//!
//! - remote URLs are embedded directly
//! - local files are located on disk, uploaded as page attachments and
//!   embedded by their download URL
//! - files that cannot be found are dropped with a warning
//!
//! Uploads are remembered in an [`AttachmentCache`] owned by the caller, so one
//! path referenced twice in a run is uploaded once.

mod locate;
mod reference;

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use mdsync_convert::html::escape_xml_attr;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
pub use locate::{ResolutionState, candidates, locate};
pub use reference::{ImageReference, ImageSyntax, image_references};

/// Content type used when the extension is unknown.
const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Error while uploading an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Confluence API error other than a duplicate file name.
    #[error("failed to upload image: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Reading the image file failed.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// Upload was rejected as a duplicate but no attachment has that name.
    #[error("failed to find existing attachment: {0}")]
    DuplicateNotFound(String),
}

/// Absolute URLs of images uploaded during one run, keyed by the path as
/// written in the document.
#[derive(Debug, Default, Clone)]
pub struct AttachmentCache {
    uploaded: HashMap<String, String>,
}

impl AttachmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URL recorded for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.uploaded.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: impl Into<String>, url: impl Into<String>) {
        self.uploaded.insert(path.into(), url.into());
    }

    /// Number of distinct uploaded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }
}

/// `<ac:image>` macro embedding `url`.
fn image_macro(url: &str, width: Option<u32>) -> String {
    let escaped = escape_xml_attr(url);
    match width {
        Some(width) => format!(r#"<ac:image ac:width="{width}"><ri:url ri:value="{escaped}"/></ac:image>"#),
        None => format!(r#"<ac:image><ri:url ri:value="{escaped}"/></ac:image>"#),
    }
}

/// Uploads local images and embeds them as `<ac:image>` macros.
pub struct ImageResolver<'a, C: ContentApi + ?Sized> {
    client: &'a C,
}

impl<'a, C: ContentApi + ?Sized> ImageResolver<'a, C> {
    #[must_use]
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Rewrite image references in `content`, attaching local files to `page_id`.
    ///
    /// Missing files are dropped from the output with a warning. Upload
    /// failures other than a duplicate file name are returned as errors.
    pub fn resolve_images(
        &self,
        content: &str,
        base_dir: &Path,
        page_id: &str,
        cache: &mut AttachmentCache,
    ) -> Result<String, ImageError> {
        reference::rewrite_references(content, |reference| {
            self.resolve_reference(reference, base_dir, page_id, cache)
        })
    }

    fn resolve_reference(
        &self,
        reference: &ImageReference,
        base_dir: &Path,
        page_id: &str,
        cache: &mut AttachmentCache,
    ) -> Result<String, ImageError> {
        match locate(base_dir, &reference.path) {
            ResolutionState::Remote(url) => Ok(image_macro(&url, reference.width)),
            ResolutionState::Local(file) => {
                let url = match cache.get(&reference.path) {
                    Some(url) => url.to_owned(),
                    None => {
                        let url = self.upload(&file, page_id)?;
                        cache.insert(reference.path.clone(), url.clone());
                        url
                    }
                };
                Ok(image_macro(&url, reference.width))
            }
            ResolutionState::Missing(tried) => {
                warn!(path = %reference.path, "Image file not found");
                for candidate in &tried {
                    debug!("Searched {}", candidate.display());
                }
                Ok(String::new())
            }
        }
    }

    /// Upload `file` and return its absolute download URL.
    fn upload(&self, file: &Path, page_id: &str) -> Result<String, ImageError> {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(file)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let data = std::fs::read(file)?;

        let download = match self.client.attach_file(page_id, &filename, &data, content_type) {
            Ok(attachment) => {
                info!("Uploaded image {}", filename);
                attachment.download_url(page_id)
            }
            Err(err) if err.is_duplicate_attachment() => {
                info!("Image {} already attached, reusing it", filename);
                self.client
                    .list_attachments(page_id)?
                    .into_iter()
                    .find(|a| a.title == filename)
                    .map(|a| a.download_url(page_id))
                    .ok_or(ImageError::DuplicateNotFound(filename))?
            }
            Err(err) => return Err(err.into()),
        };

        Ok(self.absolute(&download))
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_owned();
        }
        let base = self.client.base_url().trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }
}
