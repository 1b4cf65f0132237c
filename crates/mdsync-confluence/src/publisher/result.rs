//! Result types for publish operations.

use crate::images::ImageReference;

/// What a publish did, or would do, to the remote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// A new page was created under the parent.
    Created,
    /// The existing page with the same title was updated.
    Updated,
}

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Final page ID.
    pub page_id: String,
    /// Page title.
    pub title: String,
    /// URL to view the page.
    pub url: String,
    pub action: PublishAction,
    /// Page version after the publish.
    pub version: u32,
    /// Number of distinct local images uploaded or reused.
    pub attachments_uploaded: usize,
}

/// Result of a dry-run publish (no changes made).
#[derive(Debug, Clone)]
pub struct DryRunResult {
    /// Converted storage format body, images not yet resolved.
    pub storage: String,
    /// Page title.
    pub title: String,
    /// Action a real publish would take.
    pub action: PublishAction,
    /// ID of the page that would be updated.
    pub existing_page_id: Option<String>,
    /// Image references that would be resolved.
    pub images: Vec<ImageReference>,
}
