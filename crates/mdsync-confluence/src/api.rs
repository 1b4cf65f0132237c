//! Content API seam.
//!
//! [`ContentApi`] lists the remote operations the publisher, image resolver
//! and importer rely on. [`crate::ConfluenceClient`] implements it over REST;
//! `MockContentApi` (feature `mock`) implements it in memory.

use tracing::debug;

use crate::error::ConfluenceError;
use crate::types::{Attachment, ContentList, ContentSummary, Page, SearchQuery};

/// Page size used when scanning the children of a parent page.
pub const CHILD_PAGE_LIMIT: usize = 100;

/// Remote content operations.
pub trait ContentApi {
    /// Server base URL without a trailing slash.
    fn base_url(&self) -> &str;

    /// One page of search results starting at `start`.
    fn search_content(
        &self,
        query: &SearchQuery<'_>,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError>;

    /// Page metadata with the current version.
    ///
    /// Always reads the latest version; callers rely on it right before an update.
    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError>;

    /// Page metadata with the storage format body expanded.
    fn get_page_body(&self, page_id: &str) -> Result<Page, ConfluenceError>;

    /// Create a page under `parent_id` in `space_key`.
    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<Page, ConfluenceError>;

    /// Replace a page body, storing it as `version`.
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        space_key: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError>;

    /// One page of the direct children of `parent_id`.
    fn list_child_pages(
        &self,
        parent_id: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError>;

    /// Upload a new attachment.
    ///
    /// Fails with an error for which [`ConfluenceError::is_duplicate_attachment`]
    /// holds when the page already has an attachment with that name.
    fn attach_file(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError>;

    /// Attachments of a page.
    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError>;

    /// Human viewable URL of a page.
    fn page_url(&self, page_id: &str) -> String {
        format!("{}/pages/viewpage.action?pageId={page_id}", self.base_url())
    }

    /// Find a direct child of `parent_id` titled exactly `title`.
    fn find_page_in_parent(
        &self,
        title: &str,
        parent_id: &str,
    ) -> Result<Option<ContentSummary>, ConfluenceError> {
        let mut start = 0;
        loop {
            let list = self.list_child_pages(parent_id, start, CHILD_PAGE_LIMIT)?;
            let count = list.results.len();
            let has_next = list.has_next();
            if let Some(found) = list.results.into_iter().find(|page| page.title == title) {
                debug!(id = %found.id, "Found page '{}' under {}", title, parent_id);
                return Ok(Some(found));
            }
            if count < CHILD_PAGE_LIMIT || !has_next {
                return Ok(None);
            }
            start += CHILD_PAGE_LIMIT;
        }
    }

    /// Every search hit, fetched `page_size` results at a time.
    fn search_all(
        &self,
        query: &SearchQuery<'_>,
        page_size: usize,
    ) -> Result<Vec<ContentSummary>, ConfluenceError> {
        let page_size = page_size.max(1);
        let mut hits = Vec::new();
        let mut start = 0;
        loop {
            let list = self.search_content(query, start, page_size)?;
            let count = list.results.len();
            hits.extend(list.results);
            if count < page_size {
                return Ok(hits);
            }
            start += page_size;
        }
    }
}
