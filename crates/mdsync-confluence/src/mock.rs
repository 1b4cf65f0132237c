//! In-memory [`ContentApi`] for testing.
//!
//! Provides [`MockContentApi`] for exercising the publisher, image resolver
//! and importer without a Confluence server.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{
    Attachment, AttachmentLinks, Body, ContentList, ContentSummary, ListLinks, Page, SearchQuery,
    Space, Storage, Version,
};

/// Page stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub space_key: String,
    pub body: String,
    pub version: u32,
}

/// Upload recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockUpload {
    pub page_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// Mock Confluence server for testing.
///
/// Pages and attachments live in memory. Use the builder methods to seed
/// state and the inspection methods to assert on what was written.
///
/// # Example
///
/// ```ignore
/// use mdsync_confluence::{ContentApi, MockContentApi};
///
/// let api = MockContentApi::new()
///     .with_page("10", "Parent", None, "<p>root</p>")
///     .with_page("11", "Guide", Some("10"), "<p>guide</p>");
///
/// let found = api.find_page_in_parent("Guide", "10").unwrap();
/// assert_eq!(found.unwrap().id, "11");
/// ```
#[derive(Debug)]
pub struct MockContentApi {
    base_url: String,
    pages: RwLock<Vec<MockPage>>,
    attachments: RwLock<HashMap<String, Vec<Attachment>>>,
    uploads: RwLock<Vec<MockUpload>>,
    next_id: RwLock<u64>,
    fail_child_listing: bool,
}

impl Default for MockContentApi {
    fn default() -> Self {
        Self {
            base_url: "https://confluence.test".to_owned(),
            pages: RwLock::new(Vec::new()),
            attachments: RwLock::new(HashMap::new()),
            uploads: RwLock::new(Vec::new()),
            next_id: RwLock::new(1000),
            fail_child_listing: false,
        }
    }
}

fn not_found(id: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("No content found with id: {id}"),
    }
}

impl MockContentApi {
    /// Create a new empty mock server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page in space `DOC` at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        id: impl Into<String>,
        title: impl Into<String>,
        parent_id: Option<&str>,
        body: impl Into<String>,
    ) -> Self {
        self.pages.write().unwrap().push(MockPage {
            id: id.into(),
            title: title.into(),
            parent_id: parent_id.map(str::to_owned),
            space_key: "DOC".to_owned(),
            body: body.into(),
            version: 1,
        });
        self
    }

    /// Seed an existing attachment on a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment(self, page_id: &str, filename: &str, download: &str) -> Self {
        self.attachments
            .write()
            .unwrap()
            .entry(page_id.to_owned())
            .or_default()
            .push(Attachment {
                id: format!("att-{filename}"),
                title: filename.to_owned(),
                links: AttachmentLinks {
                    download: Some(download.to_owned()),
                },
            });
        self
    }

    /// Make every child page listing fail with a server error.
    #[must_use]
    pub fn with_failing_child_listing(mut self) -> Self {
        self.fail_child_listing = true;
        self
    }

    /// Snapshot of all stored pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn pages(&self) -> Vec<MockPage> {
        self.pages.read().unwrap().clone()
    }

    /// Stored page by ID.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<MockPage> {
        self.pages.read().unwrap().iter().find(|p| p.id == id).cloned()
    }

    /// Every successful upload, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn uploads(&self) -> Vec<MockUpload> {
        self.uploads.read().unwrap().clone()
    }

    fn to_page(page: &MockPage, with_body: bool) -> Page {
        Page {
            id: page.id.clone(),
            content_type: "page".to_owned(),
            title: page.title.clone(),
            version: Version {
                number: page.version,
                message: None,
            },
            space: Some(Space {
                key: page.space_key.clone(),
            }),
            body: with_body.then(|| Body {
                storage: Some(Storage {
                    value: page.body.clone(),
                    representation: "storage".to_owned(),
                }),
            }),
            links: None,
        }
    }

    fn summary(page: &MockPage) -> ContentSummary {
        ContentSummary {
            id: page.id.clone(),
            title: page.title.clone(),
        }
    }

    fn slice(items: Vec<ContentSummary>, start: usize, limit: usize) -> ContentList {
        let total = items.len();
        let results: Vec<_> = items.into_iter().skip(start).take(limit).collect();
        let next = (start + results.len() < total).then(|| format!("?start={}", start + limit));
        ContentList {
            size: results.len(),
            results,
            links: ListLinks { next },
        }
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.write().unwrap();
        *next += 1;
        next.to_string()
    }
}

impl ContentApi for MockContentApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_content(
        &self,
        query: &SearchQuery<'_>,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        let needle = query.text.to_lowercase();
        let hits = self
            .pages
            .read()
            .unwrap()
            .iter()
            .filter(|p| query.space_key.is_none_or(|key| key == p.space_key))
            .filter(|p| {
                p.title.to_lowercase().contains(&needle) || p.body.to_lowercase().contains(&needle)
            })
            .map(Self::summary)
            .collect();
        Ok(Self::slice(hits, start, limit))
    }

    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        self.page(page_id)
            .map(|p| Self::to_page(&p, false))
            .ok_or_else(|| not_found(page_id))
    }

    fn get_page_body(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        self.page(page_id)
            .map(|p| Self::to_page(&p, true))
            .ok_or_else(|| not_found(page_id))
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<Page, ConfluenceError> {
        let exists = self
            .pages
            .read()
            .unwrap()
            .iter()
            .any(|p| p.space_key == space_key && p.title == title);
        if exists {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: "A page with this title already exists".to_owned(),
            });
        }
        let page = MockPage {
            id: self.allocate_id(),
            title: title.to_owned(),
            parent_id: Some(parent_id.to_owned()),
            space_key: space_key.to_owned(),
            body: body.to_owned(),
            version: 1,
        };
        let created = Self::to_page(&page, false);
        self.pages.write().unwrap().push(page);
        Ok(created)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        space_key: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        let mut pages = self.pages.write().unwrap();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| not_found(page_id))?;
        if version != page.version + 1 {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!(
                    "Version must be incremented on update. Current version is: {}",
                    page.version
                ),
            });
        }
        page.title = title.to_owned();
        page.body = body.to_owned();
        page.space_key = space_key.to_owned();
        page.version = version;
        Ok(Self::to_page(page, false))
    }

    fn list_child_pages(
        &self,
        parent_id: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        if self.fail_child_listing {
            return Err(ConfluenceError::HttpResponse {
                status: 500,
                body: "Internal Server Error".to_owned(),
            });
        }
        let children = self
            .pages
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.parent_id.as_deref() == Some(parent_id))
            .map(Self::summary)
            .collect();
        Ok(Self::slice(children, start, limit))
    }

    fn attach_file(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let mut attachments = self.attachments.write().unwrap();
        let existing = attachments.entry(page_id.to_owned()).or_default();
        if existing.iter().any(|a| a.title == filename) {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: format!(
                    "Cannot add a new attachment with same file name as an existing attachment: {filename}"
                ),
            });
        }
        let attachment = Attachment {
            id: format!("att-{filename}"),
            title: filename.to_owned(),
            links: AttachmentLinks {
                download: Some(format!("/download/attachments/{page_id}/{filename}")),
            },
        };
        existing.push(attachment.clone());
        self.uploads.write().unwrap().push(MockUpload {
            page_id: page_id.to_owned(),
            filename: filename.to_owned(),
            content_type: content_type.to_owned(),
            size: data.len(),
        });
        Ok(attachment)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        Ok(self
            .attachments
            .read()
            .unwrap()
            .get(page_id)
            .cloned()
            .unwrap_or_default())
    }
}
