//! Publisher implementation.

use std::path::Path;

use tracing::{info, warn};

use mdsync_convert::MarkdownToStorage;

use crate::api::ContentApi;
use crate::images::{AttachmentCache, ImageResolver, image_references};
use crate::types::ContentSummary;

use super::PublishConfig;
use super::error::PublishError;
use super::result::{DryRunResult, PublishAction, PublishResult};

/// Publishes Markdown documents as Confluence pages.
pub struct Publisher<'a, C: ContentApi + ?Sized> {
    client: &'a C,
    config: PublishConfig,
    converter: MarkdownToStorage,
}

impl<'a, C: ContentApi + ?Sized> Publisher<'a, C> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(client: &'a C, config: PublishConfig) -> Self {
        Self {
            client,
            config,
            converter: MarkdownToStorage::new(),
        }
    }

    /// Publish a Markdown file.
    ///
    /// The title defaults to the file stem. Local images resolve relative to
    /// the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file cannot be read
    /// - no parent page ID is given or configured
    /// - Confluence API calls fail (except the existing-page lookup)
    pub fn publish(
        &self,
        path: &Path,
        title: Option<&str>,
        parent_page_id: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let markdown = std::fs::read_to_string(path)?;
        let title = title.map_or_else(|| file_title(path), str::to_owned);
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.publish_in(&markdown, &title, parent_page_id, base_dir)
    }

    /// Publish Markdown text. Local images resolve relative to the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Publisher::publish`], minus the file read.
    pub fn publish_content(
        &self,
        markdown: &str,
        title: &str,
        parent_page_id: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        self.publish_in(markdown, title, parent_page_id, Path::new("."))
    }

    /// Preview a publish without uploading or writing anything.
    ///
    /// The existing-page lookup still runs, so the result tells whether the
    /// page would be created or updated.
    ///
    /// # Errors
    ///
    /// Returns an error if no parent page ID is available or conversion fails.
    pub fn dry_run(
        &self,
        markdown: &str,
        title: &str,
        parent_page_id: Option<&str>,
    ) -> Result<DryRunResult, PublishError> {
        let parent = self.parent_page_id(parent_page_id)?;
        let existing = self.find_existing(title, &parent);
        let storage = self.converter.convert(markdown)?;
        let images = image_references(&storage);

        Ok(DryRunResult {
            storage,
            title: title.to_owned(),
            action: if existing.is_some() {
                PublishAction::Updated
            } else {
                PublishAction::Created
            },
            existing_page_id: existing.map(|page| page.id),
            images,
        })
    }

    fn publish_in(
        &self,
        markdown: &str,
        title: &str,
        parent_page_id: Option<&str>,
        base_dir: &Path,
    ) -> Result<PublishResult, PublishError> {
        let parent = self.parent_page_id(parent_page_id)?;
        let existing = self.find_existing(title, &parent);

        let storage = self.converter.convert(markdown)?;

        // New pages have no ID yet, so their images go to the parent
        let attachment_target = existing.as_ref().map_or(parent.as_str(), |page| page.id.as_str());
        let mut cache = AttachmentCache::new();
        let body = ImageResolver::new(self.client).resolve_images(
            &storage,
            base_dir,
            attachment_target,
            &mut cache,
        )?;

        let (page, action) = match existing {
            Some(found) => {
                // Re-read right before writing so the version is current
                let current = self.client.get_page(&found.id)?;
                let page = self.client.update_page(
                    &found.id,
                    title,
                    &body,
                    &self.config.space_key,
                    current.version.number + 1,
                )?;
                (page, PublishAction::Updated)
            }
            None => {
                let page =
                    self.client
                        .create_page(&self.config.space_key, title, &body, &parent)?;
                (page, PublishAction::Created)
            }
        };

        let url = self.client.page_url(&page.id);
        info!(id = %page.id, "Published '{}': {}", title, url);

        Ok(PublishResult {
            page_id: page.id,
            title: title.to_owned(),
            url,
            action,
            version: page.version.number,
            attachments_uploaded: cache.len(),
        })
    }

    /// Call-supplied parent, else the configured one; empty is an error.
    fn parent_page_id(&self, parent_page_id: Option<&str>) -> Result<String, PublishError> {
        parent_page_id
            .or(self.config.parent_page_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .ok_or(PublishError::MissingParentPage)
    }

    /// A failed lookup is treated as "not found".
    fn find_existing(&self, title: &str, parent: &str) -> Option<ContentSummary> {
        match self.client.find_page_in_parent(title, parent) {
            Ok(found) => found,
            Err(err) => {
                warn!(parent = %parent, "Failed to look up existing page '{}': {}", title, err);
                None
            }
        }
    }
}

/// Page title for a Markdown file: its file stem, or `Untitled`.
#[must_use]
pub fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Untitled".to_owned())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockContentApi;

    fn config(parent: Option<&str>) -> PublishConfig {
        PublishConfig {
            space_key: "DOC".to_owned(),
            parent_page_id: parent.map(str::to_owned),
        }
    }

    fn api() -> MockContentApi {
        MockContentApi::new().with_page("100", "Parent", None, "")
    }

    #[test]
    fn test_publish_creates_page_under_parent() {
        let api = api();
        let publisher = Publisher::new(&api, config(Some("100")));
        let result = publisher.publish_content("# Hello", "Guide", None).unwrap();

        assert_eq!(result.action, PublishAction::Created);
        assert_eq!(result.version, 1);
        assert_eq!(
            result.url,
            format!("https://confluence.test/pages/viewpage.action?pageId={}", result.page_id)
        );
        let page = api.page(&result.page_id).unwrap();
        assert_eq!(page.parent_id.as_deref(), Some("100"));
        assert!(page.body.starts_with("<ac:structured-macro ac:name=\"toc\">"));
        assert!(page.body.contains("<h1 id=\"hello\">Hello</h1>"));
    }

    #[test]
    fn test_publish_twice_updates_same_page() {
        let api = api();
        let publisher = Publisher::new(&api, config(Some("100")));
        let first = publisher.publish_content("# v1", "Guide", None).unwrap();
        let second = publisher.publish_content("# v2", "Guide", None).unwrap();

        assert_eq!(second.action, PublishAction::Updated);
        assert_eq!(second.page_id, first.page_id);
        assert_eq!(second.version, first.version + 1);
        assert_eq!(api.pages().iter().filter(|p| p.title == "Guide").count(), 1);
        assert!(api.page(&first.page_id).unwrap().body.contains("v2"));
    }

    #[test]
    fn test_call_parent_overrides_configured() {
        let api = api().with_page("200", "Other", None, "");
        let publisher = Publisher::new(&api, config(Some("100")));
        let result = publisher.publish_content("x", "Guide", Some("200")).unwrap();
        assert_eq!(api.page(&result.page_id).unwrap().parent_id.as_deref(), Some("200"));
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let api = api();
        let publisher = Publisher::new(&api, config(None));
        let err = publisher.publish_content("x", "Guide", Some("  ")).unwrap_err();
        assert!(matches!(err, PublishError::MissingParentPage));
        assert_eq!(api.pages().len(), 1);
    }

    #[test]
    fn test_lookup_failure_falls_back_to_create() {
        let api = api().with_failing_child_listing();
        let publisher = Publisher::new(&api, config(Some("100")));
        let result = publisher.publish_content("x", "Guide", None).unwrap();
        assert_eq!(result.action, PublishAction::Created);
    }

    #[test]
    fn test_create_error_propagates() {
        // Same title elsewhere in the space: lookup misses, create is rejected
        let api = api().with_page("5", "Guide", None, "");
        let publisher = Publisher::new(&api, config(Some("100")));
        let err = publisher.publish_content("x", "Guide", None).unwrap_err();
        assert!(matches!(err, PublishError::Confluence(_)));
    }

    #[test]
    fn test_publish_file_uploads_images_to_existing_page() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shot.png"), b"\x89PNG").unwrap();
        let doc = dir.path().join("Guide.md");
        fs::write(&doc, "---\ntitle: ignored\n---\n![shot](shot.png)\n").unwrap();

        let api = api().with_page("300", "Guide", Some("100"), "<p>old</p>");
        let publisher = Publisher::new(&api, config(Some("100")));
        let result = publisher.publish(&doc, None, None).unwrap();

        assert_eq!(result.page_id, "300");
        assert_eq!(result.title, "Guide");
        assert_eq!(result.attachments_uploaded, 1);
        assert_eq!(api.uploads()[0].page_id, "300");
        let body = api.page("300").unwrap().body;
        assert!(body.contains(
            r#"<ac:image><ri:url ri:value="https://confluence.test/download/attachments/300/shot.png"/></ac:image>"#
        ));
        assert!(!body.contains("title: ignored"));
    }

    #[test]
    fn test_new_page_images_go_to_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shot.png"), b"\x89PNG").unwrap();
        let doc = dir.path().join("New.md");
        fs::write(&doc, "![shot](shot.png)").unwrap();

        let api = api();
        Publisher::new(&api, config(Some("100")))
            .publish(&doc, Some("Fresh"), None)
            .unwrap();
        assert_eq!(api.uploads()[0].page_id, "100");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let api = api().with_page("300", "Guide", Some("100"), "<p>old</p>");
        let publisher = Publisher::new(&api, config(Some("100")));
        let preview = publisher.dry_run("![a](a.png)\n\nText", "Guide", None).unwrap();

        assert_eq!(preview.action, PublishAction::Updated);
        assert_eq!(preview.existing_page_id.as_deref(), Some("300"));
        assert_eq!(preview.images.len(), 1);
        assert_eq!(preview.images[0].path, "a.png");
        assert_eq!(api.page("300").unwrap().version, 1);
        assert!(api.uploads().is_empty());
    }

    #[test]
    fn test_file_title() {
        assert_eq!(file_title(Path::new("docs/Release Notes.md")), "Release Notes");
        assert_eq!(file_title(Path::new("/")), "Untitled");
    }
}
