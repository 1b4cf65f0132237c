//! Import Confluence pages as Markdown.

use std::path::{Path, PathBuf};

use tracing::info;

use mdsync_convert::StorageToMarkdown;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::SearchQuery;

/// Error during an import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// The page response carried no storage body.
    #[error("page {0} has no storage body")]
    MissingBody(String),

    /// Writing Markdown files failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page converted to Markdown.
#[derive(Debug, Clone)]
pub struct ImportedPage {
    pub id: String,
    pub title: String,
    pub markdown: String,
}

/// Downloads pages and converts them to Markdown.
pub struct Importer<'a, C: ContentApi + ?Sized> {
    client: &'a C,
    converter: StorageToMarkdown,
}

impl<'a, C: ContentApi + ?Sized> Importer<'a, C> {
    #[must_use]
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            converter: StorageToMarkdown::new(),
        }
    }

    /// Fetch one page and convert its body.
    pub fn import_page(&self, page_id: &str) -> Result<ImportedPage, ImportError> {
        let page = self.client.get_page_body(page_id)?;
        let storage = page
            .storage_value()
            .ok_or_else(|| ImportError::MissingBody(page_id.to_owned()))?;
        let markdown = self.converter.convert(storage);
        Ok(ImportedPage {
            id: page.id,
            title: page.title,
            markdown,
        })
    }

    /// Import every search hit into `output_dir` as `<title>.md`.
    ///
    /// Returns the written paths in search order.
    pub fn import_search(
        &self,
        query: &SearchQuery<'_>,
        page_size: usize,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ImportError> {
        let hits = self.client.search_all(query, page_size)?;
        info!("Found {} pages for '{}'", hits.len(), query.text);

        std::fs::create_dir_all(output_dir)?;
        let mut written = Vec::with_capacity(hits.len());
        for hit in hits {
            let page = self.import_page(&hit.id)?;
            let path = output_dir.join(file_name(&page.title));
            std::fs::write(&path, &page.markdown)?;
            info!(id = %page.id, "Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// `<title>.md` with `/` replaced by `_`.
fn file_name(title: &str) -> String {
    format!("{}.md", title.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockContentApi;

    #[test]
    fn test_import_page_converts_body() {
        let api = MockContentApi::new().with_page("1", "Guide", None, "<h1>Guide</h1><p>Hello <strong>you</strong></p>");
        let page = Importer::new(&api).import_page("1").unwrap();
        assert_eq!(page.title, "Guide");
        assert_eq!(page.markdown, "# Guide\n\nHello **you**\n");
    }

    #[test]
    fn test_import_page_unknown_id() {
        let api = MockContentApi::new();
        let err = Importer::new(&api).import_page("9").unwrap_err();
        assert!(matches!(err, ImportError::Confluence(ConfluenceError::HttpResponse { status: 404, .. })));
    }

    #[test]
    fn test_import_search_writes_files() {
        let api = MockContentApi::new()
            .with_page("1", "Deploy guide", None, "<p>deploy steps</p>")
            .with_page("2", "CI/CD", None, "<p>how we deploy</p>")
            .with_page("3", "Unrelated", None, "<p>nothing</p>");
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("docs");

        let written = Importer::new(&api)
            .import_search(&SearchQuery::pages("deploy"), 1, &out)
            .unwrap();

        assert_eq!(written, vec![out.join("Deploy guide.md"), out.join("CI_CD.md")]);
        assert_eq!(fs::read_to_string(out.join("CI_CD.md")).unwrap(), "how we deploy\n");
    }

    #[test]
    fn test_file_name_replaces_slashes() {
        assert_eq!(file_name("a/b/c"), "a_b_c.md");
    }
}
