//! Page operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::types::{ContentList, Page};

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub(crate) fn fetch_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), page_id);

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    /// Create a page as a child of `parent_id`.
    pub(crate) fn post_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "ancestors": [{"id": parent_id}],
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        info!("Creating page '{}' under {}", title, parent_id);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!("Created page {} ('{}')", page.id, page.title);
        Ok(page)
    }

    /// Replace page content, storing it as `version`.
    pub(crate) fn put_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        space_key: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version}
        });

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version.saturating_sub(1),
            version
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!(
            "Updated page {} to version {}",
            page_id, page.version.number
        );
        Ok(page)
    }

    /// List direct child pages of a page.
    pub(crate) fn child_pages(
        &self,
        parent_id: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/page?start={start}&limit={limit}",
            self.api_url(),
            parent_id
        );

        info!("Listing children of page {} (start={})", parent_id, start);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }
}
