//! Confluence REST API client.
//!
//! Provides sync HTTP client for Confluence Server/Data Center REST API
//! with HTTP Basic authentication.

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use tracing::info;
use ureq::Agent;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, ContentList, Page, SearchQuery};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    authorization: String,
}

impl ConfluenceClient {
    /// Create client from config values.
    ///
    /// # Arguments
    /// * `base_url` - Confluence server base URL
    /// * `username` - Account name
    /// * `password` - Password or personal access token
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::InvalidUrl`] if `base_url` is not http(s).
    pub fn from_config(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, ConfluenceError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfluenceError::InvalidUrl(base_url.to_owned()));
        }

        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: basic_auth(username, password),
        })
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Decode a JSON response, turning error statuses into [`ConfluenceError::HttpResponse`].
fn read_json<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}

impl ContentApi for ConfluenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_content(
        &self,
        query: &SearchQuery<'_>,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        let cql = query.cql();
        let url = format!(
            "{}/content/search?cql={}&start={start}&limit={limit}",
            self.api_url(),
            utf8_percent_encode(&cql, NON_ALPHANUMERIC)
        );

        info!("Searching content: {} (start={})", cql, start);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        self.fetch_page(page_id, &["version"])
    }

    fn get_page_body(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        self.fetch_page(page_id, &["body.storage", "version"])
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<Page, ConfluenceError> {
        self.post_page(space_key, title, body, parent_id)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        space_key: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        self.put_page(page_id, title, body, space_key, version)
    }

    fn list_child_pages(
        &self,
        parent_id: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        self.child_pages(parent_id, start, limit)
    }

    fn attach_file(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        self.upload_attachment(page_id, filename, data, content_type)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        Ok(self.get_attachments(page_id)?.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        assert_eq!(basic_auth("alice", "s3cret"), "Basic YWxpY2U6czNjcmV0");
    }

    #[test]
    fn test_from_config_trims_trailing_slash() {
        let client = ConfluenceClient::from_config("https://kms.example.com/", "u", "p").unwrap();
        assert_eq!(client.base_url(), "https://kms.example.com");
        assert_eq!(client.api_url(), "https://kms.example.com/rest/api");
        assert_eq!(
            client.page_url("42"),
            "https://kms.example.com/pages/viewpage.action?pageId=42"
        );
    }

    #[test]
    fn test_from_config_rejects_bare_host() {
        let result = ConfluenceClient::from_config("kms.example.com", "u", "p");
        assert!(matches!(result, Err(ConfluenceError::InvalidUrl(_))));
    }
}
