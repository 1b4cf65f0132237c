//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type (always "page").
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    /// Page title.
    pub title: String,
    /// Version information, present when `version` is expanded.
    #[serde(default)]
    pub version: Version,
    /// Space the page lives in.
    #[serde(default)]
    pub space: Option<Space>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

fn default_content_type() -> String {
    "page".to_owned()
}

impl Page {
    /// Storage format body, if it was expanded in the response.
    #[must_use]
    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Space reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_body_and_version() {
        let json = r#"{
            "id": "42",
            "type": "page",
            "title": "Guide",
            "version": {"number": 7},
            "space": {"key": "DOC"},
            "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}},
            "_links": {"webui": "/display/DOC/Guide"}
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.version.number, 7);
        assert_eq!(page.storage_value(), Some("<p>x</p>"));
        assert_eq!(page.space.unwrap().key, "DOC");
    }

    #[test]
    fn test_page_minimal_fields() {
        let page: Page = serde_json::from_str(r#"{"id": "1", "title": "T"}"#).unwrap();
        assert_eq!(page.content_type, "page");
        assert_eq!(page.version.number, 0);
        assert_eq!(page.storage_value(), None);
    }
}
