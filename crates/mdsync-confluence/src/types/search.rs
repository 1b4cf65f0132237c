//! Content listing and search types.

use serde::Deserialize;

/// Page of content results from search or child listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentList {
    /// Results on this page.
    pub results: Vec<ContentSummary>,
    /// Number of results on this page.
    #[serde(default)]
    pub size: usize,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: ListLinks,
}

impl ContentList {
    /// Whether the server advertises another page of results.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.links.next.is_some()
    }
}

/// Pagination links of a [`ContentList`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLinks {
    /// Relative link to the next page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Identifier and title of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentSummary {
    /// Content ID.
    pub id: String,
    /// Content title.
    pub title: String,
}

/// Full-text content search.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    /// Text to match.
    pub text: &'a str,
    /// Restrict to one space.
    pub space_key: Option<&'a str>,
    /// Restrict to a content type such as `page`.
    pub content_type: Option<&'a str>,
}

impl<'a> SearchQuery<'a> {
    /// Search pages for `text` in any space.
    #[must_use]
    pub fn pages(text: &'a str) -> Self {
        Self {
            text,
            space_key: None,
            content_type: Some("page"),
        }
    }

    /// Restrict the search to one space.
    #[must_use]
    pub fn in_space(mut self, space_key: Option<&'a str>) -> Self {
        self.space_key = space_key;
        self
    }

    /// CQL expression for this query.
    #[must_use]
    pub fn cql(&self) -> String {
        let mut cql = format!("text ~ \"{}\"", escape_cql(self.text));
        if let Some(space) = self.space_key {
            cql.push_str(&format!(" AND space = \"{}\"", escape_cql(space)));
        }
        if let Some(kind) = self.content_type {
            cql.push_str(&format!(" AND type = \"{}\"", escape_cql(kind)));
        }
        cql
    }
}

fn escape_cql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cql_text_only() {
        let query = SearchQuery {
            text: "deploy",
            space_key: None,
            content_type: None,
        };
        assert_eq!(query.cql(), r#"text ~ "deploy""#);
    }

    #[test]
    fn test_cql_with_space_and_type() {
        let query = SearchQuery::pages("release notes").in_space(Some("DOC"));
        assert_eq!(
            query.cql(),
            r#"text ~ "release notes" AND space = "DOC" AND type = "page""#
        );
    }

    #[test]
    fn test_cql_escapes_quotes() {
        assert_eq!(SearchQuery::pages(r#"say "hi""#).cql(), r#"text ~ "say \"hi\"" AND type = "page""#);
    }

    #[test]
    fn test_content_list_has_next() {
        let json = r#"{"results": [{"id": "1", "title": "A"}], "size": 1, "_links": {"next": "/rest/api/x?start=1"}}"#;
        let list: ContentList = serde_json::from_str(json).unwrap();
        assert!(list.has_next());
        let json = r#"{"results": [], "size": 0, "_links": {}}"#;
        let list: ContentList = serde_json::from_str(json).unwrap();
        assert!(!list.has_next());
    }
}
