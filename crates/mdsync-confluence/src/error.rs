//! Error types for Confluence integration.

/// Message Confluence returns when an attachment with the same name exists.
const DUPLICATE_ATTACHMENT: &str = "Cannot add a new attachment with same file name";

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL is not an http(s) URL.
    #[error("invalid Confluence URL: {0}")]
    InvalidUrl(String),
}

impl ConfluenceError {
    /// Whether the server rejected an upload because the page already has an
    /// attachment with that file name.
    #[must_use]
    pub fn is_duplicate_attachment(&self) -> bool {
        matches!(self, Self::HttpResponse { body, .. } if body.contains(DUPLICATE_ATTACHMENT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_attachment_detected() {
        let err = ConfluenceError::HttpResponse {
            status: 400,
            body: r#"{"message":"Cannot add a new attachment with same file name as an existing attachment: a.png"}"#
                .to_owned(),
        };
        assert!(err.is_duplicate_attachment());
    }

    #[test]
    fn test_other_errors_are_not_duplicates() {
        let err = ConfluenceError::HttpResponse {
            status: 403,
            body: "Forbidden".to_owned(),
        };
        assert!(!err.is_duplicate_attachment());
        assert!(!ConfluenceError::InvalidUrl("x".to_owned()).is_duplicate_attachment());
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = ConfluenceError::HttpResponse {
            status: 404,
            body: "not found".to_owned(),
        };
        assert_eq!(err.to_string(), "HTTP error: 404 - not found");
    }

    #[test]
    fn test_display_includes_cause() {
        let err = ConfluenceError::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "I/O error: disk full");

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfluenceError::from(json);
        assert!(err.to_string().starts_with("JSON error: EOF"));
    }
}
