//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: AttachmentLinks,
}

/// Attachment links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentLinks {
    /// Download path, relative to the server base URL.
    #[serde(default)]
    pub download: Option<String>,
}

impl Attachment {
    /// Download URL as reported by the server, or the conventional
    /// `/download/attachments/{page}/{file}` path when it is missing.
    #[must_use]
    pub fn download_url(&self, page_id: &str) -> String {
        self.links.download.clone().unwrap_or_else(|| {
            let filename =
                percent_encoding::utf8_percent_encode(&self.title, percent_encoding::NON_ALPHANUMERIC);
            format!("/download/attachments/{page_id}/{filename}")
        })
    }
}

/// Attachments API response.
///
/// Only includes `results` since we only need the attachment list.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}
