//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

/// Comment stored with every uploaded attachment.
const UPLOAD_COMMENT: &str = "Uploaded by mdsync";

/// Multipart body with one file part and one comment part.
fn multipart_body(boundary: &str, filename: &str, data: &[u8], content_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
    body.extend_from_slice(UPLOAD_COMMENT.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

impl ConfluenceClient {
    /// Upload a new attachment to a page.
    ///
    /// A name clash is reported by the server as an error status; see
    /// [`ConfluenceError::is_duplicate_attachment`].
    pub(crate) fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!(
            "Uploading attachment '{}' to page {}",
            filename, page_id
        );

        let boundary = format!("----MdsyncFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, filename, data, content_type);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        // New uploads come back as a result list
        let response: AttachmentsResponse = read_json(response)?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ConfluenceError::HttpResponse {
                status: 200,
                body: "Empty attachment response".to_owned(),
            })
    }

    /// List attachments on a page.
    pub(crate) fn get_attachments(
        &self,
        page_id: &str,
    ) -> Result<AttachmentsResponse, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!("Getting attachments for page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }
}
