//! Confluence REST API types.

mod attachment;
mod page;
mod search;

pub use attachment::{Attachment, AttachmentLinks, AttachmentsResponse};
pub use page::{Body, Links, Page, Space, Storage, Version};
pub use search::{ContentList, ContentSummary, ListLinks, SearchQuery};
