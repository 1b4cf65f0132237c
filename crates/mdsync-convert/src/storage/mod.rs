//! Confluence storage format to Markdown.
//!
//! The converter is a fixed, ordered list of [`Rule`]s. Block rules run first
//! and convert the inline content they contain before flattening it to text,
//! so formatting and links inside paragraphs, list items and table cells
//! survive. Rules later in the list handle whatever is left outside blocks.

mod blocks;
mod inline;
mod macros;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConvertError;
use crate::rule::{self, Rule};

/// Storage-to-Markdown rules in application order.
pub const RULES: [Rule; 18] = [
    Rule::new("preprocess", blocks::preprocess),
    Rule::new("headings", blocks::headings),
    Rule::new("paragraphs", blocks::paragraphs),
    Rule::new("unordered_lists", blocks::unordered_lists),
    Rule::new("ordered_lists", blocks::ordered_lists),
    Rule::new("tables", blocks::tables),
    Rule::new("links", inline::links),
    Rule::new("images", inline::images),
    Rule::new("code", macros::code),
    Rule::new("macros", macros::structured_macros),
    Rule::new("formatting", inline::formatting),
    Rule::new("task_lists", macros::task_lists),
    Rule::new("blockquotes", blocks::blockquotes),
    Rule::new("attachments", macros::attachments),
    Rule::new("emoticons", inline::emoticons),
    Rule::new("mentions", inline::mentions),
    Rule::new("status", macros::status),
    Rule::new("postprocess", postprocess),
];

/// Converts Confluence storage XHTML into Markdown.
#[derive(Debug, Clone, Copy)]
pub struct StorageToMarkdown {
    rules: &'static [Rule],
}

impl StorageToMarkdown {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: &RULES }
    }

    /// The rules this converter applies, in order.
    #[must_use]
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Convert a storage format document to Markdown.
    ///
    /// Never fails: unknown macros are dropped and malformed markup is passed
    /// through as text.
    #[must_use]
    pub fn convert(&self, storage: &str) -> String {
        rule::apply_all(self.rules, storage)
    }
}

impl Default for StorageToMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode `bytes` as UTF-8 and convert them to Markdown.
pub fn storage_bytes_to_markdown(bytes: &[u8]) -> Result<String, ConvertError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(StorageToMarkdown::new().convert(text))
}

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<ac:parameter\b[^>]*?\bac:name="([^"]*)"[^>]*>(.*?)</ac:parameter>"#)
        .expect("parameter regex")
});

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank lines regex"));

static TRAILING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("trailing space regex"));

static LINE_BREAK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("line break run regex"));

/// Plain-text value of the macro parameter `name` within `section`.
fn macro_param(section: &str, name: &str) -> Option<String> {
    PARAM_RE
        .captures_iter(section)
        .find(|caps| &caps[1] == name)
        .map(|caps| crate::html::strip_html(&caps[2]).trim().to_owned())
}

/// Collapse `text` to one line, for list items and table cells.
fn single_line(text: &str) -> String {
    LINE_BREAK_RUN_RE.replace_all(text.trim(), " ").into_owned()
}

fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES_RE.replace_all(text, "\n\n").into_owned()
}

fn postprocess(input: &str) -> String {
    let text = collapse_blank_lines(input);
    let text = TRAILING_SPACE_RE.replace_all(&text, "\n");
    let text = text.trim_start_matches(['\n', '\r']).trim_end();
    format!("{text}\n")
}
