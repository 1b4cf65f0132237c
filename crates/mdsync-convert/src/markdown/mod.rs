//! Markdown to Confluence storage format.
//!
//! Pipeline for one document:
//! 1. Strip front matter, pre-escape `&` in link targets, drop `[TOC]` lines
//! 2. Hide diagram fences, fold regions and task lines behind tokens
//! 3. Render with pulldown-cmark
//! 4. Rewrite the HTML with [`POST_RULES`], restoring tokens as macros
//!    between [`POST_RULES`] and [`FINAL_RULES`]
//! 5. Prepend the table of contents macro
//!
//! Fold bodies run through steps 2 to 4 again, sharing the same token table.

mod postprocess;
mod preprocess;
mod render;

use std::fmt::Write;

use crate::error::ConvertError;
use crate::front_matter::{encode_link_ampersands, strip_front_matter};
use crate::html::{escape_cdata, escape_xml_attr};
use crate::rule::{self, Rule};
use preprocess::{Placeholders, TOKEN_RE};

/// Rules applied to rendered HTML before tokens are restored.
pub const POST_RULES: [Rule; 3] = [
    Rule::new("cdata_terminators", postprocess::cdata_terminators),
    Rule::new("code_blocks", postprocess::code_blocks),
    Rule::new("links", postprocess::links),
];

/// Rules applied after tokens are restored.
pub const FINAL_RULES: [Rule; 2] = [
    Rule::new("tables", postprocess::tables),
    Rule::new("highlights", postprocess::highlights),
];

/// Table of contents macro placed at the top of every page.
pub const TOC_MACRO: &str = concat!(
    r#"<ac:structured-macro ac:name="toc">"#,
    r#"<ac:parameter ac:name="printable">true</ac:parameter>"#,
    r#"<ac:parameter ac:name="style">disc</ac:parameter>"#,
    r#"<ac:parameter ac:name="maxLevel">3</ac:parameter>"#,
    r#"<ac:parameter ac:name="minLevel">1</ac:parameter>"#,
    "</ac:structured-macro>",
);

/// Converts Markdown into Confluence storage XHTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownToStorage;

impl MarkdownToStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convert a Markdown document to storage format.
    ///
    /// Leading YAML front matter is removed first. The only error comes from
    /// the HTML renderer.
    pub fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        let source = encode_link_ampersands(strip_front_matter(markdown));
        let source = preprocess::drop_toc_markers(&source);
        let mut placeholders = Placeholders::default();
        let body = self.fragment(&source, &mut placeholders)?;
        Ok(format!("{TOC_MACRO}\n{body}"))
    }

    fn fragment(&self, markdown: &str, placeholders: &mut Placeholders) -> Result<String, ConvertError> {
        let text = preprocess::extract_diagrams(markdown, placeholders);
        let text = preprocess::extract_folds(&text, placeholders);
        let text = preprocess::extract_tasks(&text, placeholders);

        let html = render::render_html(&text)?;
        let html = rule::apply_all(&POST_RULES, &html);
        let html = self.restore_placeholders(&html, placeholders)?;
        Ok(rule::apply_all(&FINAL_RULES, &html))
    }

    /// Swap tokens for diagram, task list and expand macros.
    fn restore_placeholders(&self, html: &str, placeholders: &mut Placeholders) -> Result<String, ConvertError> {
        let tokens: Vec<(usize, usize, String, usize)> = TOKEN_RE
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let index = caps[2].parse().ok()?;
                Some((whole.start(), whole.end(), caps[1].to_owned(), index))
            })
            .collect();

        let mut out = String::with_capacity(html.len());
        let mut cursor = 0;
        for (start, end, kind, index) in tokens {
            let replacement = match kind.as_str() {
                "DIAGRAM" => placeholders.diagrams.get(index).map(|body| diagram_macro(body)),
                "TASKS" => match placeholders.tasks.get(index).cloned() {
                    Some(tasks) => Some(task_list_macro(&tasks)?),
                    None => None,
                },
                _ => match placeholders.folds.get(index).cloned() {
                    Some(fold) => {
                        let body = self.fragment(&fold.body, placeholders)?;
                        Some(expand_macro(&fold.title, &body))
                    }
                    None => None,
                },
            };
            let Some(replacement) = replacement else {
                continue;
            };
            out.push_str(&html[cursor..start]);
            out.push_str(&replacement);
            out.push('\n');
            cursor = end;
        }
        out.push_str(&html[cursor..]);
        Ok(out)
    }
}

fn diagram_macro(body: &str) -> String {
    format!(
        "<ac:structured-macro ac:name=\"markdown\"><ac:plain-text-body><![CDATA[```mermaid\n{}\n```]]></ac:plain-text-body></ac:structured-macro>",
        escape_cdata(body)
    )
}

fn expand_macro(title: &str, body: &str) -> String {
    format!(
        r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">{}</ac:parameter><ac:rich-text-body>{}</ac:rich-text-body></ac:structured-macro>"#,
        escape_xml_attr(title),
        body.trim_end()
    )
}

fn task_list_macro(tasks: &[preprocess::Task]) -> Result<String, ConvertError> {
    let mut out = String::from("<ac:task-list>");
    for task in tasks {
        let status = if task.complete { "complete" } else { "incomplete" };
        let body = escape_cdata(&render::render_inline(&task.text)?);
        let _ = write!(
            out,
            "<ac:task><ac:task-status>{status}</ac:task-status><ac:task-body>{body}</ac:task-body></ac:task>"
        );
    }
    out.push_str("</ac:task-list>");
    Ok(out)
}
