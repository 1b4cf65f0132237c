//! pulldown-cmark rendering.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::error::ConvertError;

/// Parser options: GFM tables, strikethrough, task lists, footnotes and
/// explicit heading attributes.
pub(super) fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render Markdown to XHTML.
///
/// Soft breaks become `<br />`, headings without an explicit id get a slug
/// id, and raw HTML passes through unchanged.
pub(super) fn render_html(markdown: &str) -> Result<String, ConvertError> {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options())
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::write_html_fmt(&mut out, events.into_iter())
        .map_err(|e| ConvertError::Render(e.to_string()))?;
    Ok(out)
}

/// Render a single line of Markdown without the wrapping paragraph.
pub(super) fn render_inline(markdown: &str) -> Result<String, ConvertError> {
    let html = render_html(markdown)?;
    let html = html.trim_end();
    let inner = html
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(html);
    Ok(inner.to_owned())
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let text: String = events[i + 1..]
            .iter()
            .take_while(|e| !matches!(e, Event::End(TagEnd::Heading(_))))
            .filter_map(|e| match e {
                Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect();
        let slug = unique_id(&mut counts, &text);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

fn unique_id(counts: &mut HashMap<String, usize>, text: &str) -> String {
    let base = slugify(text);
    let count = counts.entry(base.clone()).or_default();
    let id = match *count {
        0 => base,
        n => format!("{base}-{n}"),
    };
    *count += 1;
    id
}

/// Lowercase slug; whitespace, dashes and underscores collapse into one dash.
fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }
    if result.ends_with('-') {
        result.pop();
    }
    if result.is_empty() {
        result.push_str("heading");
    }
    result
}
