//! Stateless HTML to storage format rules.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::color;
use crate::html::{attribute, escape_cdata, outside_cdata, unescape_code};

static CODE_WITH_LANG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code class="language-([^"]+)">(.*?)</code></pre>"#).expect("code with language regex")
});

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre><code>(.*?)</code></pre>").expect("code regex"));

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]+)""#).expect("href regex"));

static TABLE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<table>\s*<tr>").expect("table open regex"));

static TABLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</tr>\s*</table>").expect("table close regex"));

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<br(?:\s*/)?>").expect("br regex"));

static MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<mark\b([^>]*)>(.*?)</mark>").expect("mark regex"));

static SPAN_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<span\b[^>]*>").expect("span regex"));

static CSS_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[0-9a-f]{3,8}\b|rgba?\([^)]*\)").expect("css colour regex")
});

/// Escape CDATA terminators in rendered HTML before any macro embeds it.
pub(super) fn cdata_terminators(html: &str) -> String {
    escape_cdata(html)
}

fn code_macro(language: Option<&str>, code: &str) -> String {
    let code = unescape_code(code);
    let code = escape_cdata(code.strip_suffix('\n').unwrap_or(&code));
    let language = language
        .map(|lang| format!(r#"<ac:parameter ac:name="language">{lang}</ac:parameter>"#))
        .unwrap_or_default();
    format!(
        r#"<ac:structured-macro ac:name="code">{language}<ac:plain-text-body><![CDATA[{code}]]></ac:plain-text-body></ac:structured-macro>"#
    )
}

/// `<pre><code>` blocks to code macros.
pub(super) fn code_blocks(html: &str) -> String {
    let html = CODE_WITH_LANG_RE.replace_all(html, |caps: &Captures<'_>| {
        code_macro(Some(&caps[1]), &caps[2])
    });
    CODE_RE
        .replace_all(&html, |caps: &Captures<'_>| code_macro(None, &caps[1]))
        .into_owned()
}

/// Canonical `&amp;` in every href outside code bodies.
pub(super) fn links(html: &str) -> String {
    outside_cdata(html, |segment| {
        HREF_RE
            .replace_all(segment, |caps: &Captures<'_>| {
                let url = caps[1].replace("&amp;", "&").replace('&', "&amp;");
                format!(r#"<a href="{url}""#)
            })
            .into_owned()
    })
}

/// Add a missing `<tbody>` and normalise line breaks to `<br/>`.
pub(super) fn tables(html: &str) -> String {
    outside_cdata(html, |segment| {
        let segment = TABLE_OPEN_RE.replace_all(segment, "<table><tbody><tr>");
        let segment = TABLE_CLOSE_RE.replace_all(&segment, "</tr></tbody></table>");
        BR_RE.replace_all(&segment, "<br/>").into_owned()
    })
}

/// Background colour declared in a `style` attribute, if any.
fn style_background(style: &str) -> Option<&str> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        let property = property.trim().to_ascii_lowercase();
        (property == "background" || property == "background-color").then_some(value.trim())
    })
}

fn highlight_span(background: Option<&str>) -> String {
    let entry = background
        .and_then(|value| CSS_COLOR_RE.find(value).map(|m| m.as_str()))
        .map_or(color::FALLBACK, color::palette_for);
    format!(
        r#"<span style="background-color: {}; color: {};">"#,
        entry.background, entry.foreground
    )
}

/// Snap `<mark>` and background-styled `<span>` colours to the palette.
pub(super) fn highlights(html: &str) -> String {
    outside_cdata(html, highlight_segment)
}

fn highlight_segment(html: &str) -> String {
    let html = MARK_RE.replace_all(html, |caps: &Captures<'_>| {
        let background = attribute(&caps[1], "style").and_then(style_background);
        format!("{}{}</span>", highlight_span(background), &caps[2])
    });
    SPAN_OPEN_RE
        .replace_all(&html, |caps: &Captures<'_>| {
            let tag = &caps[0];
            match attribute(tag, "style").and_then(style_background) {
                Some(background) => highlight_span(Some(background)),
                None => tag.to_owned(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_blocks_with_language() {
        let html = "<pre><code class=\"language-rust\">if a &lt; b &amp;&amp; c &gt; d {}\n</code></pre>\n";
        assert_eq!(
            code_blocks(html),
            "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">rust</ac:parameter><ac:plain-text-body><![CDATA[if a < b && c > d {}]]></ac:plain-text-body></ac:structured-macro>\n"
        );
    }

    #[test]
    fn test_code_blocks_without_language() {
        assert_eq!(
            code_blocks("<pre><code>x\n</code></pre>"),
            "<ac:structured-macro ac:name=\"code\"><ac:plain-text-body><![CDATA[x]]></ac:plain-text-body></ac:structured-macro>"
        );
    }

    #[test]
    fn test_code_blocks_escape_terminator_once() {
        let html = cdata_terminators("<pre><code>a]]&gt;b\n</code></pre>");
        assert_eq!(
            code_blocks(&html),
            "<ac:structured-macro ac:name=\"code\"><ac:plain-text-body><![CDATA[a]]&gt;b]]></ac:plain-text-body></ac:structured-macro>"
        );
    }

    #[test]
    fn test_links_canonical_ampersands() {
        assert_eq!(
            links(r#"<a href="https://x.io/?a=1&amp;b=2&c=3">x</a>"#),
            r#"<a href="https://x.io/?a=1&amp;b=2&amp;c=3">x</a>"#
        );
    }

    #[test]
    fn test_tables_insert_tbody() {
        assert_eq!(
            tables("<table>\n<tr><td>1</td></tr>\n</table>"),
            "<table><tbody><tr><td>1</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_tables_keep_existing_tbody() {
        let html = "<table><thead><tr><th>a</th></tr></thead><tbody>\n<tr><td>1</td></tr>\n</tbody></table>";
        assert_eq!(tables(html), html);
    }

    #[test]
    fn test_tables_normalise_br() {
        assert_eq!(tables("a<br>b<br />c<br/>d"), "a<br/>b<br/>c<br/>d");
    }

    #[test]
    fn test_rules_skip_cdata_bodies() {
        let code = r#"<![CDATA[<a href="?a=1&b=2"><table><tr><td><span style="background: yellow">x</span><br></td></tr></table>]]>"#;
        let html = format!("<p>a<br>b</p>{code}");
        assert_eq!(links(&html), html);
        assert_eq!(tables(&html), format!("<p>a<br/>b</p>{code}"));
        assert_eq!(highlights(code), code);
    }

    #[test]
    fn test_highlights_mark_with_double_quoted_style() {
        assert_eq!(
            highlights(r#"<mark style="background-color: #FFEBE6">hot</mark>"#),
            r#"<span style="background-color: #FFEBE6; color: #BF2600;">hot</span>"#
        );
    }

    #[test]
    fn test_highlights_span_with_single_quoted_style() {
        assert_eq!(
            highlights("<span style='color: red; background: rgb(255, 250, 200)'>x</span>"),
            r#"<span style="background-color: #FFFAE6; color: #974F0C;">x</span>"#
        );
    }

    #[test]
    fn test_highlights_unparseable_falls_back_to_red() {
        assert_eq!(
            highlights(r#"<span style="background: papayawhip">x</span>"#),
            r#"<span style="background-color: #FFEBE6; color: #BF2600;">x</span>"#
        );
        assert_eq!(
            highlights("<mark>x</mark>"),
            r#"<span style="background-color: #FFEBE6; color: #BF2600;">x</span>"#
        );
    }

    #[test]
    fn test_highlights_plain_span_unchanged() {
        let html = r#"<span class="x" style="color: blue">x</span>"#;
        assert_eq!(highlights(html), html);
    }

    #[test]
    fn test_style_background() {
        assert_eq!(style_background("color: red; Background-Color : #fff"), Some("#fff"));
        assert_eq!(style_background("color: red"), None);
    }
}
