//! Text helpers for tags, entities and escaping.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex")
});

/// Value of the attribute `name` inside a single tag, as written.
#[must_use]
pub fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTR_RE
        .captures_iter(tag)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
}

/// Named entities decoded by [`decode_entities`], `&amp;` last.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&hellip;", "..."),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&trade;", "\u{2122}"),
    ("&copy;", "\u{00A9}"),
    ("&reg;", "\u{00AE}"),
    ("&amp;", "&"),
];

/// Remove every tag, then decode the supported named entities.
///
/// CDATA sections are unwrapped and their text kept literally.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let text = outside_cdata(input, |segment| decode_entities(&TAG_RE.replace_all(segment, "")));
    CDATA_RE.replace_all(&text, "${1}").into_owned()
}

/// Apply `f` to the text outside `<![CDATA[ .. ]]>` sections.
///
/// Sections are copied through unchanged; an unterminated one runs to the end.
pub fn outside_cdata(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("<![CDATA[") {
        out.push_str(&f(&rest[..open]));
        let section = &rest[open..];
        let close = section.find("]]>").map_or(section.len(), |i| i + 3);
        out.push_str(&section[..close]);
        rest = &section[close..];
    }
    out.push_str(&f(rest));
    out
}

/// Decode the fixed set of named HTML entities.
///
/// `&amp;` is decoded last so `&amp;lt;` yields the literal text `&lt;`.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }
    ENTITIES
        .iter()
        .fold(input.to_owned(), |text, (entity, ch)| text.replace(entity, ch))
}

/// Escape a value for use inside an XML attribute.
#[must_use]
pub fn escape_xml_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape the CDATA terminator so a body can be embedded in `<![CDATA[..]]>`.
#[must_use]
pub fn escape_cdata(input: &str) -> String {
    input.replace("]]>", "]]&gt;")
}

/// Decode the entities the Markdown renderer emits inside code blocks.
#[must_use]
pub fn unescape_code(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(
            strip_html("a &lt;b&gt; &amp; &ldquo;c&rdquo;&nbsp;&hellip;"),
            "a <b> & \"c\" ..."
        );
    }

    #[test]
    fn test_decode_entities_quotes_to_ascii() {
        assert_eq!(decode_entities("&lsquo;x&rsquo; &#x27;y&#39;"), "'x' 'y'");
    }

    #[test]
    fn test_strip_html_keeps_cdata_text() {
        assert_eq!(
            strip_html("<b>See</b> <ac:plain-text-link-body><![CDATA[Home & <away>]]></ac:plain-text-link-body>"),
            "See Home & <away>"
        );
    }

    #[test]
    fn test_outside_cdata() {
        let out = outside_cdata("a<![CDATA[b]]>c<![CDATA[d", str::to_uppercase);
        assert_eq!(out, "A<![CDATA[b]]>C<![CDATA[d");
    }

    #[test]
    fn test_decode_entities_amp_last() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_decode_entities_leaves_unknown() {
        assert_eq!(decode_entities("&unknown; &#169;"), "&unknown; &#169;");
    }

    #[test]
    fn test_attribute_double_and_single_quotes() {
        let tag = r#"<img src="a.png" alt='A picture' data-x = "1">"#;
        assert_eq!(attribute(tag, "src"), Some("a.png"));
        assert_eq!(attribute(tag, "alt"), Some("A picture"));
        assert_eq!(attribute(tag, "data-x"), Some("1"));
        assert_eq!(attribute(tag, "title"), None);
    }

    #[test]
    fn test_attribute_namespaced() {
        let tag = r#"<ri:attachment ri:filename="diagram.png" />"#;
        assert_eq!(attribute(tag, "ri:filename"), Some("diagram.png"));
    }

    #[test]
    fn test_escape_xml_attr() {
        assert_eq!(
            escape_xml_attr(r#"a&b<c>"d"'e'"#),
            "a&amp;b&lt;c&gt;&quot;d&quot;&apos;e&apos;"
        );
    }

    #[test]
    fn test_escape_cdata() {
        assert_eq!(escape_cdata("x]]>y]]>"), "x]]&gt;y]]&gt;");
        assert_eq!(escape_cdata("]]"), "]]");
    }

    #[test]
    fn test_unescape_code() {
        assert_eq!(unescape_code("&lt;a&gt; &amp;&amp; &quot;"), "<a> && \"");
        assert_eq!(unescape_code("&amp;lt;"), "&lt;");
    }
}
