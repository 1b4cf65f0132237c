//! Inline rules: links, images, emphasis, emoticons and mentions.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{macro_param, macros};
use crate::html::{attribute, decode_entities, strip_html};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\s[^>]*?\bhref="([^"]*)"[^>]*>(.*?)</a>"#).expect("link regex")
});

static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\b[^>]*>").expect("img regex"));

static AC_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<ac:image\b[^>]*>)(.*?)</ac:image>").expect("ac:image regex")
});

static RI_ATTACHMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ri:attachment\b[^>]*>").expect("ri:attachment regex"));

static RI_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ri:url\b[^>]*>").expect("ri:url regex"));

/// `(regex, markdown delimiter)` pairs for inline formatting tags.
static FORMATTING_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("strong", "**"),
        ("b", "**"),
        ("em", "*"),
        ("i", "*"),
        ("del", "~~"),
        ("s", "~~"),
        ("code", "`"),
    ]
    .into_iter()
    .map(|(tag, delimiter)| {
        let re = Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>")).expect("formatting regex");
        (re, delimiter)
    })
    .collect()
});

static EMOTICON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ac:emoticon\b[^>]*?\bac:name="([^"]+)"[^>]*>(?:</ac:emoticon>)?"#).expect("emoticon regex")
});

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<ac:link\b[^>]*>\s*<ri:(?:user|group)\b[^>]*?\bri:(?:username|userkey|account-id|name)="([^"]+)"[^>]*>(?:\s*<ac:plain-text-link-body>.*?</ac:plain-text-link-body>)?\s*</ac:link>"#,
    )
    .expect("mention regex")
});

/// Known Confluence emoticon names and their shortcodes.
const EMOTICONS: &[(&str, &str)] = &[
    ("smile", ":smile:"),
    ("sad", ":sad:"),
    ("wink", ":wink:"),
    ("laugh", ":laughing:"),
    ("thumbs-up", ":+1:"),
    ("thumbs-down", ":-1:"),
    ("information", ":information_source:"),
    ("tick", ":white_check_mark:"),
    ("cross", ":x:"),
    ("warning", ":warning:"),
];

/// Convert the inline markup in `html`, then flatten what is left to text.
pub(super) fn inline_text(html: &str) -> String {
    let text = links(html);
    let text = images(&text);
    let text = formatting(&text);
    let text = emoticons(&text);
    let text = mentions(&text);
    let text = macros::status(&text);
    strip_html(&text)
}

/// `<a href>` to `[text](href)`.
pub(super) fn links(input: &str) -> String {
    LINK_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let text = strip_html(&formatting(&caps[2]));
            format!("[{}]({})", text.trim(), decode_entities(&caps[1]))
        })
        .into_owned()
}

/// `<img>` tags and `<ac:image>` macros to `![alt](src)`.
pub(super) fn images(input: &str) -> String {
    let text = IMG_RE.replace_all(input, |caps: &Captures<'_>| {
        let tag = &caps[0];
        match attribute(tag, "src") {
            Some(src) => {
                let alt = attribute(tag, "alt").filter(|a| !a.is_empty()).unwrap_or("image");
                format!("![{}]({})", decode_entities(alt), decode_entities(src))
            }
            None => tag.to_owned(),
        }
    });

    AC_IMAGE_RE
        .replace_all(&text, |caps: &Captures<'_>| {
            let (open, body) = (&caps[1], &caps[2]);
            let alt = macro_param(body, "alt")
                .or_else(|| attribute(open, "ac:alt").map(decode_entities))
                .filter(|a| !a.is_empty());

            if let Some(filename) = RI_ATTACHMENT_RE
                .find(body)
                .and_then(|m| attribute(m.as_str(), "ri:filename"))
            {
                let filename = decode_entities(filename);
                let alt = alt.unwrap_or_else(|| filename.clone());
                return format!("![{alt}]({filename})");
            }
            if let Some(url) = RI_URL_RE.find(body).and_then(|m| attribute(m.as_str(), "ri:value")) {
                let alt = alt.unwrap_or_else(|| "image".to_owned());
                return format!("![{alt}]({})", decode_entities(url));
            }
            caps[0].to_owned()
        })
        .into_owned()
}

/// Bold, italic, strikethrough and inline code.
pub(super) fn formatting(input: &str) -> String {
    FORMATTING_RES
        .iter()
        .fold(input.to_owned(), |text, (re, delimiter)| {
            re.replace_all(&text, format!("{delimiter}${{1}}{delimiter}").as_str())
                .into_owned()
        })
}

/// `<ac:emoticon>` to a shortcode, `:name:` for unknown names.
pub(super) fn emoticons(input: &str) -> String {
    EMOTICON_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            EMOTICONS
                .iter()
                .find(|(known, _)| *known == name)
                .map_or_else(|| format!(":{name}:"), |(_, code)| (*code).to_owned())
        })
        .into_owned()
}

/// User and group mention links to `@identifier`.
pub(super) fn mentions(input: &str) -> String {
    MENTION_RE.replace_all(input, "@${1}").into_owned()
}
