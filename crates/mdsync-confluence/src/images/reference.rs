//! Image references found in converted page bodies.

use std::sync::LazyLock;

use mdsync_convert::html::{attribute, decode_entities, outside_cdata};
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use super::ImageError;

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\b[^>]*\bsrc="[^"]+"[^>]*/?>"#).expect("img tag regex"));

static MARKDOWN_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").expect("markdown image regex"));

static WIKI_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]]*)\]\]").expect("wiki image regex"));

/// Syntax an image reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSyntax {
    /// Rendered `<img src=.. alt=..>` tag.
    HtmlTag,
    /// Markdown `![alt](path)` left as text.
    Markdown,
    /// `![[path]]`.
    WikiLink,
}

/// One image reference with its optional `|width` suffix split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path or URL as written, without the size suffix.
    pub path: String,
    /// Alternative text, when the syntax carries one.
    pub alt: Option<String>,
    /// Pixel width from a `path|width` suffix.
    pub width: Option<u32>,
    pub syntax: ImageSyntax,
}

impl ImageReference {
    /// Parse a raw reference, splitting `path|width`.
    ///
    /// A size that is not an integer is ignored.
    #[must_use]
    pub fn parse(raw: &str, alt: Option<&str>, syntax: ImageSyntax) -> Self {
        let (path, width) = match raw.split_once('|') {
            Some((path, size)) => (path, size.trim().parse().ok()),
            None => (raw, None),
        };
        Self {
            path: path.trim().to_owned(),
            alt: alt.filter(|a| !a.is_empty()).map(str::to_owned),
            width,
            syntax,
        }
    }

    /// Whether the path is an `http://` or `https://` URL.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

/// Reference carried by an `<img>` tag.
///
/// The renderer entity-escapes `src` and percent-encodes `|`, spaces and
/// non-ASCII bytes. Local paths are fully decoded; URLs only get `|` back.
fn from_img_tag(tag: &str) -> Option<ImageReference> {
    let src = decode_entities(attribute(tag, "src")?);
    let src = if src.starts_with("http://") || src.starts_with("https://") {
        src.replace("%7C", "|").replace("%7c", "|")
    } else {
        percent_decode_str(&src).decode_utf8_lossy().into_owned()
    };
    let alt = attribute(tag, "alt").map(decode_entities);
    Some(ImageReference::parse(&src, alt.as_deref(), ImageSyntax::HtmlTag))
}

/// Rewrite every image reference with `replace`, in three passes: `<img>`
/// tags, then Markdown images, then `![[path]]`.
///
/// Each pass sees the output of the previous one. CDATA sections are left
/// untouched so code samples keep their literal image syntax.
pub(crate) fn rewrite_references<F>(content: &str, mut replace: F) -> Result<String, ImageError>
where
    F: FnMut(&ImageReference) -> Result<String, ImageError>,
{
    let mut error = None;

    let text = rewrite_pass(content, &IMG_TAG_RE, |caps| from_img_tag(&caps[0]), &mut replace, &mut error);
    let text = rewrite_pass(
        &text,
        &MARKDOWN_IMAGE_RE,
        |caps| Some(ImageReference::parse(&caps[2], Some(&caps[1]), ImageSyntax::Markdown)),
        &mut replace,
        &mut error,
    );
    let text = rewrite_pass(
        &text,
        &WIKI_IMAGE_RE,
        |caps| Some(ImageReference::parse(&caps[1], None, ImageSyntax::WikiLink)),
        &mut replace,
        &mut error,
    );

    match error {
        Some(err) => Err(err),
        None => Ok(text),
    }
}

/// One rewrite pass. After the first error, matches are left as written.
fn rewrite_pass<P, F>(
    text: &str,
    re: &Regex,
    parse: P,
    replace: &mut F,
    error: &mut Option<ImageError>,
) -> String
where
    P: Fn(&Captures<'_>) -> Option<ImageReference>,
    F: FnMut(&ImageReference) -> Result<String, ImageError>,
{
    outside_cdata(text, |segment| {
        re.replace_all(segment, |caps: &Captures<'_>| {
            if error.is_some() {
                return caps[0].to_owned();
            }
            let Some(reference) = parse(caps) else {
                return caps[0].to_owned();
            };
            replace(&reference).unwrap_or_else(|err| {
                *error = Some(err);
                caps[0].to_owned()
            })
        })
        .into_owned()
    })
}

/// Every image reference in `content`, in the order they would be resolved.
#[must_use]
pub fn image_references(content: &str) -> Vec<ImageReference> {
    let mut found = Vec::new();
    // Replacing with nothing lets later passes skip what earlier ones matched
    let _ = rewrite_references(content, |reference| {
        found.push(reference.clone());
        Ok(String::new())
    });
    found
}
