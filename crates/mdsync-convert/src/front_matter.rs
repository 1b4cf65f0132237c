//! Markdown source preprocessing applied before rendering.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static FRONT_MATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").expect("front matter regex"));

static LINK_TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)\s]+)\)").expect("link target regex"));

/// Remove a leading YAML front matter block.
///
/// Only a block at the very start of the document is recognised; the closing
/// `---` line must follow on a later line.
#[must_use]
pub fn strip_front_matter(markdown: &str) -> &str {
    match FRONT_MATTER_RE.find(markdown) {
        Some(m) => &markdown[m.end()..],
        None => markdown,
    }
}

/// Whether `line` opens or closes a fenced code block.
pub(crate) fn is_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

/// Pre-escape bare `&` inside Markdown link targets.
///
/// Existing `&amp;` is left alone so the rendered href carries exactly one
/// level of escaping. Fenced code blocks are copied as written.
#[must_use]
pub fn encode_link_ampersands(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .split('\n')
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
            }
            if in_fence || !line.contains('&') {
                return line.to_owned();
            }
            LINK_TARGET_RE
                .replace_all(line, |caps: &Captures<'_>| {
                    let url = caps[1].replace("&amp;", "&").replace('&', "&amp;");
                    format!("]({url})")
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_front_matter() {
        let input = "---\ntitle: Hello\ntags: [a]\n---\n# Body\n";
        assert_eq!(strip_front_matter(input), "# Body\n");
    }

    #[test]
    fn test_strip_front_matter_absent() {
        assert_eq!(strip_front_matter("# Body\n"), "# Body\n");
    }

    #[test]
    fn test_strip_front_matter_only_at_start() {
        let input = "text\n---\na: b\n---\n";
        assert_eq!(strip_front_matter(input), input);
    }

    #[test]
    fn test_strip_front_matter_unterminated() {
        let input = "---\ntitle: x\n# Body\n";
        assert_eq!(strip_front_matter(input), input);
    }

    #[test]
    fn test_encode_link_ampersands() {
        assert_eq!(
            encode_link_ampersands("[q](https://x.io/?a=1&b=2&amp;c=3)"),
            "[q](https://x.io/?a=1&amp;b=2&amp;c=3)"
        );
    }

    #[test]
    fn test_encode_link_ampersands_skips_fences() {
        let input = "```md\nsee [q](https://x.io/?a=1&b=2)\n```\n[r](/?c=3&d=4)";
        assert_eq!(
            encode_link_ampersands(input),
            "```md\nsee [q](https://x.io/?a=1&b=2)\n```\n[r](/?c=3&amp;d=4)"
        );
    }

    #[test]
    fn test_encode_link_ampersands_ignores_text() {
        assert_eq!(encode_link_ampersands("Tom & Jerry"), "Tom & Jerry");
    }
}
