//! Structured macro rules.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::macro_param;
use crate::html::{attribute, strip_html};

static CODE_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<ac:structured-macro\b[^>]*?\bac:name="(?:code|noformat)"[^>]*>(.*?)<ac:plain-text-body>\s*<!\[CDATA\[(.*?)\]\]>\s*</ac:plain-text-body>.*?</ac:structured-macro>"#,
    )
    .expect("code macro regex")
});

static PRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre(?:\s[^>]*)?>(.*?)</pre>").expect("pre regex"));

static DIAGRAM_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<ac:structured-macro\b[^>]*?\bac:name="markdown"[^>]*>.*?<ac:plain-text-body>\s*<!\[CDATA\[(.*?)\]\]>\s*</ac:plain-text-body>.*?</ac:structured-macro>"#,
    )
    .expect("diagram macro regex")
});

static RICH_MACRO_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ac:structured-macro\b[^>]*?\bac:name="(?:expand|info|note|warning|tip)"[^>]*>"#)
        .expect("rich macro open regex")
});

static RICH_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\A<ac:structured-macro\b[^>]*?\bac:name="(expand|info|note|warning|tip)"[^>]*>(.*?)<ac:rich-text-body>(.*?)</ac:rich-text-body>\s*</ac:structured-macro>"#,
    )
    .expect("rich macro regex")
});

static TOC_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<ac:structured-macro\b[^>]*?\bac:name="toc"[^>]*?(?:/>|>.*?</ac:structured-macro>)"#)
        .expect("toc macro regex")
});

static MACRO_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ac:structured-macro\b[^>]*>|</ac:structured-macro>").expect("macro tag regex")
});

static TASK_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:task-list(?:\s[^>]*)?>(.*?)</ac:task-list>").expect("task list regex")
});

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ac:task(?:\s[^>]*)?>(.*?)</ac:task>").expect("task regex"));

static TASK_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:task-status>(.*?)</ac:task-status>").expect("task status regex")
});

static TASK_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ac:task-body>(.*?)</ac:task-body>").expect("task body regex"));

static ATTACHMENTS_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<ac:structured-macro\b[^>]*?\bac:name="attachments"[^>]*?(?:/>|>(.*?)</ac:structured-macro>)"#,
    )
    .expect("attachments macro regex")
});

static RI_ATTACHMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ri:attachment\b[^>]*>").expect("ri:attachment regex"));

static STATUS_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<ac:structured-macro\b[^>]*?\bac:name="status"[^>]*>(.*?)</ac:structured-macro>"#)
        .expect("status macro regex")
});

/// Macros that survive the unknown-macro drop because later rules convert them.
const DEFERRED_MACROS: &[&str] = &["status", "attachments"];

/// Title used for an expand macro without a title parameter.
pub(crate) const LEGACY_FOLD_LABEL: &str = "折叠";

/// Code and noformat macros and `<pre>` blocks to fenced code.
pub(super) fn code(input: &str) -> String {
    let text = CODE_MACRO_RE.replace_all(input, |caps: &Captures<'_>| {
        let params = &caps[1];
        let body = unescape_cdata_body(&caps[2]);
        let mut out = String::new();
        if let Some(title) = macro_param(params, "title").filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "**{title}**");
        }
        let language = macro_param(params, "language").unwrap_or_default();
        let _ = write!(out, "```{language}\n{}\n```\n\n", body.trim_matches('\n'));
        out
    });

    PRE_RE
        .replace_all(&text, |caps: &Captures<'_>| {
            format!("```\n{}\n```\n\n", strip_html(&caps[1]).trim_matches('\n'))
        })
        .into_owned()
}

/// Diagram, expand, panel and TOC macros; anything else is dropped.
pub(super) fn structured_macros(input: &str) -> String {
    let text = DIAGRAM_MACRO_RE.replace_all(input, |caps: &Captures<'_>| {
        format!("{}\n\n", unescape_cdata_body(&caps[1]).trim())
    });
    let text = rich_macros(&text);
    let text = TOC_MACRO_RE.replace_all(&text, "[TOC]\n\n");
    drop_unhandled_macros(&text)
}

/// Convert expand and panel macros, innermost first so nested bodies are
/// already Markdown when the enclosing macro is matched.
fn rich_macros(input: &str) -> String {
    let mut text = input.to_owned();
    let mut limit = text.len();
    while let Some(open) = RICH_MACRO_OPEN_RE.find_iter(&text[..limit]).last() {
        let start = open.start();
        let converted = RICH_MACRO_RE
            .captures(&text[start..])
            .map(|caps| (caps[0].len(), render_rich_macro(&caps[1], &caps[2], &caps[3])));
        if let Some((len, replacement)) = converted {
            text.replace_range(start..start + len, &replacement);
        }
        limit = start;
    }
    text
}

fn render_rich_macro(name: &str, params: &str, body: &str) -> String {
    let body = body.trim();
    if name == "expand" {
        let title = macro_param(params, "title").filter(|t| !t.is_empty());
        let title = title.as_deref().unwrap_or(LEGACY_FOLD_LABEL);
        return format!("---{title}---\n{body}\n---{title}---\n\n");
    }
    let label = match name {
        "info" => "ℹ️ **Info:**",
        "note" => "📝 **Note:**",
        "warning" => "⚠️ **Warning:**",
        _ => "💡 **Tip:**",
    };
    format!("{label} {body}\n\n")
}

/// Remove every macro no rule handles, together with its nested content.
fn drop_unhandled_macros(input: &str) -> String {
    // (start, deferred) for each open macro
    let mut stack: Vec<(usize, bool)> = Vec::new();
    let mut removals: Vec<(usize, usize)> = Vec::new();

    for tag in MACRO_TAG_RE.find_iter(input) {
        let raw = tag.as_str();
        if raw.starts_with("</") {
            let Some((start, deferred)) = stack.pop() else {
                continue;
            };
            let inside_dropped = stack.iter().any(|(_, d)| !d);
            if !deferred && !inside_dropped {
                removals.push((start, tag.end()));
            }
            continue;
        }

        let deferred = attribute(raw, "ac:name").is_some_and(|name| DEFERRED_MACROS.contains(&name));
        if raw.ends_with("/>") {
            if !deferred && !stack.iter().any(|(_, d)| !d) {
                removals.push((tag.start(), tag.end()));
            }
        } else {
            stack.push((tag.start(), deferred));
        }
    }

    if removals.is_empty() {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    for (start, end) in removals {
        out.push_str(&input[cursor..start]);
        cursor = end;
    }
    out.push_str(&input[cursor..]);
    out
}

/// Task list macros to `- [x]` / `- [ ]` lines.
pub(super) fn task_lists(input: &str) -> String {
    TASK_LIST_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let mut out = String::new();
            for task in TASK_RE.captures_iter(&caps[1]) {
                let task = &task[1];
                let complete = TASK_STATUS_RE
                    .captures(task)
                    .is_some_and(|s| s[1].trim() == "complete");
                let body = TASK_BODY_RE
                    .captures(task)
                    .map(|b| strip_html(&b[1]).trim().to_owned())
                    .unwrap_or_default();
                let checkbox = if complete { "[x]" } else { "[ ]" };
                let _ = writeln!(out, "- {checkbox} {body}");
            }
            out.push('\n');
            out
        })
        .into_owned()
}

/// Attachments macro to a list of links named after each file.
pub(super) fn attachments(input: &str) -> String {
    ATTACHMENTS_MACRO_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let mut out = String::from("\n**Attachments:**\n");
            let body = caps.get(1).map_or("", |m| m.as_str());
            for tag in RI_ATTACHMENT_RE.find_iter(body) {
                if let Some(filename) = attribute(tag.as_str(), "ri:filename") {
                    let _ = writeln!(out, "- [{filename}]({filename})");
                }
            }
            out.push('\n');
            out
        })
        .into_owned()
}

/// Status lozenges to an emoji-prefixed label.
pub(super) fn status(input: &str) -> String {
    STATUS_MACRO_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let params = &caps[1];
            let Some(title) = macro_param(params, "title") else {
                return String::new();
            };
            let colour = macro_param(params, "colour")
                .or_else(|| macro_param(params, "color"))
                .unwrap_or_default()
                .to_ascii_lowercase();
            match colour.as_str() {
                "green" => format!("✅ {title}"),
                "red" => format!("❌ {title}"),
                "yellow" => format!("⚠️ {title}"),
                "blue" => format!("ℹ️ {title}"),
                _ => format!("【{title}】"),
            }
        })
        .into_owned()
}

/// Undo terminator escaping inside a CDATA body.
fn unescape_cdata_body(body: &str) -> String {
    body.replace("]]]]><![CDATA[>", "]]>").replace("]]&gt;", "]]>")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_macro_with_language_and_title() {
        let input = concat!(
            r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
            r#"<ac:parameter ac:name="title">main.rs</ac:parameter>"#,
            r#"<ac:parameter ac:name="language">rust</ac:parameter>"#,
            "<ac:plain-text-body><![CDATA[fn main() {\n    println!(\"<hi>\");\n}]]></ac:plain-text-body>",
            "</ac:structured-macro>"
        );
        assert_eq!(
            code(input),
            "**main.rs**\n```rust\nfn main() {\n    println!(\"<hi>\");\n}\n```\n\n"
        );
    }

    #[test]
    fn test_code_macro_without_params() {
        let input = r#"<ac:structured-macro ac:name="code"><ac:plain-text-body><![CDATA[x = 1]]></ac:plain-text-body></ac:structured-macro>"#;
        assert_eq!(code(input), "```\nx = 1\n```\n\n");
    }

    #[test]
    fn test_code_macro_unescapes_terminator() {
        let input = r#"<ac:structured-macro ac:name="code"><ac:plain-text-body><![CDATA[a]]&gt;b]]></ac:plain-text-body></ac:structured-macro>"#;
        assert_eq!(code(input), "```\na]]>b\n```\n\n");
    }

    #[test]
    fn test_pre_block() {
        assert_eq!(code("<pre>if a &lt; b {}</pre>"), "```\nif a < b {}\n```\n\n");
    }

    #[test]
    fn test_diagram_macro() {
        let input = "<ac:structured-macro ac:name=\"markdown\"><ac:plain-text-body><![CDATA[```mermaid\ngraph TD\nA-->B\n```]]></ac:plain-text-body></ac:structured-macro>";
        assert_eq!(structured_macros(input), "```mermaid\ngraph TD\nA-->B\n```\n\n");
    }

    #[test]
    fn test_expand_macro() {
        let input = r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">Setup</ac:parameter><ac:rich-text-body>Install it.</ac:rich-text-body></ac:structured-macro>"#;
        assert_eq!(structured_macros(input), "---Setup---\nInstall it.\n---Setup---\n\n");
    }

    #[test]
    fn test_expand_macro_without_title_uses_legacy_label() {
        let input = r#"<ac:structured-macro ac:name="expand"><ac:rich-text-body>x</ac:rich-text-body></ac:structured-macro>"#;
        assert_eq!(structured_macros(input), "---折叠---\nx\n---折叠---\n\n");
    }

    #[test]
    fn test_nested_rich_macros() {
        let input = concat!(
            r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">Outer</ac:parameter><ac:rich-text-body>"#,
            r#"before <ac:structured-macro ac:name="note"><ac:rich-text-body>careful</ac:rich-text-body></ac:structured-macro> after"#,
            "</ac:rich-text-body></ac:structured-macro>"
        );
        assert_eq!(
            structured_macros(input),
            "---Outer---\nbefore 📝 **Note:** careful\n\n after\n---Outer---\n\n"
        );
    }

    #[test]
    fn test_panel_macros() {
        for (name, label) in [
            ("info", "ℹ️ **Info:**"),
            ("note", "📝 **Note:**"),
            ("warning", "⚠️ **Warning:**"),
            ("tip", "💡 **Tip:**"),
        ] {
            let input = format!(
                r#"<ac:structured-macro ac:name="{name}"><ac:parameter ac:name="icon">true</ac:parameter><ac:rich-text-body> Body </ac:rich-text-body></ac:structured-macro>"#
            );
            assert_eq!(structured_macros(&input), format!("{label} Body\n\n"));
        }
    }

    #[test]
    fn test_toc_macro() {
        assert_eq!(structured_macros(r#"<ac:structured-macro ac:name="toc" />"#), "[TOC]\n\n");
        assert_eq!(
            structured_macros(
                r#"<ac:structured-macro ac:name="toc"><ac:parameter ac:name="maxLevel">3</ac:parameter></ac:structured-macro>"#
            ),
            "[TOC]\n\n"
        );
    }

    #[test]
    fn test_unknown_macros_dropped() {
        let input = concat!(
            "a",
            r#"<ac:structured-macro ac:name="jira"><ac:parameter ac:name="key">X-1</ac:parameter></ac:structured-macro>"#,
            "b",
            r#"<ac:structured-macro ac:name="gallery" />"#,
            "c"
        );
        assert_eq!(structured_macros(input), "abc");
    }

    #[test]
    fn test_unknown_macro_drop_removes_nested_content() {
        let input = concat!(
            r#"<ac:structured-macro ac:name="section"><ac:rich-text-body>"#,
            r#"<ac:structured-macro ac:name="column"><ac:rich-text-body>x</ac:rich-text-body></ac:structured-macro>"#,
            "</ac:rich-text-body></ac:structured-macro>tail"
        );
        assert_eq!(structured_macros(input), "tail");
    }

    #[test]
    fn test_unknown_macro_drop_keeps_deferred_macros() {
        let input = r#"<ac:structured-macro ac:name="status"><ac:parameter ac:name="title">OK</ac:parameter></ac:structured-macro>"#;
        assert_eq!(structured_macros(input), input);
    }

    #[test]
    fn test_task_lists() {
        let input = concat!(
            "<ac:task-list>",
            "<ac:task><ac:task-id>1</ac:task-id><ac:task-status>complete</ac:task-status><ac:task-body>Done <strong>it</strong></ac:task-body></ac:task>",
            "<ac:task><ac:task-id>2</ac:task-id><ac:task-status>incomplete</ac:task-status><ac:task-body>Todo</ac:task-body></ac:task>",
            "</ac:task-list>"
        );
        assert_eq!(task_lists(input), "- [x] Done it\n- [ ] Todo\n\n");
    }

    #[test]
    fn test_attachments_macro() {
        let input = r#"<ac:structured-macro ac:name="attachments"><ac:parameter ac:name="patterns"><ri:attachment ri:filename="a.pdf"/><ri:attachment ri:filename="b.png"/></ac:parameter></ac:structured-macro>"#;
        assert_eq!(
            attachments(input),
            "\n**Attachments:**\n- [a.pdf](a.pdf)\n- [b.png](b.png)\n\n"
        );
    }

    #[test]
    fn test_status_macro_colours() {
        let make = |colour: &str| {
            format!(
                r#"<ac:structured-macro ac:name="status"><ac:parameter ac:name="colour">{colour}</ac:parameter><ac:parameter ac:name="title">S</ac:parameter></ac:structured-macro>"#
            )
        };
        assert_eq!(status(&make("Green")), "✅ S");
        assert_eq!(status(&make("Red")), "❌ S");
        assert_eq!(status(&make("Yellow")), "⚠️ S");
        assert_eq!(status(&make("Blue")), "ℹ️ S");
        assert_eq!(status(&make("Purple")), "【S】");
    }
}
