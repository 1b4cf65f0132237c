//! Block-level rules: cleanup, headings, paragraphs, lists, tables, quotes.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::inline::inline_text;
use super::{collapse_blank_lines, single_line};
use crate::html::strip_html;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex"));

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<br(?:\s[^>]*)?/?>").expect("br regex"));

/// Heading regexes indexed by level - 1.
static HEADING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    (1..=6)
        .map(|level| {
            Regex::new(&format!(r"(?s)<h{level}(?:\s[^>]*)?>(.*?)</h{level}>")).expect("heading regex")
        })
        .collect()
});

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p(?:\s[^>]*)?>(.*?)</p>").expect("paragraph regex"));

static UL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ul(?:\s[^>]*)?>(.*?)</ul>").expect("ul regex"));

static OL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ol(?:\s[^>]*)?>(.*?)</ol>").expect("ol regex"));

static LI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<li(?:\s[^>]*)?>(.*?)</li>").expect("li regex"));

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table(?:\s[^>]*)?>(.*?)</table>").expect("table regex"));

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr(?:\s[^>]*)?>(.*?)</tr>").expect("row regex"));

static HEADER_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<th(?:\s[^>]*)?>(.*?)</th>").expect("th regex"));

static DATA_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<td(?:\s[^>]*)?>(.*?)</td>").expect("td regex"));

static BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<blockquote(?:\s[^>]*)?>(.*?)</blockquote>").expect("blockquote regex")
});

/// Drop comments, collapse blank lines, turn `<br>` into newlines and `&nbsp;`
/// into spaces.
pub(super) fn preprocess(input: &str) -> String {
    let text = COMMENT_RE.replace_all(input, "");
    let text = collapse_blank_lines(&text);
    let text = BR_RE.replace_all(&text, "\n");
    text.replace("&nbsp;", " ")
}

/// `<hN>` to `#` headings, from level 6 down to 1.
pub(super) fn headings(input: &str) -> String {
    let mut text = input.to_owned();
    for level in (1..=6).rev() {
        let hashes = "#".repeat(level);
        text = HEADING_RES[level - 1]
            .replace_all(&text, |caps: &Captures<'_>| {
                format!("{hashes} {}\n\n", single_line(&inline_text(&caps[1])))
            })
            .into_owned();
    }
    text
}

/// Paragraphs become text followed by a blank line.
pub(super) fn paragraphs(input: &str) -> String {
    PARAGRAPH_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let text = inline_text(&caps[1]);
            let text = text.trim();
            if text.is_empty() {
                "\n".to_owned()
            } else {
                format!("{text}\n\n")
            }
        })
        .into_owned()
}

fn list_items(list: &str) -> impl Iterator<Item = String> + '_ {
    LI_RE
        .captures_iter(list)
        .map(|caps| single_line(&inline_text(&caps[1])))
}

pub(super) fn unordered_lists(input: &str) -> String {
    UL_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let mut out = String::new();
            for item in list_items(&caps[1]) {
                let _ = writeln!(out, "- {item}");
            }
            out.push('\n');
            out
        })
        .into_owned()
}

/// Ordered lists are renumbered from 1 whatever the source numbering.
pub(super) fn ordered_lists(input: &str) -> String {
    OL_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let mut out = String::new();
            for (index, item) in list_items(&caps[1]).enumerate() {
                let _ = writeln!(out, "{}. {item}", index + 1);
            }
            out.push('\n');
            out
        })
        .into_owned()
}

fn cells(re: &Regex, row: &str) -> Vec<String> {
    re.captures_iter(row)
        .map(|caps| single_line(&inline_text(&caps[1])))
        .collect()
}

/// Tables become pipe tables; the first row is the header.
pub(super) fn tables(input: &str) -> String {
    TABLE_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let rows: Vec<&str> = ROW_RE
                .captures_iter(&caps[1])
                .filter_map(|row| row.get(1).map(|m| m.as_str()))
                .collect();
            let Some((first, rest)) = rows.split_first() else {
                return caps[0].to_owned();
            };

            let mut header = cells(&HEADER_CELL_RE, first);
            if header.is_empty() {
                header = cells(&DATA_CELL_RE, first);
            }

            let mut out = String::new();
            let _ = writeln!(out, "{}", header.join(" | "));
            let _ = writeln!(out, "{}", vec!["---"; header.len()].join(" | "));
            for row in rest {
                let _ = writeln!(out, "{}", cells(&DATA_CELL_RE, row).join(" | "));
            }
            out.push('\n');
            out
        })
        .into_owned()
}

/// Prefix every non-blank line of a blockquote with `> `.
pub(super) fn blockquotes(input: &str) -> String {
    BLOCKQUOTE_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let inner = strip_html(&caps[1]);
            let quoted: Vec<String> = inner
                .trim()
                .lines()
                .map(|line| {
                    if line.trim().is_empty() {
                        line.to_owned()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect();
            format!("{}\n\n", quoted.join("\n"))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_preprocess() {
        assert_eq!(
            preprocess("a<!-- x\ny -->b<br/>c<br>d<br />e&nbsp;f\n\n\n\ng"),
            "ab\nc\nd\ne f\n\ng"
        );
    }

    #[test]
    fn test_headings_all_levels() {
        let input = "<h1>One</h1><h2>Two</h2><h6 class=\"x\">Six</h6>";
        assert_eq!(headings(input), "# One\n\n## Two\n\n###### Six\n\n");
    }

    #[test]
    fn test_headings_keep_inline_formatting() {
        assert_eq!(headings("<h2>Use <code>cargo</code></h2>"), "## Use `cargo`\n\n");
    }

    #[test]
    fn test_headings_ignore_header_tag() {
        assert_eq!(headings("<header>x</header>"), "<header>x</header>");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(paragraphs("<p>Hello</p><p class=\"c\">World</p>"), "Hello\n\nWorld\n\n");
    }

    #[test]
    fn test_paragraphs_empty_becomes_blank_line() {
        assert_eq!(paragraphs("<p> </p><p></p>"), "\n\n");
    }

    #[test]
    fn test_paragraphs_do_not_match_pre() {
        assert_eq!(paragraphs("<pre>x</pre>"), "<pre>x</pre>");
    }

    #[test]
    fn test_unordered_lists() {
        assert_eq!(
            unordered_lists("<ul><li>a</li>\n<li><p>b</p></li></ul>"),
            "- a\n- b\n\n"
        );
    }

    #[test]
    fn test_ordered_lists_renumber() {
        let input = r#"<ol start="5"><li value="5">x</li><li value="5">y</li><li value="5">z</li></ol>"#;
        assert_eq!(ordered_lists(input), "1. x\n2. y\n3. z\n\n");
    }

    #[test]
    fn test_tables_with_header_cells() {
        let input = "<table><tbody><tr><th>H1</th><th>H2</th></tr>\
                     <tr><td>a</td><td><p>b</p></td></tr>\
                     <tr><td>c</td><td>d</td></tr></tbody></table>";
        assert_eq!(tables(input), "H1 | H2\n--- | ---\na | b\nc | d\n\n");
    }

    #[test]
    fn test_tables_first_row_data_cells_as_header() {
        let input = "<table><tr><td>x</td><td>y</td><td>z</td></tr><tr><td>1</td><td>2</td><td>3</td></tr></table>";
        assert_eq!(tables(input), "x | y | z\n--- | --- | ---\n1 | 2 | 3\n\n");
    }

    #[test]
    fn test_tables_without_rows_unchanged() {
        assert_eq!(tables("<table></table>"), "<table></table>");
    }

    #[test]
    fn test_tables_thead_is_not_a_header_cell() {
        let input = "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>";
        assert_eq!(tables(input), "A\n---\n1\n\n");
    }

    #[test]
    fn test_blockquotes() {
        assert_eq!(
            blockquotes("<blockquote>line one\n\nline two</blockquote>"),
            "> line one\n\n> line two\n\n"
        );
    }
}
