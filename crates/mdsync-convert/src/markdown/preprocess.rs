//! Source rewrites that run before rendering.
//!
//! Constructs pulldown-cmark would mangle (diagram fences, fold regions and
//! task lines) are swapped for opaque tokens. The token text is plain
//! alphanumerics so the renderer emits it untouched inside a `<p>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::front_matter::is_fence;

static FOLD_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---([^-\n]+?)---\s*$").expect("fold delimiter regex"));

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([ xX])\] (.+)$").expect("task regex"));

pub(super) static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<p>)?MDSYNC(DIAGRAM|FOLD|TASKS)(\d+)PLACEHOLDER(?:</p>)?\n?").expect("token regex")
});

/// Label of the legacy fold delimiter `---折叠---`.
const LEGACY_FOLD_LABEL: &str = "折叠";

/// Visible title for folds opened with the legacy delimiter.
const LEGACY_FOLD_TITLE: &str = "点击展开";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Fold {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Task {
    pub complete: bool,
    pub text: String,
}

/// Raw content hidden behind tokens for one conversion.
#[derive(Debug, Default)]
pub(super) struct Placeholders {
    pub diagrams: Vec<String>,
    pub folds: Vec<Fold>,
    pub tasks: Vec<Vec<Task>>,
}

impl Placeholders {
    fn push_diagram(&mut self, body: String) -> String {
        self.diagrams.push(body);
        token("DIAGRAM", self.diagrams.len() - 1)
    }

    fn push_fold(&mut self, fold: Fold) -> String {
        self.folds.push(fold);
        token("FOLD", self.folds.len() - 1)
    }

    fn push_tasks(&mut self, tasks: Vec<Task>) -> String {
        self.tasks.push(tasks);
        token("TASKS", self.tasks.len() - 1)
    }
}

fn token(kind: &str, index: usize) -> String {
    format!("MDSYNC{kind}{index}PLACEHOLDER")
}

/// Push `token` as its own paragraph.
fn push_block(out: &mut Vec<String>, token: String) {
    out.push(String::new());
    out.push(token);
    out.push(String::new());
}

fn is_diagram_open(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("```")
        .is_some_and(|info| info.trim() == "mermaid")
}

/// Replace fenced `mermaid` blocks with diagram tokens.
///
/// A fence without a closing line is left as written.
pub(super) fn extract_diagrams(markdown: &str, placeholders: &mut Placeholders) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if is_diagram_open(lines[i])
            && let Some(close) = (i + 1..lines.len()).find(|&j| lines[j].trim() == "```")
        {
            let body = lines[i + 1..close].join("\n");
            push_block(&mut out, placeholders.push_diagram(body));
            i = close + 1;
            continue;
        }
        out.push(lines[i].to_owned());
        i += 1;
    }
    out.join("\n")
}

/// Title of a `---Title---` delimiter line.
fn fold_title(line: &str) -> Option<&str> {
    FOLD_DELIMITER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
}

fn find_fold_close(lines: &[&str], from: usize, title: &str) -> Option<usize> {
    let mut in_fence = false;
    for (j, line) in lines.iter().enumerate().skip(from) {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && fold_title(line) == Some(title) {
            return Some(j);
        }
    }
    None
}

/// Replace `---Title---` regions closed by the same delimiter with fold tokens.
///
/// An opening delimiter without a matching close is kept as a plain line.
pub(super) fn extract_folds(markdown: &str, placeholders: &mut Placeholders) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence
            && let Some(title) = fold_title(line)
            && let Some(close) = find_fold_close(&lines, i + 1, title)
        {
            let title = if title == LEGACY_FOLD_LABEL {
                LEGACY_FOLD_TITLE
            } else {
                title
            };
            let fold = Fold {
                title: title.to_owned(),
                body: lines[i + 1..close].join("\n"),
            };
            push_block(&mut out, placeholders.push_fold(fold));
            i = close + 1;
            continue;
        }
        out.push(line.to_owned());
        i += 1;
    }
    out.join("\n")
}

/// Replace runs of top-level `- [ ]` / `- [x]` lines with task tokens.
pub(super) fn extract_tasks(markdown: &str, placeholders: &mut Placeholders) -> String {
    let mut out = Vec::new();
    let mut run: Vec<Task> = Vec::new();
    let mut in_fence = false;
    for line in markdown.split('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        if !in_fence && let Some(caps) = TASK_RE.captures(line) {
            run.push(Task {
                complete: !caps[1].trim().is_empty(),
                text: caps[2].to_owned(),
            });
            continue;
        }
        if !run.is_empty() {
            push_block(&mut out, placeholders.push_tasks(std::mem::take(&mut run)));
        }
        out.push(line.to_owned());
    }
    if !run.is_empty() {
        push_block(&mut out, placeholders.push_tasks(run));
    }
    out.join("\n")
}

/// Drop `[TOC]` marker lines; a TOC macro is always added to the output.
pub(super) fn drop_toc_markers(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .split('\n')
        .filter(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
            }
            in_fence || line.trim() != "[TOC]"
        })
        .collect::<Vec<_>>()
        .join("\n")
}
