use mdsync_convert::color::nearest_palette;
use mdsync_convert::{MarkdownToStorage, StorageToMarkdown};
use pretty_assertions::assert_eq;

fn to_storage(markdown: &str) -> String {
    MarkdownToStorage::new().convert(markdown).unwrap()
}

fn to_markdown(storage: &str) -> String {
    StorageToMarkdown::new().convert(storage)
}

#[test]
fn test_markdown_roundtrip_keeps_structure() {
    let source = "\
# Title

Some **bold**, *italic*, ~~strike~~ and `code` with a [link](https://x.io/?a=1&b=2).

## Lists

- one
- two

1. first
2. second

| A | B |
|---|---|
| 1 | 2 |
| 3 | 4 |
";
    let expected = "\
[TOC]

# Title

Some **bold**, *italic*, ~~strike~~ and `code` with a [link](https://x.io/?a=1&b=2).

## Lists

- one
- two

1. first
2. second

A | B
--- | ---
1 | 2
3 | 4
";
    assert_eq!(to_markdown(&to_storage(source)), expected);
}

#[test]
fn test_code_block_roundtrip() {
    let source = "```rust\nfn main() {\n    let x = a < b && c > d;\n}\n```\n";
    let back = to_markdown(&to_storage(source));
    assert_eq!(back, format!("[TOC]\n\n{source}"));
}

#[test]
fn test_fold_roundtrip() {
    let source = "---Setup---\nInstall the tool.\n---Setup---\n";
    let back = to_markdown(&to_storage(source));
    assert_eq!(back, "[TOC]\n\n---Setup---\nInstall the tool.\n---Setup---\n");
}

#[test]
fn test_task_list_roundtrip() {
    let source = "- [ ] write docs\n- [x] ship\n";
    assert_eq!(to_markdown(&to_storage(source)), format!("[TOC]\n\n{source}"));
}

#[test]
fn test_diagram_roundtrip() {
    let source = "```mermaid\ngraph TD\nA-->B\n```\n";
    assert_eq!(to_markdown(&to_storage(source)), format!("[TOC]\n\n{source}"));
}

#[test]
fn test_second_publish_does_not_duplicate_toc() {
    let once = to_markdown(&to_storage("# A\n"));
    let twice = to_markdown(&to_storage(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_empty_documents() {
    assert_eq!(to_markdown(""), "\n");
    let storage = to_storage("");
    assert!(storage.trim_end().ends_with("</ac:structured-macro>"));
}

#[test]
fn test_table_rows_and_separators() {
    let rows = 4;
    let cols = 3;
    let mut storage = String::from("<table><tbody><tr>");
    for c in 0..cols {
        storage.push_str(&format!("<th>h{c}</th>"));
    }
    storage.push_str("</tr>");
    for r in 0..rows {
        storage.push_str("<tr>");
        for c in 0..cols {
            storage.push_str(&format!("<td>{r}{c}</td>"));
        }
        storage.push_str("</tr>");
    }
    storage.push_str("</tbody></table>");

    let markdown = to_markdown(&storage);
    let lines: Vec<&str> = markdown.lines().collect();
    // header, separator, then one line per data row
    assert_eq!(lines.len(), rows + 2);
    for line in &lines {
        assert_eq!(line.matches(" | ").count(), cols - 1);
    }
    assert_eq!(lines[1], "--- | --- | ---");
}

#[test]
fn test_ordered_list_renumbers() {
    let storage = r#"<ol><li value="5">a</li><li value="5">b</li><li value="5">c</li></ol>"#;
    assert_eq!(to_markdown(storage), "1. a\n2. b\n3. c\n");
}

#[test]
fn test_unterminated_fold_is_literal() {
    let storage = to_storage("---Setup---\nstill here\n");
    assert!(storage.contains("---Setup---"));
    assert!(storage.contains("still here"));
    assert!(!storage.contains("ac:name=\"expand\""));
}

#[test]
fn test_fold_expand_macro_title() {
    let storage = to_storage("---Setup---\n**Step** one\n---Setup---\n");
    assert!(storage.contains(
        "<ac:structured-macro ac:name=\"expand\"><ac:parameter ac:name=\"title\">Setup</ac:parameter><ac:rich-text-body><p><strong>Step</strong> one</p>"
    ));
}

#[test]
fn test_color_mapping_red_exact() {
    let entry = nearest_palette(0xFF, 0xEB, 0xE6);
    assert_eq!(entry.name, "red");
    assert_eq!(nearest_palette(0xFF, 0xEB, 0xE6), entry);
}
