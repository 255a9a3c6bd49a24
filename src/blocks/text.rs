// src/blocks/text.rs
//! Converts lightweight markdown into Notion blocks.

use super::builders::{
    bulleted_list_item, code, divider, heading_1, heading_2, heading_3, numbered_list_item,
    paragraph, quote, to_do,
};
use serde_json::Value;

/// Converts markdown-like text into blocks.
///
/// Understands `#`/`##`/`###` headings, `-`/`*`/`+` bullets, `- [ ]`/`- [x]`
/// to-dos, `1.` numbered items, `>` quotes, `---` dividers and fenced code
/// with an optional language. Consecutive plain lines form one paragraph;
/// blank lines separate paragraphs.
pub fn from_text(text: &str) -> Vec<Value> {
    let mut blocks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let stripped = line.trim();

        if let Some(language) = stripped.strip_prefix("```") {
            flush_paragraph(&mut pending, &mut blocks);
            let mut body = Vec::new();
            for code_line in lines.by_ref() {
                if code_line.trim_start().starts_with("```") {
                    break;
                }
                body.push(code_line);
            }
            blocks.push(code(&body.join("\n"), language.trim()));
            continue;
        }

        if stripped.is_empty() {
            flush_paragraph(&mut pending, &mut blocks);
            continue;
        }

        match line_block(stripped) {
            Some(block) => {
                flush_paragraph(&mut pending, &mut blocks);
                blocks.push(block);
            }
            None => pending.push(stripped),
        }
    }

    flush_paragraph(&mut pending, &mut blocks);
    blocks
}

fn flush_paragraph(pending: &mut Vec<&str>, blocks: &mut Vec<Value>) {
    if !pending.is_empty() {
        blocks.push(paragraph(&pending.join("\n")));
        pending.clear();
    }
}

fn line_block(line: &str) -> Option<Value> {
    if let Some(rest) = line.strip_prefix("### ") {
        return Some(heading_3(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return Some(heading_2(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return Some(heading_1(rest.trim()));
    }

    if matches!(line, "---" | "***" | "___") {
        return Some(divider());
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            let rest = rest.trim_start();
            if let Some(task) = rest.strip_prefix("[ ] ") {
                return Some(to_do(task.trim(), false));
            }
            if let Some(task) = rest
                .strip_prefix("[x] ")
                .or_else(|| rest.strip_prefix("[X] "))
            {
                return Some(to_do(task.trim(), true));
            }
            return Some(bulleted_list_item(rest.trim()));
        }
    }

    if let Some(rest) = line.strip_prefix('>') {
        return Some(quote(rest.trim()));
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
        {
            return Some(numbered_list_item(rest.trim()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::sanitize_blocks;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const GOLDEN_TEXT: &str = "# Title

- Item one
- Item two

```python
print(\"Hello\")
```
";

    fn content(block: &Value) -> &str {
        let kind = block["type"].as_str().unwrap();
        block[kind]["rich_text"][0]["text"]["content"].as_str().unwrap()
    }

    #[test]
    fn test_from_text_matches_golden() {
        let expected = json!([
            {
                "object": "block",
                "type": "heading_1",
                "heading_1": {"rich_text": [{"type": "text", "text": {"content": "Title"}}]}
            },
            {
                "object": "block",
                "type": "bulleted_list_item",
                "bulleted_list_item": {"rich_text": [{"type": "text", "text": {"content": "Item one"}}]}
            },
            {
                "object": "block",
                "type": "bulleted_list_item",
                "bulleted_list_item": {"rich_text": [{"type": "text", "text": {"content": "Item two"}}]}
            },
            {
                "object": "block",
                "type": "code",
                "code": {
                    "rich_text": [{"type": "text", "text": {"content": "print(\"Hello\")"}}],
                    "language": "python"
                }
            }
        ]);
        assert_eq!(Value::Array(from_text(GOLDEN_TEXT)), expected);
    }

    #[test]
    fn test_every_line_kind() {
        let blocks = from_text(
            "## Two\n### Three\n- [ ] open\n- [x] done\n* star\n1. first\n2) second\n> wise\n---\nplain",
        );
        let kinds: Vec<&str> = blocks.iter().map(|b| b["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                "heading_2",
                "heading_3",
                "to_do",
                "to_do",
                "bulleted_list_item",
                "numbered_list_item",
                "numbered_list_item",
                "quote",
                "divider",
                "paragraph"
            ]
        );
        assert_eq!(blocks[2]["to_do"]["checked"], false);
        assert_eq!(blocks[3]["to_do"]["checked"], true);
        assert_eq!(content(&blocks[6]), "second");
        assert_eq!(content(&blocks[7]), "wise");
    }

    #[test]
    fn test_paragraph_lines_are_joined() {
        let blocks = from_text("first line\nsecond line\n\nnext paragraph");
        assert_eq!(blocks.len(), 2);
        assert_eq!(content(&blocks[0]), "first line\nsecond line");
        assert_eq!(content(&blocks[1]), "next paragraph");
    }

    #[test]
    fn test_unterminated_fence_takes_the_rest() {
        let blocks = from_text("```\nlet x = 1;\n# not a heading");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["code"]["language"], "plain text");
        assert_eq!(content(&blocks[0]), "let x = 1;\n# not a heading");
    }

    #[test]
    fn test_output_passes_sanitizer() {
        let blocks = from_text(GOLDEN_TEXT);
        assert_eq!(sanitize_blocks(&blocks).unwrap(), blocks);
    }

    #[test]
    fn test_empty_text() {
        assert!(from_text("").is_empty());
        assert!(from_text("\n\n   \n").is_empty());
    }
}
