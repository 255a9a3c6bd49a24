// src/blocks/builders.rs
use serde_json::{json, Map, Value};

/// Longest `text.content` Notion accepts in one rich text object.
pub const MAX_RICH_TEXT_CONTENT: usize = 2000;

/// Languages Notion's code block accepts.
pub const CODE_LANGUAGES: &[&str] = &[
    "abap", "arduino", "bash", "basic", "c", "clojure", "coffeescript", "c++", "c#", "css",
    "dart", "diff", "docker", "elixir", "elm", "erlang", "flow", "fortran", "f#", "gherkin",
    "glsl", "go", "graphql", "groovy", "haskell", "html", "java", "javascript", "json",
    "julia", "kotlin", "latex", "less", "lisp", "livescript", "lua", "makefile", "markdown",
    "markup", "matlab", "mermaid", "nix", "objective-c", "ocaml", "pascal", "perl", "php",
    "plain text", "powershell", "prolog", "protobuf", "python", "r", "reason", "ruby",
    "rust", "sass", "scala", "scheme", "scss", "shell", "sql", "swift", "typescript",
    "vb.net", "verilog", "vhdl", "visual basic", "webassembly", "xml", "yaml",
    "java/c/c++/c#",
];

/// Builds a rich text array, splitting content at Notion's per-object limit.
///
/// Always yields at least one element, so empty text round-trips as `""`.
pub fn rich_text(content: &str) -> Value {
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return json!([text_object("")]);
    }
    Value::Array(
        chars
            .chunks(MAX_RICH_TEXT_CONTENT)
            .map(|chunk| text_object(&chunk.iter().collect::<String>()))
            .collect(),
    )
}

fn text_object(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn block(kind: &str, payload: Map<String, Value>) -> Value {
    let mut object = Map::new();
    object.insert("object".into(), json!("block"));
    object.insert("type".into(), json!(kind));
    object.insert(kind.into(), Value::Object(payload));
    Value::Object(object)
}

fn text_block(kind: &str, text: &str) -> Value {
    let mut payload = Map::new();
    payload.insert("rich_text".into(), rich_text(text));
    block(kind, payload)
}

pub fn paragraph(text: &str) -> Value {
    text_block("paragraph", text)
}

pub fn heading_1(text: &str) -> Value {
    text_block("heading_1", text)
}

pub fn heading_2(text: &str) -> Value {
    text_block("heading_2", text)
}

pub fn heading_3(text: &str) -> Value {
    text_block("heading_3", text)
}

pub fn bulleted_list_item(text: &str) -> Value {
    text_block("bulleted_list_item", text)
}

pub fn numbered_list_item(text: &str) -> Value {
    text_block("numbered_list_item", text)
}

pub fn quote(text: &str) -> Value {
    text_block("quote", text)
}

pub fn to_do(text: &str, checked: bool) -> Value {
    let mut payload = Map::new();
    payload.insert("rich_text".into(), rich_text(text));
    payload.insert("checked".into(), json!(checked));
    block("to_do", payload)
}

/// A toggle whose body holds `children`.
pub fn toggle(text: &str, children: Vec<Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("rich_text".into(), rich_text(text));
    if !children.is_empty() {
        payload.insert("children".into(), Value::Array(children));
    }
    block("toggle", payload)
}

/// A callout, optionally with an emoji icon.
pub fn callout(text: &str, emoji: Option<&str>) -> Value {
    let mut payload = Map::new();
    payload.insert("rich_text".into(), rich_text(text));
    if let Some(emoji) = emoji {
        payload.insert("icon".into(), json!({ "type": "emoji", "emoji": emoji }));
    }
    block("callout", payload)
}

/// A code block. Languages Notion does not know become `"plain text"`.
pub fn code(text: &str, language: &str) -> Value {
    let mut payload = Map::new();
    payload.insert("rich_text".into(), rich_text(text));
    payload.insert("language".into(), json!(normalize_language(language)));
    block("code", payload)
}

pub fn divider() -> Value {
    block("divider", Map::new())
}

/// Maps common aliases onto Notion's language names.
pub fn normalize_language(language: &str) -> &'static str {
    let lowered = language.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "" | "text" | "txt" | "plain" | "plaintext" => "plain text",
        "sh" | "zsh" => "shell",
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "rs" => "rust",
        "yml" => "yaml",
        "md" => "markdown",
        "cpp" => "c++",
        "csharp" | "cs" => "c#",
        "dockerfile" => "docker",
        other => other,
    };
    CODE_LANGUAGES
        .iter()
        .copied()
        .find(|known| *known == canonical)
        .unwrap_or("plain text")
}
