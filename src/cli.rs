// src/cli.rs
//! Command-line surface of `notion-tools`, a debugging aid for the two tools.

use crate::blocks::from_text;
use crate::error::AppError;
use crate::toolkit::Toolkit;
use crate::tools::{PageParent, SearchInput, UpdateInstruction, UpdateMode, WriteInput};
use crate::types::ObjectId;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(name = "notion-tools", author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search Notion pages and databases
    Search(SearchArgs),
    /// Create or update Notion pages
    Write(WriteArgs),
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["query", "page_id", "database_id"])
))]
pub struct SearchArgs {
    /// Full-text query to run
    #[arg(long)]
    pub query: Option<String>,

    /// Retrieve a single page by ID or URL
    #[arg(long)]
    pub page_id: Option<String>,

    /// Query a database by ID or URL
    #[arg(long)]
    pub database_id: Option<String>,

    /// JSON object forwarded to Notion's search or database filter API
    #[arg(long, value_parser = parse_json_object, conflicts_with = "page_id")]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpdateModeArg {
    Append,
    Replace,
}

impl From<UpdateModeArg> for UpdateMode {
    fn from(mode: UpdateModeArg) -> Self {
        match mode {
            UpdateModeArg::Append => UpdateMode::Append,
            UpdateModeArg::Replace => UpdateMode::Replace,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("blocks")
        .multiple(false)
        .args(["blocks_json", "blocks_file", "blocks_from_text"])
))]
pub struct WriteArgs {
    /// Title for newly created pages
    #[arg(long)]
    pub title: Option<String>,

    /// Parent page ID for create operations
    #[arg(long, conflicts_with = "parent_database")]
    pub parent_page: Option<String>,

    /// Parent database ID for create operations
    #[arg(long)]
    pub parent_database: Option<String>,

    /// Existing page ID to update
    #[arg(long, conflicts_with_all = ["parent_page", "parent_database"])]
    pub update_page: Option<String>,

    /// Whether to append or replace blocks when updating
    #[arg(long, value_enum, default_value_t = UpdateModeArg::Append)]
    pub update_mode: UpdateModeArg,

    /// JSON object representing Notion property payloads
    #[arg(long, value_parser = parse_json_object)]
    pub properties: Option<Map<String, Value>>,

    /// JSON array of Notion blocks to send
    #[arg(long)]
    pub blocks_json: Option<String>,

    /// Path to a JSON file containing an array of blocks
    #[arg(long)]
    pub blocks_file: Option<PathBuf>,

    /// Markdown-like text converted to Notion blocks
    #[arg(long)]
    pub blocks_from_text: Option<String>,

    /// Render a summary without calling the Notion API
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl SearchArgs {
    pub fn into_input(self) -> SearchInput {
        SearchInput {
            query: self.query,
            page_id: self.page_id,
            database_id: self.database_id,
            filter: self.filter,
        }
    }
}

impl WriteArgs {
    /// Builds the tool input, loading blocks from whichever source was given.
    pub fn into_input(self) -> Result<WriteInput, AppError> {
        let parent = match (&self.parent_page, &self.parent_database) {
            (Some(page), _) => Some(PageParent::Page(ObjectId::parse(page)?)),
            (None, Some(database)) => Some(PageParent::Database(ObjectId::parse(database)?)),
            (None, None) => None,
        };

        let update = self
            .update_page
            .as_deref()
            .map(|page| -> Result<UpdateInstruction, AppError> {
                Ok(UpdateInstruction::new(
                    ObjectId::parse(page)?,
                    self.update_mode.into(),
                ))
            })
            .transpose()?;

        let blocks = if let Some(raw) = &self.blocks_json {
            Some(parse_block_list(raw, "--blocks-json")?)
        } else if let Some(path) = &self.blocks_file {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                AppError::InvalidInput(format!("blocks file {} unreadable: {}", path.display(), e))
            })?;
            Some(parse_block_list(&raw, &path.display().to_string())?)
        } else {
            self.blocks_from_text.as_deref().map(from_text)
        };

        Ok(WriteInput {
            title: self.title,
            parent,
            blocks,
            update,
            properties: self.properties,
            is_dry_run: self.dry_run,
        })
    }
}

/// Parses a JSON object argument.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

/// Parses a JSON array whose items are all objects.
pub fn parse_block_list(raw: &str, source: &str) -> Result<Vec<Value>, AppError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidInput(format!("Invalid JSON in {}: {}", source, e)))?;
    let Value::Array(items) = value else {
        return Err(AppError::InvalidInput(format!(
            "{} must contain a JSON array of blocks",
            source
        )));
    };
    if let Some(index) = items.iter().position(|item| !item.is_object()) {
        return Err(AppError::InvalidInput(format!(
            "{} item {} is not a JSON object",
            source, index
        )));
    }
    Ok(items)
}

/// Runs `command` against `toolkit`, printing pretty JSON to `out`.
pub async fn run<W: Write>(command: Command, toolkit: &Toolkit, out: &mut W) -> Result<(), AppError> {
    match command {
        Command::Search(args) => {
            let results = toolkit.search.search(&args.into_input()).await?;
            print_json(out, &results)
        }
        Command::Write(args) => {
            let result = toolkit.write.write(&args.into_input()?).await?;
            print_json(out, &result)
        }
    }
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, data: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, data)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<CommandLineInput, clap::Error> {
        CommandLineInput::try_parse_from(std::iter::once("notion-tools").chain(args.iter().copied()))
    }

    fn write_args(args: &[&str]) -> WriteArgs {
        match parse(args).unwrap().command {
            Command::Write(args) => args,
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_exactly_one_target() {
        assert!(parse(&["search"]).is_err());
        assert!(parse(&["search", "--query", "a", "--page-id", "b"]).is_err());
        assert!(parse(&["search", "--page-id", "b", "--filter", "{}"]).is_err());
        assert!(parse(&["search", "--query", "roadmap"]).is_ok());
    }

    #[test]
    fn test_filter_must_be_object() {
        assert!(parse(&["search", "--query", "a", "--filter", "[1]"]).is_err());
        assert!(parse(&["search", "--query", "a", "--filter", "{nope"]).is_err());

        let cli = parse(&[
            "-v",
            "search",
            "--database-id",
            "db-1",
            "--filter",
            r#"{"property": "Status"}"#,
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Search(args) => {
                let input = args.into_input();
                assert_eq!(input.database_id.as_deref(), Some("db-1"));
                assert_eq!(input.filter.unwrap()["property"], "Status");
            }
            other => panic!("expected search, got {:?}", other),
        }
    }

    #[test]
    fn test_write_conflicts() {
        assert!(parse(&["write", "--parent-page", "a", "--parent-database", "b"]).is_err());
        assert!(parse(&["write", "--parent-page", "a", "--update-page", "b"]).is_err());
        assert!(parse(&["write", "--blocks-json", "[]", "--blocks-from-text", "x"]).is_err());
        assert!(parse(&["write", "--update-page", "p", "--update-mode", "merge"]).is_err());
    }

    #[test]
    fn test_write_input_from_text() {
        let input = write_args(&[
            "write",
            "--update-page",
            "page-1",
            "--update-mode",
            "replace",
            "--blocks-from-text",
            "# Heading\nbody",
            "--dry-run",
        ])
        .into_input()
        .unwrap();

        assert_eq!(
            input.update,
            Some(UpdateInstruction::new(
                ObjectId::parse("page-1").unwrap(),
                UpdateMode::Replace
            ))
        );
        let blocks = input.blocks.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "heading_1");
        assert!(input.is_dry_run);
    }

    #[test]
    fn test_write_input_parent_and_properties() {
        let input = write_args(&[
            "write",
            "--parent-database",
            "db-1",
            "--properties",
            r#"{"Name": {"title": []}}"#,
        ])
        .into_input()
        .unwrap();
        assert_eq!(
            input.parent,
            Some(PageParent::Database(ObjectId::parse("db-1").unwrap()))
        );
        assert!(input.properties.unwrap().contains_key("Name"));
        assert_eq!(input.blocks, None);
    }

    #[test]
    fn test_block_list_validation() {
        assert!(parse_block_list("{}", "--blocks-json").is_err());
        assert!(parse_block_list("[1]", "--blocks-json").is_err());
        assert!(parse_block_list("[", "--blocks-json").is_err());
        assert_eq!(
            parse_block_list(r#"[{"type": "divider"}]"#, "--blocks-json")
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_blocks_file_is_read() {
        let path = std::env::temp_dir().join(format!("notion-tools-blocks-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"type": "divider"}]"#).unwrap();
        let input = write_args(&["write", "--title", "T", "--blocks-file", path.to_str().unwrap()])
            .into_input()
            .unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(input.blocks.unwrap()[0]["type"], "divider");

        let missing = write_args(&["write", "--blocks-file", "/nonexistent/blocks.json"]).into_input();
        assert!(matches!(missing, Err(AppError::InvalidInput(_))));
    }
}
