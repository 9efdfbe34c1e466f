use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use kilnbook_sdk::{EntityKind, EntityRef};

use crate::output::format::format_entity;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct CreateArgs {
    /// Entity kind (calendar_event, time_entry, goal, portfolio_piece, journal_entry)
    pub kind: EntityKind,

    /// Fields as a JSON object
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,

    /// Read the JSON object from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Read a JSON object from an inline argument or a file.
pub fn read_fields(json: Option<&str>, file: Option<&Path>) -> Result<serde_json::Value> {
    let raw = match (json, file) {
        (Some(json), _) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide fields with --json or --file"),
    };
    serde_json::from_str(&raw).context("Fields are not valid JSON")
}

pub fn run(args: &CreateArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;
    let fields = read_fields(args.json.as_deref(), args.file.as_deref())?;

    let id = studio
        .create_json(args.kind, fields)
        .with_context(|| format!("Failed to create {}", args.kind))?;
    let target = EntityRef::new(args.kind, id.clone());

    match format {
        OutputFormat::Json => {
            let entity = studio.get(args.kind, &id)?;
            println!("{}", format_entity(entity, &[], format));
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            eprintln!("Created {target}");
            println!("{id}");
        }
    }
    Ok(())
}
