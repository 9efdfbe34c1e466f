use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use kilnbook_sdk::{EntityKind, EntityPatch};

use super::create::read_fields;
use crate::output::format::format_entity;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct UpdateArgs {
    pub kind: EntityKind,

    /// Entity ID (full or prefix)
    pub id: String,

    /// Fields to change as a JSON object; `null` clears optional fields
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,

    /// Read the JSON object from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Reject the update if the entity changed after this timestamp (RFC 3339)
    #[arg(long)]
    pub if_unmodified: Option<DateTime<Utc>>,
}

pub fn run(args: &UpdateArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;

    let id = studio
        .resolve(args.kind, &args.id)
        .with_context(|| format!("Failed to resolve {} '{}'", args.kind, args.id))?;
    let fields = read_fields(args.json.as_deref(), args.file.as_deref())?;
    let patch = EntityPatch::from_json(args.kind, fields).context("Invalid update fields")?;

    let updated = match args.if_unmodified {
        Some(expected) => studio.update_if_unmodified(args.kind, &id, expected, &patch),
        None => studio.update(args.kind, &id, &patch),
    }
    .with_context(|| format!("Failed to update {} {id}", args.kind))?;

    print!("{}", format_entity(&updated, &[], format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
