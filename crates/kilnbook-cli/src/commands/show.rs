use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use kilnbook_sdk::{EntityKind, EntityRef};

use crate::output::format::format_entity;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ShowArgs {
    pub kind: EntityKind,

    /// Entity ID (full or prefix)
    pub id: String,
}

pub fn run(args: &ShowArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let studio = super::open_studio(data_dir)?;

    let id = studio
        .resolve(args.kind, &args.id)
        .with_context(|| format!("Failed to resolve {} '{}'", args.kind, args.id))?;
    let entity = studio.get(args.kind, &id)?;
    let links = studio.links_of(&EntityRef::new(args.kind, id.clone()))?;

    print!("{}", format_entity(entity, &links, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
