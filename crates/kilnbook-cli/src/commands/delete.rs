use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use kilnbook_sdk::EntityKind;

#[derive(Args)]
pub struct DeleteArgs {
    pub kind: EntityKind,

    /// Entity ID (full or prefix)
    pub id: String,
}

pub fn run(args: &DeleteArgs, data_dir: &Path) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;

    let id = studio
        .resolve(args.kind, &args.id)
        .with_context(|| format!("Failed to resolve {} '{}'", args.kind, args.id))?;
    let removed = studio
        .delete(args.kind, &id)
        .with_context(|| format!("Failed to delete {} {id}", args.kind))?;

    println!("Deleted {}: {}", removed.entity_ref(), removed.body.title());
    Ok(())
}
