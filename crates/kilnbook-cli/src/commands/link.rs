use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use kilnbook_sdk::{EntityRef, Studio};

#[derive(Args)]
pub struct LinkArgs {
    /// Source entity as kind:id (id may be a prefix)
    pub from: String,

    /// Target entity as kind:id (id may be a prefix)
    pub to: String,
}

fn resolve_pair(studio: &Studio, args: &LinkArgs) -> Result<(EntityRef, EntityRef)> {
    let from = studio
        .resolve_ref(&args.from)
        .with_context(|| format!("Failed to resolve '{}'", args.from))?;
    let to = studio
        .resolve_ref(&args.to)
        .with_context(|| format!("Failed to resolve '{}'", args.to))?;
    Ok((from, to))
}

pub fn run_link(args: &LinkArgs, data_dir: &Path) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;
    let (from, to) = resolve_pair(&studio, args)?;

    if studio.link(&from, &to).context("Failed to link")? {
        println!("Linked {from} -> {to}");
    } else {
        println!("{from} already links to {to}");
    }
    Ok(())
}

pub fn run_unlink(args: &LinkArgs, data_dir: &Path) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;
    let (from, to) = resolve_pair(&studio, args)?;

    if studio.unlink(&from, &to).context("Failed to unlink")? {
        println!("Unlinked {from} -> {to}");
    } else {
        println!("{from} does not link to {to}");
    }
    Ok(())
}
