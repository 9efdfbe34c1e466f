use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::output::format::format_links;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct LinksArgs {
    /// Entity as kind:id (id may be a prefix)
    pub reference: String,
}

pub fn run(args: &LinksArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let studio = super::open_studio(data_dir)?;
    let target = studio
        .resolve_ref(&args.reference)
        .with_context(|| format!("Failed to resolve '{}'", args.reference))?;

    let links = studio.links_of(&target)?;
    print!("{}", format_links(&links, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
