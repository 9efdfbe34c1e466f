use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ExportArgs, data_dir: &Path) -> Result<()> {
    let studio = super::open_studio(data_dir)?;

    match &args.output {
        Some(path) => {
            studio
                .export_to(path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            eprintln!(
                "Exported {} entities to {}",
                studio.store().len(),
                path.display()
            );
        }
        None => println!("{}", studio.export().to_json()?),
    }
    Ok(())
}
