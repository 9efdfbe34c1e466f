use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::output::OutputFormat;

#[derive(Args)]
pub struct ImportArgs {
    /// Export document to read
    pub path: PathBuf,
}

pub fn run(args: &ImportArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;

    let report = studio
        .import_from(&args.path)
        .with_context(|| format!("Failed to import {}", args.path.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text | OutputFormat::Markdown => {
            println!(
                "Imported {} entities ({} already present, {} rejected).",
                report.inserted, report.skipped, report.rejected
            );
        }
    }
    Ok(())
}
