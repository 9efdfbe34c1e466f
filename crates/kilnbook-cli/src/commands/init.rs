use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use kilnbook_core::StudioConfig;
use kilnbook_sdk::Studio;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config with defaults
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, data_dir: &Path) -> Result<()> {
    if StudioConfig::path(data_dir).is_file() && !args.force {
        println!("Kilnbook is already initialized in {}.", data_dir.display());
        println!("Use --force to reset the config.");
        return Ok(());
    }

    Studio::init(data_dir, args.force).context("Failed to initialize kilnbook")?;

    println!("Kilnbook initialized in {}.", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  kilnbook create goal --json '{{\"title\": \"...\", \"purpose\": \"...\"}}'");
    println!("  kilnbook agenda --from 2025-03-01 --to 2025-03-31");
    println!("  kilnbook search glaze");
    Ok(())
}
