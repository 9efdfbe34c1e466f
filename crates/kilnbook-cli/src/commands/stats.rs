use std::path::Path;

use anyhow::Result;

use crate::output::format::format_stats;
use crate::output::OutputFormat;

pub fn run(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let studio = super::open_studio(data_dir)?;

    let stats = studio.stats();
    if stats.total == 0 && !matches!(format, OutputFormat::Json) {
        println!("No entities yet.");
        return Ok(());
    }
    print!("{}", format_stats(&stats, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
