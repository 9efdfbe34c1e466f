use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::output::format::format_search_hits;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct SearchArgs {
    /// Search query (free text across every kind)
    pub query: String,

    /// Maximum number of results (defaults to the configured limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

pub fn run(args: &SearchArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;

    let hits = studio.search(&args.query, args.limit)?;

    if hits.is_empty() {
        eprintln!("No results found for: {}", args.query);
        if let OutputFormat::Json = format {
            println!("[]");
        }
        return Ok(());
    }

    let titled: Vec<_> = hits
        .into_iter()
        .map(|hit| {
            let title = studio
                .store()
                .get_ref(&hit.entity)
                .map(|e| e.body.title())
                .unwrap_or_default();
            (hit, title)
        })
        .collect();

    if !matches!(format, OutputFormat::Json) {
        eprintln!("Found {} result(s) for: {}\n", titled.len(), args.query);
    }
    print!("{}", format_search_hits(&titled, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
