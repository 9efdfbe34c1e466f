use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use kilnbook_sdk::Window;

use crate::output::format::format_time_summary;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct TimeArgs {
    /// Summarize one day (YYYY-MM-DD)
    #[arg(long, conflicts_with = "week")]
    pub day: Option<NaiveDate>,

    /// Summarize the ISO week containing this day (YYYY-MM-DD)
    #[arg(long)]
    pub week: Option<NaiveDate>,
}

pub fn run(args: &TimeArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let studio = super::open_studio(data_dir)?;

    let window = match (args.day, args.week) {
        (_, Some(week)) => Window::Week(week),
        (Some(day), None) => Window::Day(day),
        (None, None) => Window::Day(studio.now().date_naive()),
    };
    let summary = studio.time_summary(window);

    print!("{}", format_time_summary(&summary, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
