use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use kilnbook_sdk::{CalendarFilter, DateRange, EventCategory, StudioTask};

use crate::output::format::format_agenda;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct AgendaArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Only these calendars (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<EventCategory>,

    /// Only these task types (repeatable)
    #[arg(long = "task")]
    pub tasks: Vec<StudioTask>,

    /// Hide occurrences that have already ended
    #[arg(long)]
    pub upcoming: bool,
}

pub fn run(args: &AgendaArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    if args.to < args.from {
        anyhow::bail!("--to ({}) is before --from ({})", args.to, args.from);
    }
    let studio = super::open_studio(data_dir)?;

    let filter = CalendarFilter {
        categories: args.categories.clone(),
        tasks: args.tasks.clone(),
        include_past: !args.upcoming,
    };
    let agenda = studio.agenda(DateRange::days(args.from, args.to), &filter);

    print!("{}", format_agenda(&agenda, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
