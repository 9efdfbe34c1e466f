use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use kilnbook_sdk::{EntityKind, EventCategory, GoalStatus, ListFilter, StudioTask};

use crate::output::format::format_entity_list;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ListArgs {
    pub kind: EntityKind,

    /// Maximum number of entries
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Only events on this calendar (studio, community, public)
    #[arg(long)]
    pub category: Option<EventCategory>,

    /// Only goals with this status
    #[arg(long)]
    pub status: Option<GoalStatus>,

    /// Only events or time entries for this task
    #[arg(long)]
    pub task: Option<StudioTask>,

    /// Only records dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only records dated before this day (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

pub fn run(args: &ListArgs, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let studio = super::open_studio(data_dir)?;

    let filter = ListFilter {
        limit: Some(args.limit),
        from: args.from,
        until: args.until,
        category: args.category,
        status: args.status,
        task: args.task,
    };
    let entities = studio.list(args.kind, &filter);
    print!("{}", format_entity_list(&entities, format));
    if let OutputFormat::Json = format {
        println!();
    }
    Ok(())
}
