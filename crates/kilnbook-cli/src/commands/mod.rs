pub mod agenda;
pub mod create;
pub mod delete;
pub mod export;
pub mod import;
pub mod init;
pub mod link;
pub mod links;
pub mod list;
pub mod reindex;
pub mod search;
pub mod show;
pub mod stats;
pub mod time;
pub mod update;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use kilnbook_core::StudioConfig;
use kilnbook_sdk::Studio;

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a kilnbook data directory
    Init(init::InitArgs),
    /// Create an entity from JSON fields
    Create(create::CreateArgs),
    /// Show one entity with its links
    Show(show::ShowArgs),
    /// List entities of one kind (most recent first)
    List(list::ListArgs),
    /// Update fields of an entity
    Update(update::UpdateArgs),
    /// Delete an entity and detach links to it
    Delete(delete::DeleteArgs),
    /// Link two entities (kind:id kind:id)
    Link(link::LinkArgs),
    /// Remove a link between two entities
    Unlink(link::LinkArgs),
    /// Show links of an entity in both directions
    Links(links::LinksArgs),
    /// Search every entity by content
    Search(search::SearchArgs),
    /// Rebuild the search and cross-reference indices
    Reindex,
    /// Show calendar occurrences grouped by day
    Agenda(agenda::AgendaArgs),
    /// Summarize logged studio time for a day or week
    Time(time::TimeArgs),
    /// Export every entity as one JSON document
    Export(export::ExportArgs),
    /// Import entities from an export document
    Import(import::ImportArgs),
    /// Show aggregate statistics
    Stats,
}

/// Open the studio in `data_dir`, which must have been initialized.
pub fn open_studio(data_dir: &Path) -> Result<Studio> {
    if !StudioConfig::path(data_dir).is_file() {
        anyhow::bail!(
            "Kilnbook is not initialized in {}. Run `kilnbook init` first.",
            data_dir.display()
        );
    }
    Studio::open(data_dir)
        .with_context(|| format!("Failed to open kilnbook data in {}", data_dir.display()))
}
