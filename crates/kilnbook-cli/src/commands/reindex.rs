use std::path::Path;

use anyhow::Result;

pub fn run(data_dir: &Path) -> Result<()> {
    let mut studio = super::open_studio(data_dir)?;

    eprintln!("Rebuilding search and link indices...");
    let count = studio.rebuild_indices();
    studio.verify_indices()?;
    eprintln!("Indexed {count} entities ({} links).", studio.link_index().len());

    Ok(())
}
