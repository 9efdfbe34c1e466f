//! Derived views over the Kilnbook store: search, cross-references,
//! recurrence expansion, time allocation and export.

pub mod allocation;
pub mod error;
pub mod export;
pub mod index;
pub mod links;
pub mod recurrence;
pub mod search;

pub use allocation::{summarize, AllocationSummary, Window};
pub use error::QueryError;
pub use export::{ExportDocument, ExportedEntity, ResolvedLink, EXPORT_FORMAT_VERSION};
pub use index::{SearchHit, SearchIndex};
pub use links::{Link, LinkDirection, LinkIndex};
pub use recurrence::{expand, DateRange, Occurrence, Occurrences};
pub use search::SearchEngine;
