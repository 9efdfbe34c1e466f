//! Rust SDK for Kilnbook: one [`Studio`] context over the entity store, the
//! search and cross-reference indices, and the data directory.
//!
//! # Example
//! ```no_run
//! use kilnbook_sdk::{DateRange, EntityBody, EntityKind, EntityRef, Goal, JournalEntry, Studio};
//! use chrono::NaiveDate;
//!
//! let mut studio = Studio::open(std::path::Path::new(".kilnbook")).unwrap();
//! let goal = studio.create(EntityBody::Goal(Goal::new("Throw 100 mugs", "consistency"))).unwrap();
//! let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
//! let entry = studio
//!     .create(EntityBody::JournalEntry(JournalEntry::new(day, "Mug 37: finally even walls")))
//!     .unwrap();
//! studio
//!     .link(&EntityRef::new(EntityKind::Goal, goal), &EntityRef::new(EntityKind::JournalEntry, entry))
//!     .unwrap();
//! for hit in studio.search("mug walls", None).unwrap() {
//!     println!("{} ({})", hit.entity, hit.score);
//! }
//! let _agenda = studio.agenda(DateRange::days(day, day), &Default::default());
//! ```

mod calendar;
mod error;
mod stats;
mod studio;

pub use calendar::{AgendaDay, AgendaItem, CalendarFilter};
pub use error::{ErrorKind, StudioError};
pub use stats::StudioStats;
pub use studio::{parse_body, ImportReport, Studio};

// Re-export the types SDK users need
pub use kilnbook_core::model::{
    BigQuestions, CalendarEvent, Entity, EntityBody, EntityId, EntityKind, EntityPatch, EntityRef,
    EventCategory, Frequency, Goal, GoalMetric, GoalStatus, JournalEntry, PhotoHandle,
    PortfolioPiece, RecurrenceRule, StudioTask, TimeEntry,
};
pub use kilnbook_core::{ChangeEvent, ChangeListener, ListFilter, ManualClock, StudioConfig};
pub use kilnbook_query::{
    AllocationSummary, DateRange, ExportDocument, LinkDirection, Occurrence, ResolvedLink,
    SearchHit, Window,
};
