//! Core data model, entity store and JSON storage engine for Kilnbook.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StudioConfig;
pub use error::CoreError;
pub use notify::{ChangeEvent, ChangeFeed, ChangeListener, ListenerId};
pub use storage::JsonStorage;
pub use store::{EntityStore, ListFilter};
