pub mod settings;

pub use settings::{StudioConfig, CONFIG_FILE, DEFAULT_DATA_DIR};
