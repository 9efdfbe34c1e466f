use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{EntityKind, EntityRef};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid {kind}: {}", violations.join("; "))]
    Validation {
        kind: EntityKind,
        violations: Vec<String>,
    },

    #[error("Dangling reference from {from} to {to}")]
    DanglingReference { from: EntityRef, to: EntityRef },

    #[error("{target} was modified at {actual}, expected {expected}")]
    Conflict {
        target: EntityRef,
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },

    #[error("Ambiguous {kind} id prefix '{prefix}' ({matches} matches)")]
    AmbiguousId {
        kind: EntityKind,
        prefix: String,
        matches: usize,
    },

    #[error("Failed to persist {collection}: {source}")]
    Persistence {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Data directory not initialized for kilnbook (run `kilnbook init`)")]
    NotInitialized,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid entity ID: {0}")]
    InvalidId(String),
}

impl CoreError {
    pub fn not_found(target: &EntityRef) -> Self {
        CoreError::NotFound {
            kind: target.kind,
            id: target.id.to_string(),
        }
    }
}
