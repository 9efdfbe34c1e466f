pub mod reader;
pub mod rebuild;
pub mod tokenizer;
pub mod writer;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use kilnbook_core::model::EntityRef;

pub use rebuild::rebuild_index;
pub use reader::SearchHit;
pub use tokenizer::Tokenizer;

/// What the index remembers about one entity: its distinct tokens and the
/// `updated_at` used to break score ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexedDocument {
    tokens: BTreeSet<String>,
    updated_at: DateTime<Utc>,
}

/// Inverted index from normalized tokens to the entities whose text contains them.
///
/// Postings and documents are only ever changed together, one entity at a time.
#[derive(Clone, Default)]
pub struct SearchIndex {
    tokenizer: Tokenizer,
    postings: HashMap<String, BTreeSet<EntityRef>>,
    documents: HashMap<EntityRef, IndexedDocument>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed entities.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct tokens.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn contains(&self, target: &EntityRef) -> bool {
        self.documents.contains_key(target)
    }
}

impl PartialEq for SearchIndex {
    fn eq(&self, other: &Self) -> bool {
        self.postings == other.postings && self.documents == other.documents
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("documents", &self.documents.len())
            .field("terms", &self.postings.len())
            .finish()
    }
}
