use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use kilnbook_core::model::EntityRef;

use super::SearchIndex;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub entity: EntityRef,
    /// Number of distinct query tokens the entity contains.
    pub score: usize,
    pub updated_at: DateTime<Utc>,
}

impl SearchIndex {
    /// Free-text search across every kind.
    ///
    /// Candidates are the union of the query tokens' postings. Results are
    /// ordered by score, then most recently updated, then `(kind, id)`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let terms: BTreeSet<String> = self.tokenizer.tokenize(query).into_iter().collect();

        let mut scores: HashMap<&EntityRef, usize> = HashMap::new();
        for term in &terms {
            if let Some(refs) = self.postings.get(term) {
                for target in refs {
                    *scores.entry(target).or_default() += 1;
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter_map(|(target, score)| {
                let doc = self.documents.get(target)?;
                Some(SearchHit {
                    entity: target.clone(),
                    score,
                    updated_at: doc.updated_at,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| a.entity.cmp(&b.entity))
        });
        hits.truncate(limit);
        hits
    }

    /// Entities containing one normalized token, in `(kind, id)` order.
    pub fn postings(&self, token: &str) -> Vec<EntityRef> {
        self.postings
            .get(token)
            .map(|refs| refs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `query` contains anything the tokenizer keeps.
    pub fn has_terms(&self, query: &str) -> bool {
        !self.tokenizer.tokenize(query).is_empty()
    }
}
