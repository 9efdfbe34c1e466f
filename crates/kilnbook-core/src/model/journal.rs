use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<EntityId>,
}

impl JournalEntry {
    pub fn new(date: NaiveDate, body: impl Into<String>) -> Self {
        Self {
            date,
            mood: None,
            body: body.into(),
            event: None,
            piece: None,
        }
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn about_event(mut self, event: EntityId) -> Self {
        self.event = Some(event);
        self
    }

    pub fn about_piece(mut self, piece: EntityId) -> Self {
        self.piece = Some(piece);
        self
    }

    pub(crate) fn validate(&self, violations: &mut Vec<String>) {
        if self.body.trim().is_empty() {
            violations.push("body is required".into());
        }
    }
}
