use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A unique identifier for an entity.
/// Generated as UUID v4 hex (no dashes). Unique within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_simple().to_string())
    }

    /// Parse and validate an ID string. Must be non-empty and free of separators.
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(CoreError::InvalidId("ID must not be empty".into()));
        }
        if s.contains(':') || s.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidId(format!(
                "ID must not contain ':' or whitespace, got '{s}'"
            )));
        }
        Ok(Self(s))
    }

    /// First eight characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The closed set of entity kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    CalendarEvent,
    TimeEntry,
    Goal,
    PortfolioPiece,
    JournalEntry,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::CalendarEvent,
        EntityKind::TimeEntry,
        EntityKind::Goal,
        EntityKind::PortfolioPiece,
        EntityKind::JournalEntry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::CalendarEvent => "calendar_event",
            EntityKind::TimeEntry => "time_entry",
            EntityKind::Goal => "goal",
            EntityKind::PortfolioPiece => "portfolio_piece",
            EntityKind::JournalEntry => "journal_entry",
        }
    }

    /// Name of the durable collection holding this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::CalendarEvent => "calendar_events",
            EntityKind::TimeEntry => "time_entries",
            EntityKind::Goal => "goals",
            EntityKind::PortfolioPiece => "portfolio_pieces",
            EntityKind::JournalEntry => "journal_entries",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "calendar_event" | "event" | "events" => Ok(EntityKind::CalendarEvent),
            "time_entry" | "time" | "entry" => Ok(EntityKind::TimeEntry),
            "goal" | "goals" => Ok(EntityKind::Goal),
            "portfolio_piece" | "piece" | "portfolio" => Ok(EntityKind::PortfolioPiece),
            "journal_entry" | "journal" => Ok(EntityKind::JournalEntry),
            _ => Err(CoreError::Parse(format!("unknown entity kind '{s}'"))),
        }
    }
}

/// A `(kind, id)` pair addressing one entity. Rendered as `kind:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| CoreError::Parse(format!("expected kind:id, got '{s}'")))?;
        Ok(Self {
            kind: kind.parse()?,
            id: EntityId::parse(id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new();
        assert_eq!(id.0.len(), 32); // UUID v4 hex, no dashes
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_entity_id_short_does_not_panic() {
        let short = EntityId("ab".into());
        assert_eq!(short.short(), "ab");
    }

    #[test]
    fn test_entity_id_parse_validation() {
        assert!(EntityId::parse("abc123").is_ok());
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("goal:abc").is_err());
        assert!(EntityId::parse("ab cd").is_err());
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!("event".parse::<EntityKind>().unwrap(), EntityKind::CalendarEvent);
        assert_eq!("Journal".parse::<EntityKind>().unwrap(), EntityKind::JournalEntry);
        assert_eq!(
            "portfolio-piece".parse::<EntityKind>().unwrap(),
            EntityKind::PortfolioPiece
        );
        assert!("kiln".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_ref_display_and_parse() {
        let r = EntityRef::new(EntityKind::Goal, "abc123");
        assert_eq!(r.to_string(), "goal:abc123");
        let parsed: EntityRef = "goal:abc123".parse().unwrap();
        assert_eq!(parsed, r);
        assert!("abc123".parse::<EntityRef>().is_err());
    }
}
