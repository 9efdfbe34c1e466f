use serde::{Deserialize, Serialize};

use kilnbook_core::model::EntityRef;

/// Which side of a link an entity is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// The queried entity holds the reference.
    Outgoing,
    /// Another entity references the queried one.
    Incoming,
}

impl std::fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkDirection::Outgoing => f.write_str("->"),
            LinkDirection::Incoming => f.write_str("<-"),
        }
    }
}

/// One edge as seen from a particular entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub direction: LinkDirection,
    pub other: EntityRef,
}
