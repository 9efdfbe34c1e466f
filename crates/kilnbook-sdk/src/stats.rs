use std::collections::BTreeMap;

use serde::Serialize;

use kilnbook_core::model::{EntityBody, EntityKind, GoalStatus};

use crate::studio::Studio;

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioStats {
    pub total: usize,
    pub by_kind: BTreeMap<EntityKind, usize>,
    pub goals_by_status: BTreeMap<GoalStatus, usize>,
    pub recurring_events: usize,
    pub logged_minutes: u64,
    pub links: usize,
    pub search_index_built: bool,
}

impl Studio {
    pub fn stats(&self) -> StudioStats {
        let store = self.store();
        let by_kind: BTreeMap<EntityKind, usize> = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, store.count(kind)))
            .collect();

        let mut goals_by_status = BTreeMap::new();
        let mut recurring_events = 0;
        let mut logged_minutes = 0u64;
        for entity in store.iter() {
            match &entity.body {
                EntityBody::Goal(goal) => *goals_by_status.entry(goal.status).or_insert(0) += 1,
                EntityBody::CalendarEvent(event) if event.recurrence.is_some() => {
                    recurring_events += 1
                }
                EntityBody::TimeEntry(entry) => logged_minutes += u64::from(entry.minutes),
                _ => {}
            }
        }

        StudioStats {
            total: store.len(),
            by_kind,
            goals_by_status,
            recurring_events,
            logged_minutes,
            links: self.link_index().len(),
            search_index_built: self.search_index().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kilnbook_core::model::{EntityRef, Goal, JournalEntry, StudioTask, TimeEntry};
    use serde_json::json;

    #[test]
    fn test_stats_counts_everything() {
        let mut studio = Studio::in_memory();
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let g = studio
            .create(EntityBody::Goal(Goal::new("Open a shop", "independence")))
            .unwrap();
        studio
            .create(EntityBody::Goal(Goal::new("Learn raku", "curiosity")))
            .unwrap();
        studio
            .update_json(EntityKind::Goal, &g, json!({ "status": "abandoned" }))
            .unwrap();
        let j = studio
            .create(EntityBody::JournalEntry(JournalEntry::new(day, "Priced the mugs")))
            .unwrap();
        studio
            .create(EntityBody::TimeEntry(TimeEntry::new(day, 75, StudioTask::Inventory)))
            .unwrap();
        studio
            .link(
                &EntityRef::new(EntityKind::JournalEntry, j),
                &EntityRef::new(EntityKind::Goal, g),
            )
            .unwrap();

        let stats = studio.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_kind[&EntityKind::Goal], 2);
        assert_eq!(stats.by_kind[&EntityKind::PortfolioPiece], 0);
        assert_eq!(stats.goals_by_status[&GoalStatus::Abandoned], 1);
        assert_eq!(stats.goals_by_status[&GoalStatus::Active], 1);
        assert_eq!(stats.logged_minutes, 75);
        assert_eq!(stats.links, 1);
        assert!(!stats.search_index_built);
    }
}
