use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use kilnbook_core::model::{
    CalendarEvent, EntityBody, EntityId, EntityKind, EntityRef, EventCategory, StudioTask,
};
use kilnbook_core::CoreError;
use kilnbook_query::{expand, summarize, AllocationSummary, DateRange, Occurrence, Window};

use crate::error::StudioError;
use crate::studio::Studio;

/// Which calendar events a view shows. Empty sets mean "any".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFilter {
    pub categories: Vec<EventCategory>,
    pub tasks: Vec<StudioTask>,
    /// Keep occurrences that already ended.
    pub include_past: bool,
}

impl Default for CalendarFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            tasks: Vec::new(),
            include_past: true,
        }
    }
}

impl CalendarFilter {
    pub fn category(mut self, category: EventCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn task(mut self, task: StudioTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn upcoming_only(mut self) -> Self {
        self.include_past = false;
        self
    }

    pub fn matches(&self, event: &CalendarEvent) -> bool {
        (self.categories.is_empty() || self.categories.contains(&event.category))
            && (self.tasks.is_empty() || event.task.is_some_and(|t| self.tasks.contains(&t)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaItem {
    pub event: EntityRef,
    pub title: String,
    pub category: EventCategory,
    pub task: Option<StudioTask>,
    pub all_day: bool,
    pub location: Option<String>,
    pub occurrence: Occurrence,
}

/// Occurrences starting on one day, in start order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub items: Vec<AgendaItem>,
}

impl Studio {
    /// Occurrences of one event within `range`.
    pub fn occurrences(
        &self,
        id: &EntityId,
        range: DateRange,
    ) -> Result<Vec<Occurrence>, StudioError> {
        let entity = self.get(EntityKind::CalendarEvent, id)?;
        match &entity.body {
            EntityBody::CalendarEvent(event) => Ok(expand(event, range).collect()),
            _ => Err(CoreError::NotFound {
                kind: EntityKind::CalendarEvent,
                id: id.to_string(),
            }
            .into()),
        }
    }

    /// Every matching occurrence in `range`, grouped by the day it starts.
    pub fn agenda(&self, range: DateRange, filter: &CalendarFilter) -> Vec<AgendaDay> {
        let now = self.now();
        let mut days: BTreeMap<NaiveDate, Vec<AgendaItem>> = BTreeMap::new();

        for entity in self.store().records(EntityKind::CalendarEvent) {
            let EntityBody::CalendarEvent(event) = &entity.body else {
                continue;
            };
            if !filter.matches(event) {
                continue;
            }
            for occurrence in expand(event, range) {
                if !filter.include_past && occurrence.end < now {
                    continue;
                }
                days.entry(occurrence.start.date_naive())
                    .or_default()
                    .push(AgendaItem {
                        event: entity.entity_ref(),
                        title: event.title.clone(),
                        category: event.category,
                        task: event.task,
                        all_day: event.all_day,
                        location: event.location.clone(),
                        occurrence,
                    });
            }
        }

        days.into_iter()
            .map(|(date, mut items)| {
                items.sort_by(|a, b| {
                    a.occurrence
                        .start
                        .cmp(&b.occurrence.start)
                        .then_with(|| a.title.cmp(&b.title))
                        .then_with(|| a.event.cmp(&b.event))
                });
                AgendaDay { date, items }
            })
            .collect()
    }

    /// Logged time for a day or ISO week against the configured availability.
    pub fn time_summary(&self, window: Window) -> AllocationSummary {
        let records = self.store().records(EntityKind::TimeEntry);
        let entries = records.iter().filter_map(|e| match &e.body {
            EntityBody::TimeEntry(entry) => Some(entry),
            _ => None,
        });
        summarize(entries, window, self.config().available_minutes_per_day)
    }
}
