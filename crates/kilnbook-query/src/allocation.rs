use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use kilnbook_core::model::{StudioTask, TimeEntry};

/// The period a time summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day(NaiveDate),
    /// The ISO week (Monday to Sunday) containing the date.
    Week(NaiveDate),
}

impl Window {
    pub fn first_day(&self) -> NaiveDate {
        match *self {
            Window::Day(day) => day,
            Window::Week(day) => day
                .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
                .unwrap_or(day),
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Window::Day(_) => 1,
            Window::Week(_) => 7,
        }
    }

    /// Last day of the window, inclusive.
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_days(Days::new(u64::from(self.days() - 1)))
            .unwrap_or(first)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.first_day() && day <= self.last_day()
    }
}

/// Logged time for one window, broken down by activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub by_category: BTreeMap<StudioTask, u64>,
    pub total_minutes: u64,
    pub available_minutes: u64,
    pub entry_count: usize,
    /// `total / available`. Above 1.0 when more time was logged than planned;
    /// 0.0 when no time is available.
    pub utilization_ratio: f64,
}

/// Sum the entries that fall inside `window`.
///
/// Entries are claims of time use, so overlapping entries each count in full.
pub fn summarize<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    window: Window,
    available_minutes_per_day: u32,
) -> AllocationSummary {
    let mut by_category: BTreeMap<StudioTask, u64> = BTreeMap::new();
    let mut total_minutes = 0u64;
    let mut entry_count = 0;
    for entry in entries.into_iter().filter(|e| window.contains(e.date)) {
        *by_category.entry(entry.activity).or_default() += u64::from(entry.minutes);
        total_minutes += u64::from(entry.minutes);
        entry_count += 1;
    }

    let available_minutes = u64::from(available_minutes_per_day) * u64::from(window.days());
    let utilization_ratio = if available_minutes == 0 {
        0.0
    } else {
        total_minutes as f64 / available_minutes as f64
    };

    AllocationSummary {
        window_start: window.first_day(),
        window_end: window.last_day(),
        by_category,
        total_minutes,
        available_minutes,
        entry_count,
        utilization_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_overlapping_entries_are_summed() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let entries = vec![
            TimeEntry::new(day(4), 120, StudioTask::Throwing).starting_at(nine),
            TimeEntry::new(day(4), 120, StudioTask::Throwing).starting_at(ten),
        ];
        let summary = summarize(&entries, Window::Day(day(4)), 480);
        assert_eq!(summary.by_category[&StudioTask::Throwing], 240);
        assert_eq!(summary.total_minutes, 240);
        assert_eq!(summary.entry_count, 2);
        assert!((summary.utilization_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_iso_week_starts_monday() {
        // 2025-03-06 is a Thursday.
        let window = Window::Week(day(6));
        assert_eq!(window.first_day(), day(3));
        assert_eq!(window.last_day(), day(9));

        let entries = vec![
            TimeEntry::new(day(2), 60, StudioTask::Glazing),
            TimeEntry::new(day(3), 90, StudioTask::Glazing),
            TimeEntry::new(day(9), 30, StudioTask::Inventory),
            TimeEntry::new(day(10), 60, StudioTask::Glazing),
        ];
        let summary = summarize(&entries, window, 60);
        assert_eq!(summary.total_minutes, 120);
        assert_eq!(summary.available_minutes, 420);
        assert_eq!(summary.by_category.len(), 2);
    }

    #[test]
    fn test_no_availability_means_zero_utilization() {
        let entries = vec![TimeEntry::new(day(4), 60, StudioTask::Meeting)];
        let summary = summarize(&entries, Window::Day(day(4)), 0);
        assert_eq!(summary.utilization_ratio, 0.0);
    }
}
