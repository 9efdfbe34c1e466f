//! Expansion of recurring calendar events into concrete occurrences.
//!
//! Rules are stored on the event; occurrences are computed on demand for a
//! query range and never written back.

use std::collections::VecDeque;

use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};
use serde::Serialize;

use kilnbook_core::model::{CalendarEvent, Frequency, RecurrenceRule};

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whole days from `first` through `last`, both included.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        let start = first.and_time(NaiveTime::MIN).and_utc();
        let end = last
            .checked_add_days(Days::new(1))
            .unwrap_or(last)
            .and_time(NaiveTime::MIN)
            .and_utc();
        Self { start, end }
    }

    /// Whether an occurrence `[start, end)` overlaps the range. Zero-length
    /// occurrences count when they fall inside it.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && (end > self.start || start >= self.start)
    }
}

/// One concrete instance of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Position in the series, counted from the anchor (0 is the first occurrence).
    pub index: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Lazy, finite sequence of the occurrences of one event that intersect a range.
///
/// Cloning an unstarted iterator gives an independent copy, so a sequence can be
/// walked again from the beginning.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: Option<RecurrenceRule>,
    anchor: NaiveDateTime,
    duration: Duration,
    range: DateRange,
    period: u32,
    pending: VecDeque<NaiveDateTime>,
    emitted: u32,
    done: bool,
}

impl Occurrences {
    pub fn new(event: &CalendarEvent, range: DateRange) -> Self {
        Self {
            rule: event.recurrence.clone(),
            anchor: event.start.naive_utc(),
            duration: event.duration(),
            range,
            period: 0,
            pending: VecDeque::new(),
            emitted: 0,
            done: false,
        }
    }

    /// Candidate starts generated by the `period`-th step of the rule, oldest
    /// first. `None` once the calendar runs out or a one-off event is spent.
    fn starts_for_period(&self, period: u32) -> Option<Vec<NaiveDateTime>> {
        let Some(rule) = &self.rule else {
            return (period == 0).then(|| vec![self.anchor]);
        };
        let step = u64::from(period) * u64::from(rule.interval.max(1));
        let date = self.anchor.date();
        let time = self.anchor.time();

        match rule.frequency {
            Frequency::Daily => {
                let day = date.checked_add_days(Days::new(step))?;
                Some(vec![day.and_time(time)])
            }
            Frequency::Weekly => {
                let monday = date.checked_sub_days(Days::new(u64::from(
                    date.weekday().num_days_from_monday(),
                )))?;
                let week = monday.checked_add_days(Days::new(step.checked_mul(7)?))?;
                let mut days: Vec<Weekday> = if rule.weekdays.is_empty() {
                    vec![date.weekday()]
                } else {
                    rule.weekdays.clone()
                };
                days.sort_by_key(Weekday::num_days_from_monday);
                days.dedup();
                let mut starts = Vec::with_capacity(days.len());
                for day in days {
                    let on = week
                        .checked_add_days(Days::new(u64::from(day.num_days_from_monday())))?
                        .and_time(time);
                    if on >= self.anchor {
                        starts.push(on);
                    }
                }
                Some(starts)
            }
            Frequency::Monthly => {
                let months = u32::try_from(step).ok()?;
                Some(vec![clamped_month_day(date, months)?.and_time(time)])
            }
            Frequency::Yearly => {
                let months = u32::try_from(step.checked_mul(12)?).ok()?;
                Some(vec![clamped_month_day(date, months)?.and_time(time)])
            }
        }
    }

    fn finish(&mut self) -> Option<Occurrence> {
        self.done = true;
        None
    }
}

/// `anchor` moved forward by `months`, keeping its day of month where possible
/// and clamping to the last day of shorter months.
fn clamped_month_day(anchor: NaiveDate, months: u32) -> Option<NaiveDate> {
    // Stepping from the first of the month never clamps, so the day is applied afterwards.
    let first = anchor.with_day(1)?.checked_add_months(Months::new(months))?;
    let last_day = first
        .checked_add_months(Months::new(1))?
        .pred_opt()?
        .day();
    first.with_day(anchor.day().min(last_day))
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if self.done {
                return None;
            }
            let Some(start) = self.pending.pop_front() else {
                match self.starts_for_period(self.period) {
                    Some(starts) => {
                        self.pending.extend(starts);
                        self.period = self.period.checked_add(1)?;
                        continue;
                    }
                    None => return self.finish(),
                }
            };

            let start = start.and_utc();
            let rule = self.rule.as_ref();
            if rule.and_then(|r| r.count).is_some_and(|c| self.emitted >= c) {
                return self.finish();
            }
            if rule.and_then(|r| r.until).is_some_and(|u| start > u) {
                return self.finish();
            }
            if start >= self.range.end {
                return self.finish();
            }

            let index = self.emitted;
            self.emitted += 1;
            let end = start + self.duration;
            if self.range.intersects(start, end) {
                return Some(Occurrence { index, start, end });
            }
        }
    }
}

/// Expand an event over `range`. One-off events yield at most one occurrence.
pub fn expand(event: &CalendarEvent, range: DateRange) -> Occurrences {
    Occurrences::new(event, range)
}
