use serde::Serialize;

use kilnbook_sdk::{
    AgendaDay, AllocationSummary, Entity, EntityBody, RecurrenceRule, ResolvedLink, SearchHit,
    StudioStats,
};

use super::OutputFormat;

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn short(id: &str) -> &str {
    &id[..8.min(id.len())]
}

/// Label/value pairs shared by the text and markdown renderings.
fn render_fields(fields: &[(&str, String)], fmt: OutputFormat) -> String {
    let mut out = String::new();
    for (label, value) in fields {
        match fmt {
            OutputFormat::Markdown => out.push_str(&format!("- **{label}:** {value}\n")),
            _ => out.push_str(&format!("{:<10} {value}\n", format!("{label}:"))),
        }
    }
    out
}

pub fn describe_rule(rule: &RecurrenceRule) -> String {
    let unit = match rule.frequency {
        kilnbook_sdk::Frequency::Daily => "day",
        kilnbook_sdk::Frequency::Weekly => "week",
        kilnbook_sdk::Frequency::Monthly => "month",
        kilnbook_sdk::Frequency::Yearly => "year",
    };
    let mut out = if rule.interval > 1 {
        format!("every {} {unit}s", rule.interval)
    } else {
        format!("every {unit}")
    };
    if !rule.weekdays.is_empty() {
        let days: Vec<String> = rule.weekdays.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!(" on {}", days.join(", ")));
    }
    if let Some(until) = rule.until {
        out.push_str(&format!(" until {}", until.format("%Y-%m-%d %H:%M")));
    }
    if let Some(count) = rule.count {
        out.push_str(&format!(" ({count} times)"));
    }
    out
}

fn body_fields(body: &EntityBody) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    match body {
        EntityBody::CalendarEvent(e) => {
            fields.push(("Category", e.category.to_string()));
            if let Some(task) = e.task {
                fields.push(("Task", task.to_string()));
            }
            let when = if e.all_day {
                format!("{} (all day)", e.start.format("%Y-%m-%d"))
            } else {
                format!(
                    "{} to {}",
                    e.start.format("%Y-%m-%d %H:%M"),
                    e.end.format("%Y-%m-%d %H:%M")
                )
            };
            fields.push(("When", when));
            if let Some(rule) = &e.recurrence {
                fields.push(("Repeats", describe_rule(rule)));
            }
            if let Some(location) = &e.location {
                fields.push(("Location", location.clone()));
            }
            if let Some(notes) = &e.notes {
                fields.push(("Notes", notes.clone()));
            }
        }
        EntityBody::TimeEntry(t) => {
            let start = t
                .start_time
                .map(|s| format!(" from {}", s.format("%H:%M")))
                .unwrap_or_default();
            fields.push(("Date", format!("{}{start}", t.date)));
            fields.push(("Duration", format!("{} min", t.minutes)));
            fields.push(("Activity", t.activity.to_string()));
            if let Some(event) = &t.event {
                fields.push(("Event", event.to_string()));
            }
            if !t.reflection.is_empty() {
                fields.push(("Reflection", t.reflection.clone()));
            }
        }
        EntityBody::Goal(g) => {
            fields.push(("Purpose", g.purpose.clone()));
            if !g.category.is_empty() {
                fields.push(("Category", g.category.clone()));
            }
            fields.push(("Status", g.status.to_string()));
            if let Some(metric) = &g.metric {
                fields.push((
                    "Progress",
                    format!(
                        "{} / {} {} ({:.0}%)",
                        metric.progress,
                        metric.target,
                        metric.unit,
                        metric.fraction() * 100.0
                    ),
                ));
            }
            if !g.journal_entries.is_empty() {
                fields.push(("Journal", format!("{} entries", g.journal_entries.len())));
            }
        }
        EntityBody::PortfolioPiece(p) => {
            for (label, value) in [
                ("Clay", &p.clay_body),
                ("Firing", &p.firing_schedule),
                ("Glaze", &p.glaze),
            ] {
                if let Some(value) = value {
                    fields.push((label, value.clone()));
                }
            }
            if let Some(rating) = p.success_rating {
                fields.push(("Rating", format!("{rating}/5")));
            }
            if let Some(started) = p.started_on {
                fields.push(("Started", started.to_string()));
            }
            if let Some(completed) = p.completed_on {
                fields.push(("Completed", completed.to_string()));
            }
            for (label, value) in [
                ("Who", &p.big_questions.who),
                ("What", &p.big_questions.what),
                ("Why", &p.big_questions.why),
            ] {
                if !value.is_empty() {
                    fields.push((label, value.clone()));
                }
            }
        }
        EntityBody::JournalEntry(j) => {
            fields.push(("Date", j.date.to_string()));
            if let Some(mood) = &j.mood {
                fields.push(("Mood", mood.clone()));
            }
        }
    }
    fields
}

pub fn format_entity_list(entities: &[&Entity], fmt: OutputFormat) -> String {
    if let OutputFormat::Json = fmt {
        return to_json(entities);
    }
    if entities.is_empty() {
        return "No entities found.\n".to_string();
    }

    let mut out = String::new();
    for e in entities {
        let date = e
            .body
            .date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!("{}  {date:<10}  {}", short(e.id.as_str()), e.body.title());
        match fmt {
            OutputFormat::Markdown => out.push_str(&format!("- `{}` {line}\n", e.kind())),
            _ => out.push_str(&format!("\u{25c6} {line}\n")),
        }
    }
    out
}

pub fn format_entity(entity: &Entity, links: &[ResolvedLink], fmt: OutputFormat) -> String {
    if let OutputFormat::Json = fmt {
        return to_json(&serde_json::json!({ "entity": entity, "links": links }));
    }

    let mut fields = vec![
        ("Id", entity.entity_ref().to_string()),
        ("Created", entity.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ("Updated", entity.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    ];
    fields.extend(body_fields(&entity.body));

    let mut out = match fmt {
        OutputFormat::Markdown => format!("# {}\n\n", entity.body.title()),
        _ => format!("{}\n", entity.body.title()),
    };
    out.push_str(&render_fields(&fields, fmt));

    if let EntityBody::JournalEntry(j) = &entity.body {
        out.push('\n');
        out.push_str(&j.body);
        out.push('\n');
    }

    if !links.is_empty() {
        out.push_str("\n--- Links ---\n");
        out.push_str(&format_links(links, fmt));
    }
    out
}

pub fn format_links(links: &[ResolvedLink], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => to_json(links),
        OutputFormat::Text | OutputFormat::Markdown => {
            if links.is_empty() {
                return "No links.\n".to_string();
            }
            let mut out = String::new();
            for link in links {
                out.push_str(&format!(
                    "  {} {}  {}\n",
                    link.direction, link.entity, link.title
                ));
            }
            out
        }
    }
}

pub fn format_search_hits(hits: &[(SearchHit, String)], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => {
            let rows: Vec<_> = hits
                .iter()
                .map(|(hit, title)| {
                    serde_json::json!({
                        "kind": hit.entity.kind,
                        "id": hit.entity.id,
                        "title": title,
                        "score": hit.score,
                        "updated_at": hit.updated_at,
                    })
                })
                .collect();
            to_json(&rows)
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            let mut out = String::new();
            for (hit, title) in hits {
                out.push_str(&format!(
                    "{:<16} {}  {title}  (score: {})\n",
                    hit.entity.kind.as_str(),
                    short(hit.entity.id.as_str()),
                    hit.score
                ));
            }
            out
        }
    }
}

pub fn format_agenda(days: &[AgendaDay], fmt: OutputFormat) -> String {
    if let OutputFormat::Json = fmt {
        return to_json(days);
    }
    if days.is_empty() {
        return "No events to show.\n".to_string();
    }

    let mut out = String::new();
    for day in days {
        match fmt {
            OutputFormat::Markdown => out.push_str(&format!("### {}\n", day.date)),
            _ => out.push_str(&format!("{}\n", day.date)),
        }
        for item in &day.items {
            let when = if item.all_day {
                "All day".to_string()
            } else {
                format!(
                    "{} to {}",
                    item.occurrence.start.format("%H:%M"),
                    item.occurrence.end.format("%H:%M")
                )
            };
            let task = item.task.map(|t| format!(" \u{2022} {t}")).unwrap_or_default();
            out.push_str(&format!(
                "  {when:<14} {}  [{}{task}]",
                item.title, item.category
            ));
            if let Some(location) = &item.location {
                out.push_str(&format!("  @ {location}"));
            }
            out.push('\n');
        }
    }
    out
}

pub fn format_time_summary(summary: &AllocationSummary, fmt: OutputFormat) -> String {
    if let OutputFormat::Json = fmt {
        return to_json(summary);
    }

    let mut out = if summary.window_start == summary.window_end {
        format!("Studio time on {}\n", summary.window_start)
    } else {
        format!(
            "Studio time {} to {}\n",
            summary.window_start, summary.window_end
        )
    };
    for (task, minutes) in &summary.by_category {
        out.push_str(&format!("  {:<14} {:>5} min\n", task.label(), minutes));
    }
    out.push_str(&format!(
        "  {:<14} {:>5} min of {} available ({:.0}%)\n",
        "Total",
        summary.total_minutes,
        summary.available_minutes,
        summary.utilization_ratio * 100.0
    ));
    out
}

pub fn format_stats(stats: &StudioStats, fmt: OutputFormat) -> String {
    if let OutputFormat::Json = fmt {
        return to_json(stats);
    }

    let mut out = format!("Entities: {}\n", stats.total);
    for (kind, count) in &stats.by_kind {
        out.push_str(&format!("  {:<16} {count}\n", kind.as_str()));
    }
    if !stats.goals_by_status.is_empty() {
        out.push_str("Goals:\n");
        for (status, count) in &stats.goals_by_status {
            out.push_str(&format!("  {status:<16} {count}\n"));
        }
    }
    out.push_str(&format!("Recurring events: {}\n", stats.recurring_events));
    out.push_str(&format!("Logged time: {} min\n", stats.logged_minutes));
    out.push_str(&format!("Links: {}\n", stats.links));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kilnbook_sdk::Frequency;

    #[test]
    fn test_describe_rule() {
        let rule = RecurrenceRule::weekly_on([chrono::Weekday::Mon, chrono::Weekday::Thu]).every(2);
        assert_eq!(describe_rule(&rule), "every 2 weeks on Mon, Thu");
        let rule = RecurrenceRule::monthly().times(6);
        assert_eq!(rule.frequency, Frequency::Monthly);
        assert_eq!(describe_rule(&rule), "every month (6 times)");
    }

    #[test]
    fn test_render_fields_markdown() {
        let fields = [("Status", "active".to_string())];
        assert_eq!(
            render_fields(&fields, OutputFormat::Markdown),
            "- **Status:** active\n"
        );
        assert_eq!(render_fields(&fields, OutputFormat::Text), "Status:    active\n");
    }
}
