use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use super::meals;
use crate::config::{day_name, Activity, FamilyMember, HouseholdConfig};

/// "5:00 PM" style clock formatting for people-facing text.
pub fn fmt_time(t: NaiveTime) -> String {
    let s = t.format("%I:%M %p").to_string();
    s.trim_start_matches('0').to_string()
}

/// One line for a parent's day: office, home office, or off.
fn parent_status(member: &FamilyMember, day: &str) -> String {
    match member.schedule.get(day).map(String::as_str) {
        Some("commute") => format!("{} commutes to the office", member.name),
        Some("wfh") => format!("{} works from home", member.name),
        _ => format!("{} is off today", member.name),
    }
}

/// One line for where a kid spends the day.
fn kid_line(member: &FamilyMember, day: &str) -> String {
    let home = member
        .home_time
        .map(|t| format!(", home at {}", fmt_time(t)))
        .unwrap_or_default();
    match member.schedule.get(day).map(String::as_str) {
        Some("school") => format!("{}: School{home}", member.name),
        Some("daycare") => format!("{}: Daycare{home}", member.name),
        Some("grandmother") => format!("{}: Grandmother's house", member.name),
        _ => format!("{}: Home", member.name),
    }
}

/// Evening load rating shown above the activity list.
pub fn busy_rating(activity_count: usize) -> &'static str {
    match activity_count {
        0 => "Chill evening - no activities",
        1..=2 => "Moderate evening",
        _ => "Busy night! Multiple activities",
    }
}

fn format_activity(activity: &Activity) -> String {
    format!(
        "  - {}: {} at {} ({} min)",
        activity.kids.join(", "),
        activity.name,
        fmt_time(activity.start),
        activity.duration_minutes
    )
}

/// One-line look at the next day's activities.
pub fn tomorrow_preview(cfg: &HouseholdConfig, date: NaiveDate) -> String {
    let tomorrow = date + Duration::days(1);
    let activities = cfg.activities_on(tomorrow.weekday());
    if activities.is_empty() {
        return "Tomorrow: No scheduled activities".to_string();
    }
    let list: Vec<String> = activities
        .iter()
        .take(2)
        .map(|a| format!("{} ({})", a.name, a.kids.join(", ")))
        .collect();
    format!("Tomorrow: {}", list.join(", "))
}

/// Compose the full morning briefing for a date. Pure with respect to
/// (config, date): the meal pick rotates by day ordinal, not RNG.
pub fn generate(cfg: &HouseholdConfig, date: NaiveDate) -> String {
    let day = day_name(date.weekday());
    let day_display = date.format("%A, %B %d").to_string();

    let mut lines = vec![
        format!("Good morning! Here's your {day_display} briefing:"),
        format!(
            "Routine: wake {}, dinner {}",
            fmt_time(cfg.wake_time),
            fmt_time(cfg.dinner_time)
        ),
        String::new(),
        "=== TODAY'S SCHEDULE ===".to_string(),
        String::new(),
    ];

    for parent in cfg.family.iter().filter(|m| m.role == "parent") {
        lines.push(parent_status(parent, day));
    }

    let kids: Vec<&FamilyMember> = cfg.family.iter().filter(|m| m.role == "kid").collect();
    if !kids.is_empty() {
        lines.push(String::new());
        lines.push("Kids:".to_string());
        for kid in kids {
            lines.push(format!("  {}", kid_line(kid, day)));
        }
    }
    lines.push(String::new());

    let activities = cfg.activities_on(date.weekday());
    if activities.is_empty() {
        lines.push("No activities today - enjoy the break!".to_string());
    } else {
        lines.push(format!("ACTIVITIES TODAY ({}):", activities.len()));
        lines.push(busy_rating(activities.len()).to_string());
        for activity in &activities {
            lines.push(format_activity(activity));
        }
    }
    lines.push(String::new());

    if let Some(suggestion) = meals::suggest(cfg, date) {
        lines.push("DINNER:".to_string());
        let note = match suggestion.pool {
            meals::PoolKind::Quick => format!(
                "  Quick meal tonight - {} ({} min)",
                suggestion.meal.name, suggestion.meal.prep_minutes
            ),
            meals::PoolKind::Weekend => {
                format!("  Weekend meal idea: {}", suggestion.meal.name)
            }
            meals::PoolKind::Normal => format!(
                "  Tonight: {} ({} min)",
                suggestion.meal.name, suggestion.meal.prep_minutes
            ),
        };
        lines.push(note);
        if !suggestion.meal.notes.is_empty() {
            lines.push(format!("  Tip: {}", suggestion.meal.notes));
        }
        lines.push(String::new());
    }

    let reminders = cfg.recurring_on(date.weekday());
    if !reminders.is_empty() {
        lines.push("REMINDERS:".to_string());
        for r in reminders {
            lines.push(format!("  {}", r.message));
        }
        lines.push(String::new());
    }

    lines.push("=== COMING UP ===".to_string());
    lines.push(tomorrow_preview(cfg, date));
    lines.push(String::new());
    lines.push("Have a great day!".to_string());

    lines.join("\n")
}

/// Activity rundown for one date, used by the schedule queries.
pub fn day_schedule(cfg: &HouseholdConfig, date: NaiveDate) -> String {
    let mut lines = vec![format!("{}:", date.format("%A, %B %d")), String::new()];
    let activities = cfg.activities_on(date.weekday());
    if activities.is_empty() {
        lines.push("No scheduled activities - enjoy the free time!".to_string());
    } else {
        lines.push("Activities:".to_string());
        for activity in activities {
            lines.push(format_activity(activity));
        }
    }
    lines.join("\n")
}

/// Short form for the NL interface: first `n` lines plus a pointer.
pub fn summary(cfg: &HouseholdConfig, date: NaiveDate, n: usize) -> String {
    let full = generate(cfg, date);
    let head: Vec<&str> = full.lines().take(n).collect();
    format!("{}\n\n(run `homebase briefing` for the complete version)", head.join("\n"))
}
