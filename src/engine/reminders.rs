use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::briefing::fmt_time;
use super::template::{render, TemplateContext};
use crate::config::HouseholdConfig;
use crate::db::models::CustomReminder;
use crate::error::AppError;
use crate::ledger::Ledger;

/// Storage format for custom reminder fire times (naive local).
pub const FIRE_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DEFAULT_PREP_MESSAGE: &str = "{activity} in {minutes} min - time to get ready ({kids})";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    ActivityPrep,
    Recurring,
    Bedtime,
    Custom,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::ActivityPrep => "activity",
            ReminderKind::Recurring => "recurring",
            ReminderKind::Bedtime => "bedtime",
            ReminderKind::Custom => "custom",
        }
    }
}

/// One reminder instance planned for a specific day.
#[derive(Debug, Clone)]
pub struct ReminderInstance {
    pub kind: ReminderKind,
    /// Stable name within the day; part of the ledger key.
    pub name: String,
    pub message: String,
    pub fire_at: NaiveDateTime,
    /// The event this reminder leads up to; set for activity reminders,
    /// used for lead-window eligibility.
    pub event_start: Option<NaiveDateTime>,
}

/// Ledger key for one reminder instance: `<kind>:<name>:<date>`.
pub fn reminder_key(instance: &ReminderInstance, date: NaiveDate) -> String {
    format!("{}:{}:{}", instance.kind.as_str(), instance.name, date.format("%Y-%m-%d"))
}

/// The lead-window predicate for event reminders: now must sit inside
/// [start - max_lead, start - min_lead], inclusive on both ends.
pub fn within_lead_window(
    event_start: NaiveDateTime,
    now: NaiveDateTime,
    min_lead_minutes: i64,
    max_lead_minutes: i64,
) -> bool {
    let lead = event_start.signed_duration_since(now).num_minutes();
    lead >= min_lead_minutes && lead <= max_lead_minutes
}

/// Fire-time predicate for fixed-time reminders: within the tolerance
/// window around the scheduled time.
pub fn near_fire_time(fire_at: NaiveDateTime, now: NaiveDateTime, tolerance_minutes: i64) -> bool {
    (now - fire_at).num_minutes().abs() <= tolerance_minutes
}

fn prep_message(cfg_message: Option<&str>, activity: &crate::config::Activity, minutes: i64) -> String {
    let ctx = TemplateContext::new("")
        .set("activity", activity.name.clone())
        .set("kids", activity.kids.join(", "))
        .set("minutes", minutes.to_string());
    render(cfg_message.unwrap_or(DEFAULT_PREP_MESSAGE), &ctx)
}

/// Build every reminder instance for one day: activity prep, recurring,
/// bedtime wind-downs and stored custom reminders, sorted by fire time.
pub fn plan_for_day(
    cfg: &HouseholdConfig,
    customs: &[CustomReminder],
    date: NaiveDate,
) -> Vec<ReminderInstance> {
    let mut plan = Vec::new();
    let day = date.weekday();

    for activity in cfg.activities_on(day) {
        let start = date.and_time(activity.start);
        let lead = activity.prep_minutes.unwrap_or(cfg.max_lead_minutes);
        plan.push(ReminderInstance {
            kind: ReminderKind::ActivityPrep,
            name: activity.name.clone(),
            message: prep_message(activity.prep_message.as_deref(), activity, lead),
            fire_at: start - Duration::minutes(lead),
            event_start: Some(start),
        });
    }

    for recurring in cfg.recurring_on(day) {
        plan.push(ReminderInstance {
            kind: ReminderKind::Recurring,
            name: recurring.name.clone(),
            message: recurring.message.clone(),
            fire_at: date.and_time(recurring.time),
            event_start: None,
        });
    }

    for member in &cfg.family {
        let Some(bedtime) = member.bedtime else { continue };
        plan.push(ReminderInstance {
            kind: ReminderKind::Bedtime,
            name: member.name.clone(),
            message: format!(
                "{} bedtime at {} - start the wind-down routine",
                member.name,
                fmt_time(bedtime)
            ),
            fire_at: date.and_time(bedtime) - Duration::minutes(cfg.bedtime_lead_minutes),
            event_start: None,
        });
    }

    for custom in customs {
        let Ok(fire_at) = NaiveDateTime::parse_from_str(&custom.fire_at, FIRE_AT_FORMAT) else {
            tracing::warn!(id = %custom.id, raw = %custom.fire_at, "unparseable custom reminder time");
            continue;
        };
        if fire_at.date() != date {
            continue;
        }
        plan.push(ReminderInstance {
            kind: ReminderKind::Custom,
            name: custom.id.clone(),
            message: custom.message.clone(),
            fire_at,
            event_start: None,
        });
    }

    plan.sort_by_key(|r| r.fire_at);
    plan
}

/// Reminders visible in the "upcoming" listing: fire time within the next
/// `hours_ahead` hours.
pub fn upcoming(plan: &[ReminderInstance], now: NaiveDateTime, hours_ahead: i64) -> Vec<&ReminderInstance> {
    let cutoff = now + Duration::hours(hours_ahead);
    plan.iter()
        .filter(|r| r.fire_at >= now && r.fire_at <= cutoff)
        .collect()
}

/// Reminders due right now and not yet sent for this instance.
///
/// Activity reminders use the lead window against the event start; fixed
/// reminders use the tolerance window around their fire time. The ledger
/// is the only dedup guard, so an instance already recorded never comes
/// back, regardless of input order.
pub fn due(
    plan: &[ReminderInstance],
    now: NaiveDateTime,
    cfg: &HouseholdConfig,
    ledger: &dyn Ledger,
    date: NaiveDate,
) -> Result<Vec<ReminderInstance>, AppError> {
    let mut out = Vec::new();
    for instance in plan {
        let eligible = match instance.event_start {
            Some(start) => {
                within_lead_window(start, now, cfg.min_lead_minutes, cfg.max_lead_minutes)
            }
            None => near_fire_time(instance.fire_at, now, cfg.send_tolerance_minutes),
        };
        if !eligible {
            continue;
        }
        if ledger.last_event(&reminder_key(instance, date))?.is_some() {
            tracing::debug!(name = %instance.name, "reminder already sent for this instance");
            continue;
        }
        out.push(instance.clone());
    }
    Ok(out)
}

/// Display line for one reminder.
pub fn format_line(instance: &ReminderInstance) -> String {
    format!("{}: {}", fmt_time(instance.fire_at.time()), instance.message)
}
