use std::sync::OnceLock;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::Regex;

/// The closed set of commands the text interface understands.
///
/// Classification is deterministic keyword/pattern matching in a fixed
/// priority order; anything else is `Unknown`, never a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Today's full briefing.
    Briefing,
    /// Tomorrow's schedule.
    Tomorrow,
    /// Today's activities only.
    Activities,
    /// Add a one-shot reminder.
    RemindAdd {
        message: String,
        fire_at: NaiveDateTime,
        /// True when no time was given and the default hour was used.
        defaulted: bool,
    },
    /// Dinner suggestion.
    Meals,
    Help,
    Unknown,
}

fn any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify one free-text command.
///
/// `now` anchors relative time expressions; `default_hour` is used when a
/// reminder carries no time at all.
pub fn classify(text: &str, now: NaiveDateTime, default_hour: u32) -> Intent {
    let text = text.to_lowercase();
    let text = text.trim();

    if any_keyword(text, &["briefing", "schedule today", "what's today", "whats today"]) {
        return Intent::Briefing;
    }
    // Reminders outrank the tomorrow query: "remind me ... tomorrow at 7"
    // is a reminder that happens to mention tomorrow.
    if any_keyword(text, &["remind me", "remind us", "set reminder", "set a reminder"]) {
        return parse_reminder(text, now, default_hour);
    }
    if any_keyword(text, &["tomorrow", "next day"]) {
        return Intent::Tomorrow;
    }
    if any_keyword(text, &["dinner", "meal", "what to cook", "eat tonight"]) {
        return Intent::Meals;
    }
    if any_keyword(text, &["activities", "busy tonight", "schedule"]) {
        return Intent::Activities;
    }
    if any_keyword(text, &["help", "what can you do", "commands"]) {
        return Intent::Help;
    }
    Intent::Unknown
}

fn message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:remind (?:me|us)|set (?:a )?reminder)(?:\s+(?:to|about))?\s+(.+?)(?:\s+at\s.*|\s+on\s.*|\s+in\s.*|\s+tonight.*|\s+tomorrow.*|$)",
        )
        .unwrap()
    })
}

fn leading_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:in an hour|in 1 hour|in 30 minutes|in half an hour|tonight|tomorrow)\s+(?:to\s+)?",
        )
        .unwrap()
    })
}

fn parse_reminder(text: &str, now: NaiveDateTime, default_hour: u32) -> Intent {
    let Some(message) = message_re()
        .captures(text)
        .and_then(|c| c.get(1))
        // "remind me in an hour to X": the time phrase leads the message
        .map(|m| leading_time_re().replace(m.as_str().trim(), "").trim().to_string())
        .filter(|m| !m.is_empty())
    else {
        return Intent::Unknown;
    };

    match parse_time(text, now) {
        Some(fire_at) => Intent::RemindAdd { message, fire_at, defaulted: false },
        None => {
            // No time given: default to the configured evening hour,
            // rolling to tomorrow when that has already passed.
            let mut fire_at = now
                .date()
                .and_time(NaiveTime::from_hms_opt(default_hour, 0, 0).unwrap());
            if fire_at <= now {
                fire_at += Duration::days(1);
            }
            Intent::RemindAdd { message, fire_at, defaulted: true }
        }
    }
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").unwrap())
}

fn at_clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bat\s+(\d{1,2}):(\d{2})\b").unwrap())
}

/// Extract a concrete fire time from the text, if any.
///
/// Handles "at 7pm", "at 6:30 am", "at 19:30", "in an hour",
/// "in 30 minutes", "tonight" and a trailing "tomorrow". A clock time in
/// the past rolls to the next day unless the text says "today".
pub fn parse_time(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let clock = clock_re()
        .captures(text)
        .and_then(|caps| {
            let mut hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
            match &caps[3] {
                "pm" if hour != 12 => hour += 12,
                "am" if hour == 12 => hour = 0,
                _ => {}
            }
            NaiveTime::from_hms_opt(hour, minute, 0)
        })
        .or_else(|| {
            let caps = at_clock_re().captures(text)?;
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        });

    if let Some(time) = clock {
        let mut when = now.date().and_time(time);
        if text.contains("tomorrow") {
            when += Duration::days(1);
        } else if when < now && !text.contains("today") {
            // Assume the next occurrence when the time already passed
            when += Duration::days(1);
        }
        return Some(when);
    }

    if text.contains("in an hour") || text.contains("in 1 hour") {
        return Some(now + Duration::hours(1));
    }
    if text.contains("in 30 minutes") || text.contains("in half an hour") {
        return Some(now + Duration::minutes(30));
    }
    if text.contains("tonight") {
        return Some(now.date().and_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
    }
    None
}

/// The reply for unrecognized input. A wrong guess is worse than asking.
pub const NOT_UNDERSTOOD: &str =
    "I'm not sure what you're asking. Try: 'briefing', 'remind me to...', 'dinner ideas', or 'help'";

/// Help text listing the closed command set.
pub const HELP_TEXT: &str = "\
HOME MANAGER COMMANDS:

SCHEDULE:
  - \"briefing\"        today's full schedule
  - \"tomorrow\"        see tomorrow's plan
  - \"activities\"      today's activities only

REMINDERS:
  - \"remind me to ... at 7pm\"
  - \"remind us about ... tomorrow at 7pm\"
  - \"remind me in an hour to ...\"

MEALS:
  - \"dinner ideas\"    get a suggestion for tonight
";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        // Thursday 2026-08-06, 10:00
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
    }

    fn classify_now(text: &str) -> Intent {
        classify(text, now(), 19)
    }

    #[test]
    fn test_closed_set_classification() {
        assert_eq!(classify_now("Briefing please"), Intent::Briefing);
        assert_eq!(classify_now("what's today look like"), Intent::Briefing);
        assert_eq!(classify_now("what about tomorrow?"), Intent::Tomorrow);
        assert_eq!(classify_now("dinner ideas"), Intent::Meals);
        assert_eq!(classify_now("what should we eat tonight"), Intent::Meals);
        assert_eq!(classify_now("any activities today?"), Intent::Activities);
        assert_eq!(classify_now("help"), Intent::Help);
    }

    #[test]
    fn test_unknown_is_not_understood_not_a_failure() {
        assert_eq!(classify_now("fgsfds"), Intent::Unknown);
        assert_eq!(classify_now(""), Intent::Unknown);
    }

    #[test]
    fn test_remind_with_clock_time() {
        let intent = classify_now("remind me to take out trash at 7pm");
        let Intent::RemindAdd { message, fire_at, defaulted } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(message, "take out trash");
        assert_eq!(fire_at, now().date().and_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
        assert!(!defaulted);
    }

    #[test]
    fn test_remind_with_minutes_and_am() {
        let intent = classify_now("remind us to pack lunches tomorrow at 6:30 am");
        let Intent::RemindAdd { message, fire_at, .. } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(message, "pack lunches");
        let expected = NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(fire_at, expected);
    }

    #[test]
    fn test_remind_past_time_rolls_to_next_day() {
        // 8am already passed at 10:00
        let intent = classify_now("remind me to water plants at 8am");
        let Intent::RemindAdd { fire_at, .. } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(fire_at.date(), NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
    }

    #[test]
    fn test_remind_relative_times() {
        let intent = classify_now("remind me to flip the laundry in an hour");
        let Intent::RemindAdd { fire_at, message, .. } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(message, "flip the laundry");
        assert_eq!(fire_at, now() + Duration::hours(1));

        let intent = classify_now("remind me to check the oven in 30 minutes");
        let Intent::RemindAdd { fire_at, .. } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(fire_at, now() + Duration::minutes(30));
    }

    #[test]
    fn test_remind_with_leading_time_phrase() {
        // The time phrase can lead the message, per the help text
        let intent = classify_now("remind me in an hour to flip the laundry");
        let Intent::RemindAdd { message, fire_at, .. } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(message, "flip the laundry");
        assert_eq!(fire_at, now() + Duration::hours(1));
    }

    #[test]
    fn test_remind_without_time_uses_default_hour() {
        let intent = classify_now("remind me to call grandma");
        let Intent::RemindAdd { message, fire_at, defaulted } = intent else {
            panic!("expected RemindAdd");
        };
        assert_eq!(message, "call grandma");
        assert!(defaulted);
        assert_eq!(fire_at.time(), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
        assert_eq!(fire_at.date(), now().date());
    }

    #[test]
    fn test_remind_without_message_is_unknown() {
        assert_eq!(classify_now("remind me"), Intent::Unknown);
    }

    #[test]
    fn test_twenty_four_hour_clock() {
        let when = parse_time("at 19:30", now()).unwrap();
        assert_eq!(when.time(), NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn test_noon_and_midnight_edge_cases() {
        assert_eq!(
            parse_time("at 12pm", now()).unwrap().time(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
        // 12am is midnight, already passed at 10:00, rolls a day
        let midnight = parse_time("at 12am", now()).unwrap();
        assert_eq!(midnight.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(midnight.date(), NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
    }

    #[test]
    fn test_classification_is_deterministic() {
        for text in ["briefing", "remind me to x at 7pm", "dinner", "???"] {
            assert_eq!(classify_now(text), classify_now(text));
        }
    }
}
