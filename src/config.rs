use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Immutable application configuration.
///
/// Built once at process start from `homebase.toml` (or defaults) and passed
/// by reference to every component. Nothing mutates it after `load`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub reviews: ReviewThresholds,
    pub ppc: PpcThresholds,
    pub household: HouseholdConfig,
}

/// Thresholds for the review-request generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewThresholds {
    /// Minimum orders before a customer counts as a repeat buyer.
    pub min_purchases: u32,
    /// Wait at least this many days after the latest order.
    pub min_days_since_order: i64,
    /// Don't reach out beyond this many days after the latest order.
    pub max_days_since_order: i64,
    /// Minimum days between two review requests to the same customer.
    pub cooldown_days: i64,
    /// Email body with {first_name}, {product_name}, {order_count},
    /// {sender_name} placeholders.
    pub email_template: String,
    /// Name substituted into {sender_name}.
    pub sender_name: String,
    /// Text substituted for a placeholder with no value.
    pub missing_field_text: String,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            min_purchases: 2,
            min_days_since_order: 7,
            max_days_since_order: 30,
            cooldown_days: 90,
            email_template: DEFAULT_EMAIL_TEMPLATE.to_string(),
            sender_name: "The Team".to_string(),
            missing_field_text: "Friend".to_string(),
        }
    }
}

/// Default review-request email body.
pub const DEFAULT_EMAIL_TEMPLATE: &str = "\
Subject: How's your {product_name} working out?

Hi {first_name},

I noticed you've ordered from us {order_count} times now, and I wanted to
personally reach out and say thank you for being such a loyal customer.

If you have a moment, would you mind leaving a quick review on Amazon for
your recent {product_name} purchase? It takes just a minute and helps other
shoppers discover our products.

[Amazon Review Link]

Thanks again for your support!

Best,
{sender_name}
";

/// Thresholds for the PPC campaign analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PpcThresholds {
    /// Target ACOS as a fraction (0.30 = 30%).
    pub target_acos: f64,
    /// ACOS above this flags an urgent review.
    pub pause_threshold_acos: f64,
    /// Minimum clicks before making any judgment.
    pub min_clicks: u32,
    /// Minimum impressions before making any judgment.
    pub min_impressions: u32,
    /// Bid increase as a fraction of the current bid.
    pub bid_up_pct: f64,
    /// Bid decrease as a fraction of the current bid.
    pub bid_down_pct: f64,
    /// ACOS below target * this factor is exceptional, scale up hard.
    pub scale_acos_factor: f64,
    /// ACOS below target * this factor is good, scale up gently.
    pub good_acos_factor: f64,
    /// CTR below this (in percent) flags creative review.
    pub min_ctr_pct: f64,
}

impl Default for PpcThresholds {
    fn default() -> Self {
        Self {
            target_acos: 0.30,
            pause_threshold_acos: 0.50,
            min_clicks: 20,
            min_impressions: 500,
            bid_up_pct: 0.10,
            bid_down_pct: 0.15,
            scale_acos_factor: 0.60,
            good_acos_factor: 0.85,
            min_ctr_pct: 0.20,
        }
    }
}

/// A household member. Parents carry a work schedule, kids a care schedule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FamilyMember {
    pub name: String,
    /// "parent" or "kid".
    pub role: String,
    /// day name -> location ("commute", "wfh", "off", "school", "daycare", ...).
    pub schedule: HashMap<String, String>,
    /// When this member gets home on school/daycare days.
    #[serde(with = "opt_hhmm")]
    pub home_time: Option<NaiveTime>,
    /// Bedtime, used for wind-down reminders.
    #[serde(with = "opt_hhmm")]
    pub bedtime: Option<NaiveTime>,
}

/// A weekly activity (practice, lesson, class).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub kids: Vec<String>,
    /// Lowercase day name ("monday").
    pub day: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// How many minutes before start the prep reminder should land.
    pub prep_minutes: Option<i64>,
    /// Custom prep message; placeholders: {activity}, {kids}, {minutes}.
    pub prep_message: Option<String>,
}

fn default_duration() -> u32 {
    60
}

/// A fixed weekly reminder (trash night, weekly planning).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringReminder {
    pub name: String,
    pub day: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub message: String,
}

/// A dinner idea in one of the meal pools.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MealIdea {
    pub name: String,
    pub prep_minutes: u32,
    pub notes: String,
}

/// The three meal pools keyed by evening shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MealPools {
    pub quick: Vec<MealIdea>,
    pub normal: Vec<MealIdea>,
    pub weekend: Vec<MealIdea>,
}

/// An outbound message recipient.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub number: String,
}

/// Household schedule, roster and reminder tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    #[serde(with = "hhmm")]
    pub wake_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub dinner_time: NaiveTime,
    /// Activity reminders fire inside [start - max_lead, start - min_lead].
    pub min_lead_minutes: i64,
    pub max_lead_minutes: i64,
    /// Recurring/bedtime/custom reminders fire within this many minutes of
    /// their scheduled time.
    pub send_tolerance_minutes: i64,
    /// Hour used when a spoken reminder has no time ("remind me to...").
    pub default_reminder_hour: u32,
    /// Bedtime wind-down reminders fire this many minutes before bedtime.
    pub bedtime_lead_minutes: i64,
    /// Days that count as busy when an activity starts before dinner.
    pub busy_days: Vec<String>,
    /// Outbound message command as an argv template; `{recipient}` and
    /// `{message}` are substituted. None falls back to console output.
    pub message_command: Option<Vec<String>>,
    pub family: Vec<FamilyMember>,
    pub activities: Vec<Activity>,
    pub recurring: Vec<RecurringReminder>,
    pub meals: MealPools,
    pub contacts: Vec<Contact>,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            wake_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            dinner_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            min_lead_minutes: 15,
            max_lead_minutes: 30,
            send_tolerance_minutes: 5,
            default_reminder_hour: 19,
            bedtime_lead_minutes: 30,
            busy_days: vec!["monday".into(), "wednesday".into()],
            message_command: None,
            family: Vec::new(),
            activities: Vec::new(),
            recurring: Vec::new(),
            meals: MealPools::default(),
            contacts: Vec::new(),
        }
    }
}

impl HouseholdConfig {
    /// Activities scheduled on the given weekday, in start order.
    pub fn activities_on(&self, day: Weekday) -> Vec<&Activity> {
        let mut found: Vec<&Activity> = self
            .activities
            .iter()
            .filter(|a| weekday_from_name(&a.day) == Some(day))
            .collect();
        found.sort_by_key(|a| a.start);
        found
    }

    /// Recurring reminders scheduled on the given weekday.
    pub fn recurring_on(&self, day: Weekday) -> Vec<&RecurringReminder> {
        self.recurring
            .iter()
            .filter(|r| weekday_from_name(&r.day) == Some(day))
            .collect()
    }

    pub fn is_busy_day(&self, day: Weekday) -> bool {
        self.busy_days
            .iter()
            .any(|d| weekday_from_name(d) == Some(day))
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or from
    /// `<data_dir>/homebase.toml` when present, or fall back to defaults.
    ///
    /// An explicit path that does not exist or fails validation is fatal.
    pub fn load(path: Option<&Path>, data_dir: &Path) -> Result<AppConfig, AppError> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {}", p.display(), e))
                })?;
                Self::parse(&raw)?
            }
            None => {
                let default_path = data_dir.join("homebase.toml");
                if default_path.exists() {
                    let raw = std::fs::read_to_string(&default_path)?;
                    Self::parse(&raw)?
                } else {
                    tracing::debug!("No config file found, using built-in defaults");
                    AppConfig::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn parse(raw: &str) -> Result<AppConfig, AppError> {
        toml::from_str(raw).map_err(|e| AppError::Config(format!("invalid config: {e}")))
    }

    /// Range-check every threshold. Violations abort before any record
    /// is processed.
    pub fn validate(&self) -> Result<(), AppError> {
        let r = &self.reviews;
        if r.min_purchases == 0 {
            return Err(AppError::Config("reviews.min_purchases must be >= 1".into()));
        }
        if r.min_days_since_order < 0 || r.max_days_since_order < r.min_days_since_order {
            return Err(AppError::Config(
                "reviews day window must satisfy 0 <= min <= max".into(),
            ));
        }
        if r.cooldown_days < 0 {
            return Err(AppError::Config("reviews.cooldown_days must be >= 0".into()));
        }

        let p = &self.ppc;
        if p.target_acos <= 0.0 {
            return Err(AppError::Config("ppc.target_acos must be > 0".into()));
        }
        if p.pause_threshold_acos < p.target_acos {
            return Err(AppError::Config(
                "ppc.pause_threshold_acos must be >= ppc.target_acos".into(),
            ));
        }
        if p.min_clicks == 0 {
            return Err(AppError::Config("ppc.min_clicks must be >= 1".into()));
        }
        for (name, v) in [("bid_up_pct", p.bid_up_pct), ("bid_down_pct", p.bid_down_pct)] {
            if !(0.0..=1.0).contains(&v) || v == 0.0 {
                return Err(AppError::Config(format!("ppc.{name} must be in (0, 1]")));
            }
        }
        if !(0.0 < p.scale_acos_factor && p.scale_acos_factor <= p.good_acos_factor
            && p.good_acos_factor < 1.0)
        {
            return Err(AppError::Config(
                "ppc ACOS factors must satisfy 0 < scale <= good < 1".into(),
            ));
        }
        if p.min_ctr_pct < 0.0 {
            return Err(AppError::Config("ppc.min_ctr_pct must be >= 0".into()));
        }

        let h = &self.household;
        if h.min_lead_minutes < 0 || h.max_lead_minutes < h.min_lead_minutes {
            return Err(AppError::Config(
                "household lead window must satisfy 0 <= min <= max".into(),
            ));
        }
        if h.send_tolerance_minutes < 0 {
            return Err(AppError::Config(
                "household.send_tolerance_minutes must be >= 0".into(),
            ));
        }
        if h.bedtime_lead_minutes < 0 {
            return Err(AppError::Config(
                "household.bedtime_lead_minutes must be >= 0".into(),
            ));
        }
        if h.default_reminder_hour > 23 {
            return Err(AppError::Config(
                "household.default_reminder_hour must be 0-23".into(),
            ));
        }
        for day in &h.busy_days {
            weekday_from_name(day)
                .ok_or_else(|| AppError::Config(format!("unknown busy day '{day}'")))?;
        }
        for a in &h.activities {
            weekday_from_name(&a.day).ok_or_else(|| {
                AppError::Config(format!("activity '{}' has unknown day '{}'", a.name, a.day))
            })?;
        }
        for rr in &h.recurring {
            weekday_from_name(&rr.day).ok_or_else(|| {
                AppError::Config(format!("reminder '{}' has unknown day '{}'", rr.name, rr.day))
            })?;
        }
        Ok(())
    }
}

/// Resolve the default data directory (`~/.local/share/homebase` or OS
/// equivalent), falling back to the current directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("homebase"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse a lowercase or capitalized English day name.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Lowercase English day name for a weekday.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Serde adapter for `NaiveTime` as "HH:MM" (seconds accepted on read).
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}

/// Same as `hhmm` but for optional times.
mod opt_hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_some(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(raw) => super::hhmm::parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time '{raw}'"))),
        }
    }
}
