use serde::{Deserialize, Serialize};

/// A contact-ledger row. `last_contacted_at` is RFC 3339 UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactEntry {
    pub customer_key: String,
    pub last_contacted_at: String,
    pub contact_count: i64,
    pub updated_at: String,
}

/// A reminder-ledger row keyed by `<kind>:<name>:<date>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub reminder_key: String,
    pub sent_at: String,
}

/// A one-shot reminder added via the natural-language interface.
/// `fire_at` is naive local wall-clock time, `%Y-%m-%dT%H:%M:%S`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomReminder {
    pub id: String,
    pub message: String,
    pub fire_at: String,
    pub created_at: String,
    pub delivered: bool,
}
