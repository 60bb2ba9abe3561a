use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::db::{repos, DbPool};
use crate::error::AppError;

// =============================================================================
// Ledger - the one piece of state shared across runs
// =============================================================================

/// Durable "already contacted / already reminded" store.
///
/// Keys are namespaced strings: a customer email for review requests,
/// `"<kind>:<name>:<date>"` for reminder instances. Injected into the
/// pipelines so tests and `--dry-run` can swap in [`MemoryLedger`].
pub trait Ledger {
    /// Last time anything was recorded for this key, if ever.
    fn last_event(&self, key: &str) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Record an event for this key. Overwrites forward only; a ledger
    /// never forgets a key.
    fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

/// True when the key has no event, or its last event is older than
/// `cooldown_days` relative to `now`.
pub fn outside_cooldown<L: Ledger + ?Sized>(
    ledger: &L,
    key: &str,
    now: DateTime<Utc>,
    cooldown_days: i64,
) -> Result<bool, AppError> {
    match ledger.last_event(key)? {
        None => Ok(true),
        Some(last) => Ok(now.signed_duration_since(last).num_days() >= cooldown_days),
    }
}

// =============================================================================
// SqliteLedger
// =============================================================================

/// SQLite-backed ledger over the shared pool.
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Ledger for SqliteLedger {
    fn last_event(&self, key: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        // Reminder keys are namespaced with ':'; everything else lives in
        // the contact ledger.
        let stored = if key.contains(':') {
            repos::reminders::sent_at(&self.pool, key)?
        } else {
            repos::contacts::get(&self.pool, key)?.map(|e| e.last_contacted_at)
        };
        match stored {
            None => Ok(None),
            Some(raw) => {
                let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|e| {
                    AppError::Internal(format!("bad timestamp in ledger for {key}: {e}"))
                })?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
        }
    }

    fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        if key.contains(':') {
            repos::reminders::mark_sent(&self.pool, key, &at.to_rfc3339())
        } else {
            repos::contacts::record(&self.pool, key, &at.to_rfc3339())
        }
    }
}

// =============================================================================
// MemoryLedger
// =============================================================================

/// In-memory ledger. Backs `--dry-run` and unit tests; nothing survives
/// the process.
#[derive(Default)]
pub struct MemoryLedger {
    events: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event, for tests that need pre-existing history.
    pub fn with_event(self, key: &str, at: DateTime<Utc>) -> Self {
        self.events.lock().unwrap().insert(key.to_string(), at);
        self
    }
}

impl Ledger for MemoryLedger {
    fn last_event(&self, key: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        Ok(self.events.lock().unwrap().get(key).copied())
    }

    fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        self.events.lock().unwrap().insert(key.to_string(), at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use chrono::TimeZone;

    #[test]
    fn test_memory_ledger_roundtrip() {
        let ledger = MemoryLedger::new();
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

        assert!(ledger.last_event("a@example.com").unwrap().is_none());
        ledger.record("a@example.com", at).unwrap();
        assert_eq!(ledger.last_event("a@example.com").unwrap(), Some(at));
    }

    #[test]
    fn test_cooldown_window() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let ledger = MemoryLedger::new()
            .with_event("recent@example.com", now - chrono::Duration::days(10))
            .with_event("old@example.com", now - chrono::Duration::days(120));

        assert!(!outside_cooldown(&ledger, "recent@example.com", now, 90).unwrap());
        assert!(outside_cooldown(&ledger, "old@example.com", now, 90).unwrap());
        assert!(outside_cooldown(&ledger, "never@example.com", now, 90).unwrap());
    }

    #[test]
    fn test_sqlite_ledger_contact_keys() {
        let pool = init_test_db().unwrap();
        let ledger = SqliteLedger::new(pool);
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

        assert!(ledger.last_event("a@example.com").unwrap().is_none());
        ledger.record("a@example.com", at).unwrap();
        assert_eq!(ledger.last_event("a@example.com").unwrap(), Some(at));
    }

    #[test]
    fn test_sqlite_ledger_reminder_keys() {
        let pool = init_test_db().unwrap();
        let ledger = SqliteLedger::new(pool);
        let at = Utc.with_ymd_and_hms(2026, 8, 6, 16, 40, 0).unwrap();
        let key = "activity:Soccer:2026-08-06";

        assert!(ledger.last_event(key).unwrap().is_none());
        ledger.record(key, at).unwrap();
        assert!(ledger.last_event(key).unwrap().is_some());
    }
}
