use rusqlite::Connection;

use crate::error::AppError;

/// Run the idempotent schema migration.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::debug!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Contact ledger: one row per customer ever sent a review request.
-- last_contacted_at gates the cool-down window.
-- ============================================================================

CREATE TABLE IF NOT EXISTS contact_ledger (
    customer_key      TEXT PRIMARY KEY,
    last_contacted_at TEXT NOT NULL,
    contact_count     INTEGER NOT NULL DEFAULT 1,
    updated_at        TEXT NOT NULL
);

-- ============================================================================
-- Reminder ledger: one row per reminder instance ever sent.
-- Key format: "<kind>:<name>:<YYYY-MM-DD>".
-- ============================================================================

CREATE TABLE IF NOT EXISTS reminder_ledger (
    reminder_key TEXT PRIMARY KEY,
    sent_at      TEXT NOT NULL
);

-- ============================================================================
-- Custom reminders added via the natural-language interface.
-- fire_at is naive local wall-clock time.
-- ============================================================================

CREATE TABLE IF NOT EXISTS custom_reminders (
    id         TEXT PRIMARY KEY,
    message    TEXT NOT NULL,
    fire_at    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    delivered  INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_custom_reminders_fire ON custom_reminders(fire_at, delivered);
"#;
