use rusqlite::{params, Row};

use crate::db::models::CustomReminder;
use crate::db::DbPool;
use crate::error::AppError;

/// When a reminder instance was sent, if ever.
pub fn sent_at(pool: &DbPool, reminder_key: &str) -> Result<Option<String>, AppError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT sent_at FROM reminder_ledger WHERE reminder_key = ?1",
        params![reminder_key],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(at) => Ok(Some(at)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// True if a reminder instance was already sent.
pub fn was_sent(pool: &DbPool, reminder_key: &str) -> Result<bool, AppError> {
    Ok(sent_at(pool, reminder_key)?.is_some())
}

/// Mark a reminder instance as sent. Idempotent.
pub fn mark_sent(pool: &DbPool, reminder_key: &str, sent_at: &str) -> Result<(), AppError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT OR IGNORE INTO reminder_ledger (reminder_key, sent_at) VALUES (?1, ?2)",
        params![reminder_key, sent_at],
    )?;
    Ok(())
}

fn row_to_custom(row: &Row) -> rusqlite::Result<CustomReminder> {
    Ok(CustomReminder {
        id: row.get("id")?,
        message: row.get("message")?,
        fire_at: row.get("fire_at")?,
        created_at: row.get("created_at")?,
        delivered: row.get::<_, i64>("delivered")? != 0,
    })
}

/// Store a one-shot reminder. `fire_at` is naive local time,
/// `%Y-%m-%dT%H:%M:%S`.
pub fn create_custom(
    pool: &DbPool,
    message: &str,
    fire_at: &str,
) -> Result<CustomReminder, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("reminder message cannot be empty".into()));
    }
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO custom_reminders (id, message, fire_at, created_at, delivered)
         VALUES (?1, ?2, ?3, ?4, 0)",
        params![id, message, fire_at, now],
    )?;
    drop(conn);

    get_custom(pool, &id)
}

pub fn get_custom(pool: &DbPool, id: &str) -> Result<CustomReminder, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM custom_reminders WHERE id = ?1",
        params![id],
        row_to_custom,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Reminder {id}")),
        other => AppError::Database(other),
    })
}

/// Undelivered custom reminders firing on the given local date
/// (`YYYY-MM-DD`), earliest first.
pub fn pending_for_day(pool: &DbPool, date: &str) -> Result<Vec<CustomReminder>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT * FROM custom_reminders
         WHERE delivered = 0 AND fire_at LIKE ?1
         ORDER BY fire_at ASC",
    )?;
    let pattern = format!("{date}%");
    let rows = stmt.query_map(params![pattern], row_to_custom)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(AppError::Database)
}

/// Flag a custom reminder as delivered. Returns false when the id is gone.
pub fn mark_delivered(pool: &DbPool, id: &str) -> Result<bool, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE custom_reminders SET delivered = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    #[test]
    fn test_sent_ledger_roundtrip() {
        let pool = init_test_db().unwrap();
        let key = "activity:Soccer:2026-08-06";

        assert!(!was_sent(&pool, key).unwrap());
        mark_sent(&pool, key, "2026-08-06T16:40:00+00:00").unwrap();
        assert!(was_sent(&pool, key).unwrap());

        // Second mark is a no-op, not an error
        mark_sent(&pool, key, "2026-08-06T16:41:00+00:00").unwrap();
        assert!(was_sent(&pool, key).unwrap());
    }

    #[test]
    fn test_custom_reminder_lifecycle() {
        let pool = init_test_db().unwrap();
        let created =
            create_custom(&pool, "take out trash", "2026-08-06T19:00:00").unwrap();
        assert!(!created.delivered);

        let pending = pending_for_day(&pool, "2026-08-06").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message, "take out trash");

        assert!(mark_delivered(&pool, &created.id).unwrap());
        assert!(pending_for_day(&pool, "2026-08-06").unwrap().is_empty());

        // Other days see nothing
        assert!(pending_for_day(&pool, "2026-08-07").unwrap().is_empty());
    }

    #[test]
    fn test_empty_message_rejected() {
        let pool = init_test_db().unwrap();
        assert!(create_custom(&pool, "  ", "2026-08-06T19:00:00").is_err());
    }

    #[test]
    fn test_mark_delivered_missing_id() {
        let pool = init_test_db().unwrap();
        assert!(!mark_delivered(&pool, "nope").unwrap());
    }
}
