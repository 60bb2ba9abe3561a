use rusqlite::{params, Row};

use crate::db::models::ContactEntry;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_entry(row: &Row) -> rusqlite::Result<ContactEntry> {
    Ok(ContactEntry {
        customer_key: row.get("customer_key")?,
        last_contacted_at: row.get("last_contacted_at")?,
        contact_count: row.get("contact_count")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Look up a customer's ledger entry. Returns None if never contacted.
pub fn get(pool: &DbPool, customer_key: &str) -> Result<Option<ContactEntry>, AppError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT * FROM contact_ledger WHERE customer_key = ?1",
        params![customer_key],
        row_to_entry,
    );
    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Record a contact. Creates the row or bumps `last_contacted_at` and the
/// running count. The ledger only ever moves forward.
pub fn record(pool: &DbPool, customer_key: &str, contacted_at: &str) -> Result<(), AppError> {
    let now = chrono::Utc::now().to_rfc3339();
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO contact_ledger (customer_key, last_contacted_at, contact_count, updated_at)
         VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(customer_key) DO UPDATE SET
           last_contacted_at = ?2,
           contact_count = contact_count + 1,
           updated_at = ?3",
        params![customer_key, contacted_at, now],
    )?;
    Ok(())
}

/// All ledger entries, newest contact first.
pub fn all(pool: &DbPool) -> Result<Vec<ContactEntry>, AppError> {
    let conn = pool.get()?;
    let mut stmt =
        conn.prepare("SELECT * FROM contact_ledger ORDER BY last_contacted_at DESC")?;
    let rows = stmt.query_map([], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(AppError::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    #[test]
    fn test_get_missing_returns_none() {
        let pool = init_test_db().unwrap();
        assert!(get(&pool, "nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_record_and_get() {
        let pool = init_test_db().unwrap();
        record(&pool, "a@example.com", "2026-08-01T12:00:00+00:00").unwrap();

        let entry = get(&pool, "a@example.com").unwrap().unwrap();
        assert_eq!(entry.last_contacted_at, "2026-08-01T12:00:00+00:00");
        assert_eq!(entry.contact_count, 1);
    }

    #[test]
    fn test_record_twice_bumps_count_and_timestamp() {
        let pool = init_test_db().unwrap();
        record(&pool, "a@example.com", "2026-05-01T12:00:00+00:00").unwrap();
        record(&pool, "a@example.com", "2026-08-01T12:00:00+00:00").unwrap();

        let entry = get(&pool, "a@example.com").unwrap().unwrap();
        assert_eq!(entry.contact_count, 2);
        assert_eq!(entry.last_contacted_at, "2026-08-01T12:00:00+00:00");
        assert_eq!(all(&pool).unwrap().len(), 1);
    }
}
