use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read {key}"))
}

/// Inserts or replaces the value stored under `key`.
pub(super) fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("failed to write {key}"))?;
    Ok(())
}

/// Returns whether a row was removed.
pub(super) fn remove(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
        .with_context(|| format!("failed to remove {key}"))?;
    Ok(removed > 0)
}
