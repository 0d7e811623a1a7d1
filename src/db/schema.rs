use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// `PRAGMA user_version` of a database holding the `kv_store` table.
pub(super) const SCHEMA_VERSION: i32 = 1;

/// Creates the `kv_store` table on a blank database. A file stamped with any
/// other version is refused rather than guessed at.
pub(super) fn ensure_schema(conn: &mut Connection) -> Result<()> {
    let found: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")?;

    match found {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn
                .transaction()
                .context("failed to begin schema transaction")?;
            tx.execute_batch(include_str!("schemas/kv_store.sql"))
                .context("failed to create kv_store table")?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)
                .context("failed to stamp schema version")?;
            tx.commit().context("failed to commit schema")
        }
        other => bail!(
            "session database has schema version {other}; this build only reads version {SCHEMA_VERSION}"
        ),
    }
}
