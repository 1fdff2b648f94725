//! Cache store schema.
//!
//! The schema version lives in SQLite's `user_version` header field. A fresh
//! store gets the partition schema in one transaction; a store written by a
//! newer build is refused rather than read with the wrong layout.

use super::Error;
use tokio_rusqlite::Connection;

/// Version written to `user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = include_str!("../../migrations/001_partitions.sql");

/// Bring the store up to [`SCHEMA_VERSION`].
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if current > SCHEMA_VERSION {
            return Err(Error::MigrationFailed(format!(
                "store schema version {current} is newer than supported version {SCHEMA_VERSION}"
            )));
        }
        if current == SCHEMA_VERSION {
            return Ok(());
        }

        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)
            .map_err(|e| Error::MigrationFailed(format!("partition schema: {e}")))?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;

        tracing::debug!(from = current, to = SCHEMA_VERSION, "cache schema migrated");
        Ok(())
    })
    .await
    .map_err(Error::from)
}
