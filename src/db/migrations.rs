use anyhow::Result;
use rusqlite::Connection;

const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Per-connection; needed for ON DELETE CASCADE.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
            color       TEXT NOT NULL,
            icon        TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS completions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id  INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            date         TEXT NOT NULL,
            completed    INTEGER NOT NULL DEFAULT 0,
            UNIQUE(activity_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_completions_activity
            ON completions(activity_id, date);

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    conn.execute(
        "INSERT OR IGNORE INTO app_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;
    log::debug!("Schema at version {}", SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: String = conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
