//! Schema migrations, compiled into the binary.
//!
//! Each entry is applied at most once, in order, and recorded by name in the
//! `_migrations` table.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Ordered list of `(name, sql)` pairs. Append new files; never reorder.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_transactions.sql",
    include_str!("../../migrations/001_create_transactions.sql"),
)];

fn is_applied(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row("SELECT 1 FROM _migrations WHERE name = ?", [name], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
}

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    debug!(known = MIGRATIONS.len(), "Checking for database migrations");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let mut applied = 0;
    for (name, sql) in MIGRATIONS {
        if is_applied(conn, name)? {
            continue;
        }

        info!(migration = %name, "Applying migration");
        // A failing script leaves neither its schema changes nor its record.
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?)", [name])?;
        tx.commit()?;
        applied += 1;
    }

    if applied > 0 {
        info!(count = applied, "Migrations applied successfully");
    } else {
        debug!("No new migrations to apply");
    }

    Ok(())
}
