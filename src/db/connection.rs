use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Open (or create) the SQLite catalog at `path` and make sure the schema is
/// in place.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    init_schema(&conn)?;
    info!(path = %path.display(), "catalog database ready");
    Ok(conn)
}

/// Run the lazy migrations on an open connection. Also turns on
/// `PRAGMA foreign_keys` so cascades behave the same in tests (in-memory
/// databases) and production runs.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resources (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            type TEXT NOT NULL,
            configuration TEXT,
            group_size INTEGER NOT NULL CHECK (group_size >= 1),
            description TEXT NOT NULL DEFAULT '',
            alternative_names TEXT NOT NULL DEFAULT '',
            publication_status TEXT NOT NULL DEFAULT 'DRAFT',
            edit_proposal_original_resource_id TEXT
                REFERENCES resources(id) ON DELETE CASCADE,
            video TEXT,
            show_introduction TEXT
        )",
        [],
    )
    .context("failed to create resources table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create categories table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resource_categories (
            resource_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (resource_id, category_id),
            FOREIGN KEY(resource_id) REFERENCES resources(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create resource_categories table")?;

    // Related targets may not be imported yet, so only the owner is a
    // foreign key and the title is kept alongside the id.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS related_resources (
            resource_id TEXT NOT NULL,
            related_id TEXT NOT NULL,
            title TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (resource_id, related_id),
            FOREIGN KEY(resource_id) REFERENCES resources(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create related_resources table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lesson_plans (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create lesson_plans table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lesson_plan_resources (
            lesson_plan_id TEXT NOT NULL,
            resource_id TEXT NOT NULL,
            PRIMARY KEY (lesson_plan_id, resource_id),
            FOREIGN KEY(lesson_plan_id) REFERENCES lesson_plans(id) ON DELETE CASCADE,
            FOREIGN KEY(resource_id) REFERENCES resources(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create lesson_plan_resources table")?;

    debug!("schema migrations applied");
    Ok(())
}
