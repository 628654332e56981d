use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::Category;

/// Every known category, ordered case-insensitively by name for pick lists.
pub fn fetch_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM categories ORDER BY name COLLATE NOCASE, id")
        .context("failed to prepare category query")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load categories")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect categories")?;

    Ok(categories)
}

/// Insert the category when its id is new and refresh the name otherwise, so
/// imports can rename categories without orphaning links.
pub fn upsert_category(conn: &Connection, category: &Category) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![category.id, category.name],
    )
    .context("failed to upsert category")?;
    Ok(())
}
