use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use rusqlite::{ffi, params, Connection, Error as SqlError, Row};
use tracing::{debug, info};

use super::categories::upsert_category;
use crate::error::CatalogError;
use crate::models::{
    AlternativeNames, Category, LessonPlanRef, PublicationStatus, RelatedResource, Resource,
    ResourceConfiguration, ResourceRef, ResourceType,
};

const RESOURCE_COLUMNS: &str = "id, title, type, configuration, group_size, description, \
     alternative_names, publication_status, edit_proposal_original_resource_id, video, \
     show_introduction";

/// Raw row as stored. Enum codes stay strings until conversion so an unknown
/// code surfaces as `UnmappedEnumValue` instead of a generic SQLite error.
struct ResourceRow {
    id: String,
    title: String,
    kind: String,
    configuration: Option<String>,
    group_size: u32,
    description: String,
    alternative_names: String,
    publication_status: String,
    edit_proposal_original_resource_id: Option<String>,
    video: Option<String>,
    show_introduction: Option<String>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = CatalogError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let configuration = row
            .configuration
            .as_deref()
            .map(str::parse::<ResourceConfiguration>)
            .transpose()?;
        let alternative_names = (!row.alternative_names.is_empty())
            .then_some(AlternativeNames::LegacyDelimited(row.alternative_names));

        Ok(Resource {
            id: row.id,
            title: row.title,
            kind: row.kind.parse::<ResourceType>()?,
            configuration,
            group_size: row.group_size,
            description: row.description,
            categories: Vec::new(),
            alternative_names,
            related_resources: Vec::new(),
            publication_status: row.publication_status.parse::<PublicationStatus>()?,
            edit_proposal_original_resource_id: row.edit_proposal_original_resource_id,
            video: row.video,
            show_introduction: row.show_introduction,
            lesson_plans: Vec::new(),
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ResourceRow> {
    Ok(ResourceRow {
        id: row.get(0)?,
        title: row.get(1)?,
        kind: row.get(2)?,
        configuration: row.get(3)?,
        group_size: row.get(4)?,
        description: row.get(5)?,
        alternative_names: row.get(6)?,
        publication_status: row.get(7)?,
        edit_proposal_original_resource_id: row.get(8)?,
        video: row.get(9)?,
        show_introduction: row.get(10)?,
    })
}

/// Load the whole catalog, titles ordered case-insensitively. This is the
/// snapshot the list view filters, sorts and pages.
pub fn fetch_resources(conn: &Connection) -> Result<Vec<Resource>> {
    let resources = load_resources(conn, None)?;
    debug!(count = resources.len(), "fetched resources");
    Ok(resources)
}

/// Load a single resource with its categories, related resources and lesson
/// plans.
pub fn fetch_resource(conn: &Connection, id: &str) -> Result<Resource> {
    load_resources(conn, Some(id))?
        .pop()
        .ok_or_else(|| CatalogError::NotFound(id.to_string()).into())
}

fn load_resources(conn: &Connection, id: Option<&str>) -> Result<Vec<Resource>> {
    let sql = match id {
        Some(_) => format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1"),
        None => format!("SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY title COLLATE NOCASE, id"),
    };
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare resource query")?;

    let rows = match id {
        Some(id) => stmt.query_map([id], read_row),
        None => stmt.query_map([], read_row),
    }
    .context("failed to load resources")?
    .collect::<Result<Vec<_>, _>>()
    .context("failed to collect resources")?;

    let mut resources = rows
        .into_iter()
        .map(Resource::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    attach_relations(conn, &mut resources)?;
    Ok(resources)
}

fn attach_relations(conn: &Connection, resources: &mut [Resource]) -> Result<()> {
    if resources.is_empty() {
        return Ok(());
    }

    let mut categories = load_pairs(
        conn,
        "SELECT rc.resource_id, c.id, c.name
         FROM resource_categories rc
         INNER JOIN categories c ON c.id = rc.category_id
         ORDER BY rc.resource_id, rc.position",
    )
    .context("failed to load resource categories")?;
    let mut related = load_pairs(
        conn,
        "SELECT resource_id, related_id, title
         FROM related_resources
         ORDER BY resource_id, position",
    )
    .context("failed to load related resources")?;
    let mut lesson_plans = load_pairs(
        conn,
        "SELECT lpr.resource_id, lp.id, lp.title
         FROM lesson_plan_resources lpr
         INNER JOIN lesson_plans lp ON lp.id = lpr.lesson_plan_id
         ORDER BY lpr.resource_id, lp.title COLLATE NOCASE",
    )
    .context("failed to load lesson plans")?;

    for resource in resources.iter_mut() {
        resource.categories = categories
            .remove(&resource.id)
            .unwrap_or_default()
            .into_iter()
            .map(|(id, name)| Category { id, name })
            .collect();
        resource.related_resources = related
            .remove(&resource.id)
            .unwrap_or_default()
            .into_iter()
            .map(|(id, title)| RelatedResource::Linked(ResourceRef { id, title }))
            .collect();
        resource.lesson_plans = lesson_plans
            .remove(&resource.id)
            .unwrap_or_default()
            .into_iter()
            .map(|(id, title)| LessonPlanRef { id, title })
            .collect();
    }
    Ok(())
}

/// Run a three-column query and group `(col1, col2)` pairs by `col0`.
fn load_pairs(conn: &Connection, sql: &str) -> Result<HashMap<String, Vec<(String, String)>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;

    let mut grouped: HashMap<String, Vec<(String, String)>> = HashMap::new();
    while let Some(row) = rows.next()? {
        grouped
            .entry(row.get(0)?)
            .or_default()
            .push((row.get(1)?, row.get(2)?));
    }
    Ok(grouped)
}

/// Insert a new resource with its links. A resource already stored under the
/// same identifier fails with [`CatalogError::DuplicateIdentifier`], kept
/// distinct from validation failures so the caller can ask for a new URL.
pub fn create_resource(conn: &Connection, resource: &Resource) -> Result<()> {
    resource.validate()?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    tx.execute(
        "INSERT INTO resources (id, title, type, configuration, group_size, description,
             alternative_names, publication_status, edit_proposal_original_resource_id,
             video, show_introduction)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            resource.id,
            resource.title,
            resource.kind.code(),
            resource.configuration.map(|configuration| configuration.code()),
            resource.group_size,
            resource.description,
            stored_alternative_names(resource),
            resource.publication_status.code(),
            resource.edit_proposal_original_resource_id,
            resource.video,
            resource.show_introduction,
        ],
    )
    .map_err(|err| map_primary_key_conflict(err, &resource.id))?;

    write_links(&tx, resource)?;

    tx.commit().context("failed to commit resource")?;
    info!(id = %resource.id, proposal = resource.is_edit_proposal(), "created resource");
    Ok(())
}

fn stored_alternative_names(resource: &Resource) -> String {
    resource
        .alternative_names
        .as_ref()
        .map(AlternativeNames::to_delimited)
        .unwrap_or_default()
}

/// Replace categories and related resources of `resource.id`, and add its
/// lesson-plan links.
fn write_links(conn: &Connection, resource: &Resource) -> Result<()> {
    conn.execute(
        "DELETE FROM resource_categories WHERE resource_id = ?1",
        [&resource.id],
    )
    .context("failed to clear categories")?;
    for (position, category) in resource.categories.iter().enumerate() {
        upsert_category(conn, category)?;
        conn.execute(
            "INSERT INTO resource_categories (resource_id, category_id, position)
             VALUES (?1, ?2, ?3)",
            params![resource.id, category.id, position as i64],
        )
        .context("failed to link category")?;
    }

    conn.execute(
        "DELETE FROM related_resources WHERE resource_id = ?1",
        [&resource.id],
    )
    .context("failed to clear related resources")?;
    for (position, related) in resource.related_refs().iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO related_resources (resource_id, related_id, title, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![resource.id, related.id, related.title, position as i64],
        )
        .context("failed to link related resource")?;
    }

    for plan in &resource.lesson_plans {
        conn.execute(
            "INSERT INTO lesson_plans (id, title) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title",
            params![plan.id, plan.title],
        )
        .context("failed to upsert lesson plan")?;
        conn.execute(
            "INSERT OR IGNORE INTO lesson_plan_resources (lesson_plan_id, resource_id)
             VALUES (?1, ?2)",
            params![plan.id, resource.id],
        )
        .context("failed to link lesson plan")?;
    }
    Ok(())
}

/// Moderate several resources at once. Returns how many rows changed.
pub fn set_publication_status(
    conn: &Connection,
    ids: &[String],
    status: PublicationStatus,
) -> Result<usize> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    let mut updated = 0;
    for id in ids {
        updated += tx
            .execute(
                "UPDATE resources SET publication_status = ?1 WHERE id = ?2",
                params![status.code(), id],
            )
            .context("failed to update publication status")?;
    }
    tx.commit().context("failed to commit status change")?;
    info!(updated, status = status.code(), "publication status changed");
    Ok(updated)
}

/// Delete resources; their links and pending proposals cascade.
pub fn delete_resources(conn: &Connection, ids: &[String]) -> Result<usize> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    let mut deleted = 0;
    for id in ids {
        deleted += tx
            .execute("DELETE FROM resources WHERE id = ?1", [id])
            .context("failed to delete resource")?;
    }
    tx.commit().context("failed to commit deletion")?;
    info!(deleted, "deleted resources");
    Ok(deleted)
}

/// Accept an edit proposal: copy its content onto the original resource and
/// drop the proposal. The original keeps its identifier and publication
/// status.
pub fn apply_edit_proposal(conn: &Connection, proposal_id: &str) -> Result<Resource> {
    let proposal = fetch_resource(conn, proposal_id)?;
    let original_id = proposal
        .edit_proposal_original_resource_id
        .clone()
        .ok_or_else(|| anyhow!("`{proposal_id}` is not an edit proposal"))?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let updated = tx
        .execute(
            "UPDATE resources SET title = ?1, type = ?2, configuration = ?3, group_size = ?4,
                 description = ?5, alternative_names = ?6, video = ?7, show_introduction = ?8
             WHERE id = ?9",
            params![
                proposal.title,
                proposal.kind.code(),
                proposal.configuration.map(|configuration| configuration.code()),
                proposal.group_size,
                proposal.description,
                stored_alternative_names(&proposal),
                proposal.video,
                proposal.show_introduction,
                original_id,
            ],
        )
        .context("failed to apply proposal")?;
    if updated == 0 {
        return Err(CatalogError::NotFound(original_id).into());
    }

    let mut merged = proposal;
    merged.id = original_id.clone();
    merged.lesson_plans = Vec::new();
    write_links(&tx, &merged)?;

    tx.execute("DELETE FROM resources WHERE id = ?1", [proposal_id])
        .context("failed to remove applied proposal")?;
    tx.commit().context("failed to commit proposal")?;

    info!(proposal = proposal_id, original = %original_id, "applied edit proposal");
    fetch_resource(conn, &original_id)
}

/// Turn a primary-key clash on `resources` into `DuplicateIdentifier`. Other
/// constraint failures (for example a proposal pointing at a missing
/// resource) stay generic.
fn map_primary_key_conflict(err: SqlError, id: &str) -> anyhow::Error {
    let duplicate = matches!(
        &err,
        SqlError::SqliteFailure(inner, _)
            if inner.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    );
    if duplicate {
        CatalogError::DuplicateIdentifier(id.to_string()).into()
    } else {
        anyhow::Error::new(err).context("failed to insert resource")
    }
}
