//! JSON seed files. A seed is an array of resource objects with camelCase
//! keys; alternative names and related resources may use either legacy
//! shape. Each record is validated and inserted on its own so a single bad or
//! duplicate entry does not abort the batch.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::create_resource;
use crate::error::CatalogError;
use crate::models::Resource;

/// Outcome of an import run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub duplicates: Vec<String>,
    /// `(id, reason)` for records that failed validation.
    pub rejected: Vec<(String, String)>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Imported {} resource(s); {} duplicate(s) skipped; {} rejected.",
            self.inserted,
            self.duplicates.len(),
            self.rejected.len()
        )
    }
}

/// Read and parse a seed file.
pub fn load_seed_file(path: &Path) -> Result<Vec<Resource>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    parse_seed(&raw).with_context(|| format!("failed to parse seed file {}", path.display()))
}

pub fn parse_seed(raw: &str) -> Result<Vec<Resource>> {
    let resources: Vec<Resource> = serde_json::from_str(raw)?;
    Ok(resources)
}

/// Insert every resource, counting duplicates and invalid records instead of
/// stopping. Plain database failures still abort.
///
/// Originals are inserted before edit proposals so proposals can reference
/// resources from the same file.
pub fn import_resources(conn: &Connection, resources: &[Resource]) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let (originals, proposals): (Vec<&Resource>, Vec<&Resource>) = resources
        .iter()
        .partition(|resource| !resource.is_edit_proposal());

    for resource in originals.into_iter().chain(proposals) {
        match create_resource(conn, resource) {
            Ok(()) => report.inserted += 1,
            Err(err) => match err.downcast_ref::<CatalogError>() {
                Some(CatalogError::DuplicateIdentifier(id)) => {
                    warn!(id = %id, "skipping duplicate resource");
                    report.duplicates.push(id.clone());
                }
                Some(CatalogError::ValidationFailed(errors)) => {
                    warn!(id = %resource.id, %errors, "rejecting invalid resource");
                    report
                        .rejected
                        .push((resource.id.clone(), errors.to_string()));
                }
                _ => return Err(err),
            },
        }
    }

    info!(
        inserted = report.inserted,
        duplicates = report.duplicates.len(),
        rejected = report.rejected.len(),
        "import finished"
    );
    Ok(report)
}
