//! Core library surface for ImprovDB, a catalog of improv exercises, short
//! form games and long form formats.
//!
//! The domain modules (labels, columns, filtering, selection, table shaping,
//! the create form) are UI-agnostic; the `ui` module renders them in the
//! terminal and `db` keeps the catalog in SQLite. The `bin` target wires the
//! configuration, logging and persistence together before launching the UI.
pub mod columns;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod form;
pub mod import;
pub mod labels;
pub mod logging;
pub mod models;
pub mod query;
pub mod selection;
pub mod slug;
pub mod table;
pub mod ui;

/// Persistence entry points used by `main.rs` and the integration tests.
pub use db::{
    apply_edit_proposal, create_resource, delete_resources, fetch_categories, fetch_resource,
    fetch_resources, init_schema, open_database, set_publication_status,
};

pub use config::AppConfig;
pub use error::{CatalogError, FieldErrors};
pub use import::{import_resources, load_seed_file, ImportReport};

/// The domain types that other layers manipulate.
pub use models::{
    AlternativeNames, Category, PublicationStatus, Resource, ResourceConfiguration, ResourceType,
};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
