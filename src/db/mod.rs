//! Persistence module split across logical submodules.

mod categories;
mod connection;
mod resources;

pub use categories::{fetch_categories, upsert_category};
pub use connection::{init_schema, open_database};
pub use resources::{
    apply_edit_proposal, create_resource, delete_resources, fetch_resource, fetch_resources,
    set_publication_status,
};
