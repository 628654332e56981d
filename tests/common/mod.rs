#![allow(dead_code)]

use improvdb::{
    init_schema, Category, PublicationStatus, Resource, ResourceConfiguration, ResourceType,
};
use rusqlite::Connection;

pub fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn resource(id: &str, title: &str, categories: &[&str]) -> Resource {
    Resource {
        id: id.to_string(),
        title: title.to_string(),
        kind: ResourceType::Exercise,
        configuration: Some(ResourceConfiguration::Circle),
        group_size: 6,
        description: format!("How to play {title}."),
        categories: categories
            .iter()
            .map(|id| category(id, &id.replace('-', " ")))
            .collect(),
        alternative_names: None,
        related_resources: Vec::new(),
        publication_status: PublicationStatus::Draft,
        edit_proposal_original_resource_id: None,
        video: None,
        show_introduction: None,
        lesson_plans: Vec::new(),
    }
}
