//! State of the create-resource form.
//!
//! The URL identifier follows the title (through [`slugify`]) until the user
//! types into the identifier field; from then on the manual value sticks. The
//! flag is stored explicitly rather than inferred from the field contents.

use crate::error::{CatalogError, FieldErrors};
use crate::models::{
    AlternativeNames, Category, PublicationStatus, RelatedResource, Resource,
    ResourceConfiguration, ResourceRef, ResourceType,
};
use crate::slug::{is_slug, slugify};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_ID: &str = "id";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_CONFIGURATION: &str = "configuration";
pub const FIELD_GROUP_SIZE: &str = "groupSize";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_VIDEO: &str = "video";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceForm {
    title: String,
    identifier: String,
    identifier_manually_edited: bool,
    kind: ResourceType,
    configuration: Option<ResourceConfiguration>,
    pub group_size: String,
    pub description: String,
    categories: Vec<Category>,
    alternative_names: Vec<String>,
    related: Vec<ResourceRef>,
    pub video: String,
    pub show_introduction: String,
    proposal_of: Option<String>,
}

impl Default for ResourceForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            identifier: String::new(),
            identifier_manually_edited: false,
            kind: ResourceType::Exercise,
            configuration: Some(ResourceConfiguration::Scene),
            group_size: "2".to_string(),
            description: String::new(),
            categories: Vec::new(),
            alternative_names: Vec::new(),
            related: Vec::new(),
            video: String::new(),
            show_introduction: String::new(),
            proposal_of: None,
        }
    }
}

impl ResourceForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the form with an existing resource so the submission becomes
    /// an edit proposal for it. The proposal gets its own identifier.
    pub fn propose_edit(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            identifier: format!("{}-proposal", resource.id),
            identifier_manually_edited: true,
            kind: resource.kind,
            configuration: resource.configuration,
            group_size: resource.group_size.to_string(),
            description: resource.description.clone(),
            categories: resource.categories.clone(),
            alternative_names: resource.alternative_names(),
            related: resource.related_refs(),
            video: resource.video.clone().unwrap_or_default(),
            show_introduction: resource.show_introduction.clone().unwrap_or_default(),
            proposal_of: Some(resource.id.clone()),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Update the title and, unless the identifier was edited by hand,
    /// re-derive the identifier from it.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if !self.identifier_manually_edited {
            self.identifier = slugify(&self.title);
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Direct edit of the identifier field. Pins the identifier.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
        self.identifier_manually_edited = true;
    }

    pub fn identifier_manually_edited(&self) -> bool {
        self.identifier_manually_edited
    }

    pub fn proposal_of(&self) -> Option<&str> {
        self.proposal_of.as_deref()
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    /// Change the type. Leaving `Exercise` clears the configuration; entering
    /// it restores a default one.
    pub fn set_kind(&mut self, kind: ResourceType) {
        self.kind = kind;
        if kind == ResourceType::Exercise {
            self.configuration.get_or_insert(ResourceConfiguration::Scene);
        } else {
            self.configuration = None;
        }
    }

    pub fn configuration(&self) -> Option<ResourceConfiguration> {
        self.configuration
    }

    /// Ignored unless the type is `Exercise`.
    pub fn set_configuration(&mut self, configuration: ResourceConfiguration) {
        if self.kind == ResourceType::Exercise {
            self.configuration = Some(configuration);
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Add or remove a category. Returns whether it is selected afterwards.
    pub fn toggle_category(&mut self, category: &Category) -> bool {
        if let Some(index) = self.categories.iter().position(|c| c.id == category.id) {
            self.categories.remove(index);
            false
        } else {
            self.categories.push(category.clone());
            true
        }
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.categories.iter().any(|category| category.id == id)
    }

    pub fn alternative_names(&self) -> &[String] {
        &self.alternative_names
    }

    /// Create a free-form tag. Blank input, `;` (the storage delimiter) and
    /// duplicates are refused.
    pub fn add_alternative_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty()
            || name.contains(';')
            || self.alternative_names.iter().any(|existing| existing == name)
        {
            return false;
        }
        self.alternative_names.push(name.to_string());
        true
    }

    pub fn pop_alternative_name(&mut self) -> Option<String> {
        self.alternative_names.pop()
    }

    pub fn related(&self) -> &[ResourceRef] {
        &self.related
    }

    pub fn toggle_related(&mut self, reference: ResourceRef) -> bool {
        if let Some(index) = self.related.iter().position(|r| r.id == reference.id) {
            self.related.remove(index);
            false
        } else {
            self.related.push(reference);
            true
        }
    }

    /// Check every field and build the resource to submit.
    pub fn validate(&self, status: PublicationStatus) -> Result<Resource, CatalogError> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FIELD_TITLE, "Title is required.");
        }

        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            errors.push(FIELD_ID, "URL identifier is required.");
        } else if !is_slug(identifier) {
            errors.push(
                FIELD_ID,
                "URL identifier may only contain lowercase letters, digits and single hyphens.",
            );
        }

        let group_size = match self.group_size.trim().parse::<u32>() {
            Ok(size) if size >= 1 => size,
            Ok(_) => {
                errors.push(FIELD_GROUP_SIZE, "Group size must be at least 1.");
                0
            }
            Err(_) => {
                errors.push(FIELD_GROUP_SIZE, "Group size must be a whole number.");
                0
            }
        };

        if self.kind == ResourceType::Exercise && self.configuration.is_none() {
            errors.push(FIELD_CONFIGURATION, "Exercises need a configuration.");
        }

        if self.description.trim().is_empty() {
            errors.push(FIELD_DESCRIPTION, "Description is required.");
        }

        let video = self.video.trim();
        if video.chars().any(char::is_whitespace) {
            errors.push(FIELD_VIDEO, "Video must be a YouTube video id.");
        }

        if self.proposal_of.as_deref() == Some(identifier) {
            errors.push(FIELD_ID, "A proposal needs its own URL identifier.");
        }

        errors.into_result()?;

        let resource = Resource {
            id: identifier.to_string(),
            title: title.to_string(),
            kind: self.kind,
            configuration: self.configuration,
            group_size,
            description: self.description.trim().to_string(),
            categories: self.categories.clone(),
            alternative_names: (!self.alternative_names.is_empty())
                .then(|| AlternativeNames::from_names(&self.alternative_names)),
            related_resources: self
                .related
                .iter()
                .cloned()
                .map(RelatedResource::Linked)
                .collect(),
            publication_status: status,
            edit_proposal_original_resource_id: self.proposal_of.clone(),
            video: non_empty(video),
            show_introduction: non_empty(self.show_introduction.trim()),
            lesson_plans: Vec::new(),
        };
        resource.validate()?;
        Ok(resource)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
