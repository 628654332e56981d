//! Domain models that mirror the SQLite schema and the JSON seed format. These
//! types stay light-weight data holders; labels, filtering and rendering live
//! in their own modules so every layer reads the same normalised values.
//!
//! Two fields accept legacy shapes: alternative names may arrive as a single
//! `;`-delimited string or as a list of `{value}` records, and related
//! resources as `{id, title}` or `{value, label}`. Both are modelled as tagged
//! variants with one normalisation method so consumers never re-check shapes.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, FieldErrors};

/// What kind of catalog entry a resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Exercise,
    ShortForm,
    LongForm,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [Self::Exercise, Self::ShortForm, Self::LongForm];

    /// Storage code, identical to the serialized form.
    pub fn code(self) -> &'static str {
        match self {
            Self::Exercise => "EXERCISE",
            Self::ShortForm => "SHORT_FORM",
            Self::LongForm => "LONG_FORM",
        }
    }
}

impl FromStr for ResourceType {
    type Err = CatalogError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| CatalogError::unmapped("resource type", code))
    }
}

/// How players are arranged for an exercise. Only meaningful when the resource
/// type is [`ResourceType::Exercise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceConfiguration {
    Scene,
    Backline,
    WholeClass,
    Solo,
    Pairs,
    Groups,
    Circle,
}

impl ResourceConfiguration {
    pub const ALL: [ResourceConfiguration; 7] = [
        Self::Scene,
        Self::Backline,
        Self::WholeClass,
        Self::Solo,
        Self::Pairs,
        Self::Groups,
        Self::Circle,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Scene => "SCENE",
            Self::Backline => "BACKLINE",
            Self::WholeClass => "WHOLE_CLASS",
            Self::Solo => "SOLO",
            Self::Pairs => "PAIRS",
            Self::Groups => "GROUPS",
            Self::Circle => "CIRCLE",
        }
    }
}

impl FromStr for ResourceConfiguration {
    type Err = CatalogError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|configuration| configuration.code() == code)
            .ok_or_else(|| CatalogError::unmapped("resource configuration", code))
    }
}

/// Moderation state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationStatus {
    Draft,
    ReadyForReview,
    Published,
}

impl PublicationStatus {
    pub const ALL: [PublicationStatus; 3] = [Self::Draft, Self::ReadyForReview, Self::Published];

    pub fn code(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::ReadyForReview => "READY_FOR_REVIEW",
            Self::Published => "PUBLISHED",
        }
    }
}

impl FromStr for PublicationStatus {
    type Err = CatalogError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| CatalogError::unmapped("publication status", code))
    }
}

/// A category tag. Resources reference categories by id; the name is what the
/// table shows as a badge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Single `{value}` record from the structured alternative-names shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub value: String,
}

/// Alternative names in either of the two legacy representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlternativeNames {
    /// `"Zip Zap Zop;Zip Zop Zap"`
    LegacyDelimited(String),
    /// `[{"value": "Zip Zap Zop"}]`
    StructuredList(Vec<NameValue>),
}

impl AlternativeNames {
    /// Canonical ordered list of names. Empty segments (including the whole
    /// string being empty) are dropped and surrounding whitespace is trimmed.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::LegacyDelimited(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            Self::StructuredList(values) => values
                .iter()
                .map(|entry| entry.value.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build the storage form from already-normalised names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(";");
        Self::LegacyDelimited(joined)
    }

    /// The `;`-delimited string persisted in SQLite.
    pub fn to_delimited(&self) -> String {
        self.names().join(";")
    }
}

/// `{id, title}` reference, as returned by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceRef {
    pub id: String,
    pub title: String,
}

/// `{value, label}` pair, as produced by the multi-select widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A related resource in one of its two shapes. Mixed fields fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedResource {
    Linked(ResourceRef),
    SelectOption(SelectOption),
}

impl RelatedResource {
    /// Normalise either shape into an `{id, title}` reference.
    pub fn to_ref(&self) -> ResourceRef {
        match self {
            Self::Linked(linked) => linked.clone(),
            Self::SelectOption(option) => ResourceRef {
                id: option.value.clone(),
                title: option.label.clone(),
            },
        }
    }
}

/// Lesson plan that includes a resource. Read-only from the catalog's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlanRef {
    pub id: String,
    pub title: String,
}

/// One catalog entry. The `id` doubles as the URL identifier
/// (`/resource/<id>`), so it is slug-shaped and unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(default)]
    pub configuration: Option<ResourceConfiguration>,
    pub group_size: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub alternative_names: Option<AlternativeNames>,
    #[serde(default)]
    pub related_resources: Vec<RelatedResource>,
    #[serde(default = "default_status")]
    pub publication_status: PublicationStatus,
    #[serde(default)]
    pub edit_proposal_original_resource_id: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub show_introduction: Option<String>,
    #[serde(default)]
    pub lesson_plans: Vec<LessonPlanRef>,
}

fn default_status() -> PublicationStatus {
    PublicationStatus::Draft
}

impl Resource {
    /// Alternative names normalised from whichever shape was stored.
    pub fn alternative_names(&self) -> Vec<String> {
        self.alternative_names
            .as_ref()
            .map(AlternativeNames::names)
            .unwrap_or_default()
    }

    /// Related resources normalised to `{id, title}`.
    pub fn related_refs(&self) -> Vec<ResourceRef> {
        self.related_resources
            .iter()
            .map(RelatedResource::to_ref)
            .collect()
    }

    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.id.as_str())
    }

    /// True when this record is a proposed edit of another resource.
    pub fn is_edit_proposal(&self) -> bool {
        self.edit_proposal_original_resource_id.is_some()
    }

    /// Path of the detail page, used as the link target of the title cell.
    pub fn detail_path(&self) -> String {
        format!("/resource/{}", self.id)
    }

    /// Browser URL for the example video, if one is attached.
    pub fn video_url(&self) -> Option<String> {
        self.video
            .as_deref()
            .map(str::trim)
            .filter(|video| !video.is_empty())
            .map(|video| format!("https://youtube.com/watch?v={video}"))
    }

    /// Check the record-level invariants. Messages are keyed by the same field
    /// names the form uses.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = FieldErrors::new();

        if self.id.trim().is_empty() {
            errors.push("id", "URL identifier is required.");
        }
        if self.title.trim().is_empty() {
            errors.push("title", "Title is required.");
        }
        if self.group_size < 1 {
            errors.push("groupSize", "Group size must be at least 1.");
        }
        match (self.kind, self.configuration) {
            (ResourceType::Exercise, None) => {
                errors.push("configuration", "Exercises need a configuration.")
            }
            (ResourceType::ShortForm | ResourceType::LongForm, Some(_)) => errors.push(
                "configuration",
                "Only exercises can have a configuration.",
            ),
            _ => {}
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                errors.push(
                    "categories",
                    format!("Category `{}` is listed twice.", category.id),
                );
            }
        }

        errors.into_result()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal valid exercise used across unit tests.
    pub(crate) fn exercise(id: &str, title: &str, category_ids: &[&str]) -> Resource {
        Resource {
            id: id.to_string(),
            title: title.to_string(),
            kind: ResourceType::Exercise,
            configuration: Some(ResourceConfiguration::Circle),
            group_size: 4,
            description: String::new(),
            categories: category_ids
                .iter()
                .map(|id| Category {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                })
                .collect(),
            alternative_names: None,
            related_resources: Vec::new(),
            publication_status: PublicationStatus::Published,
            edit_proposal_original_resource_id: None,
            video: None,
            show_introduction: None,
            lesson_plans: Vec::new(),
        }
    }
}
