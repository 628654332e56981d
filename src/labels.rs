//! Display strings for the catalog enums. Every lookup is an exhaustive match,
//! so adding a variant without a label is a compile error; codes coming from
//! storage or seed files are checked by the `FromStr` impls in `models` and by
//! the `*_for_code` helpers here, which fail with `UnmappedEnumValue`.

use crate::error::CatalogError;
use crate::models::{PublicationStatus, Resource, ResourceConfiguration, ResourceType};

impl ResourceType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Exercise => "Warm-up / Exercise",
            Self::ShortForm => "Short Form Game",
            Self::LongForm => "Long Form Format",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Exercise => "🚀",
            Self::ShortForm => "⚡️",
            Self::LongForm => "🍿",
        }
    }

    /// Label prefixed with its glyph, e.g. `🚀 Warm-up / Exercise`.
    pub fn decorated_label(self) -> String {
        format!("{} {}", self.glyph(), self.label())
    }
}

impl ResourceConfiguration {
    pub fn label(self) -> &'static str {
        match self {
            Self::Scene => "Scenework",
            Self::Backline => "Backline",
            Self::WholeClass => "Whole Group",
            Self::Solo => "Solo",
            Self::Pairs => "Pairs",
            Self::Groups => "Groups",
            Self::Circle => "Circle",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Scene => "🎭",
            Self::Backline => "👥",
            Self::WholeClass => "♾️",
            Self::Solo => "🧍",
            Self::Pairs => "👯",
            Self::Groups => "👨‍👨‍👦",
            Self::Circle => "⭕️",
        }
    }

    pub fn decorated_label(self) -> String {
        format!("{} {}", self.glyph(), self.label())
    }
}

impl PublicationStatus {
    /// Badge text. Review-ready resources read as "Pending" to moderators.
    pub fn label(self) -> &'static str {
        match self {
            Self::Published => "Published",
            Self::ReadyForReview => "Pending",
            Self::Draft => "Draft",
        }
    }
}

/// Label for a raw type code such as `SHORT_FORM`.
pub fn type_label_for_code(code: &str) -> Result<&'static str, CatalogError> {
    code.parse::<ResourceType>().map(ResourceType::label)
}

/// Label for a raw configuration code such as `WHOLE_CLASS`.
pub fn configuration_label_for_code(code: &str) -> Result<&'static str, CatalogError> {
    code.parse::<ResourceConfiguration>()
        .map(ResourceConfiguration::label)
}

/// Label for a raw publication status code such as `READY_FOR_REVIEW`.
pub fn status_label_for_code(code: &str) -> Result<&'static str, CatalogError> {
    code.parse::<PublicationStatus>()
        .map(PublicationStatus::label)
}

/// One-line summary shown under the title in the detail view.
///
/// The phrasing differs per configuration: solo and pairs exercises only name
/// the configuration, scenes give a player count, groups give a minimum group
/// size, and whole-group style exercises give a minimum total.
pub fn subtitle(resource: &Resource) -> String {
    let kind = resource.kind.label();
    let players = resource.group_size;

    if resource.kind != ResourceType::Exercise {
        return format!("{kind} - {players} players");
    }

    let Some(configuration) = resource.configuration else {
        return kind.to_string();
    };
    let label = configuration.label();

    match configuration {
        ResourceConfiguration::Solo | ResourceConfiguration::Pairs => {
            format!("{kind} - {label}")
        }
        ResourceConfiguration::Scene => format!("{kind} - {players} players"),
        ResourceConfiguration::Groups => {
            format!("{kind} - {label} of (minimum) {players} players")
        }
        ResourceConfiguration::WholeClass
        | ResourceConfiguration::Circle
        | ResourceConfiguration::Backline => {
            format!("{kind} - {label} (minimum {players} players)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::exercise;

    #[test]
    fn publication_status_labels_are_total() {
        let labels: Vec<_> = PublicationStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Draft", "Pending", "Published"]);
    }

    #[test]
    fn code_lookups_fail_loudly_for_unknown_codes() {
        assert_eq!(type_label_for_code("LONG_FORM").unwrap(), "Long Form Format");
        assert_eq!(configuration_label_for_code("WHOLE_CLASS").unwrap(), "Whole Group");
        assert_eq!(status_label_for_code("READY_FOR_REVIEW").unwrap(), "Pending");
        assert_eq!(
            status_label_for_code("ARCHIVED"),
            Err(CatalogError::UnmappedEnumValue {
                kind: "publication status",
                value: "ARCHIVED".into()
            })
        );
    }

    #[test]
    fn decorated_labels_carry_glyphs() {
        assert_eq!(
            ResourceType::Exercise.decorated_label(),
            "🚀 Warm-up / Exercise"
        );
        assert_eq!(ResourceConfiguration::Scene.decorated_label(), "🎭 Scenework");
    }

    #[test]
    fn subtitle_keeps_configuration_phrasing_distinct() {
        let mut resource = exercise("zip-zap", "Zip Zap", &[]);
        resource.group_size = 6;

        resource.configuration = Some(ResourceConfiguration::Pairs);
        assert_eq!(subtitle(&resource), "Warm-up / Exercise - Pairs");

        resource.configuration = Some(ResourceConfiguration::Scene);
        assert_eq!(subtitle(&resource), "Warm-up / Exercise - 6 players");

        resource.configuration = Some(ResourceConfiguration::Groups);
        assert_eq!(
            subtitle(&resource),
            "Warm-up / Exercise - Groups of (minimum) 6 players"
        );

        resource.configuration = Some(ResourceConfiguration::Circle);
        assert_eq!(
            subtitle(&resource),
            "Warm-up / Exercise - Circle (minimum 6 players)"
        );

        resource.kind = ResourceType::ShortForm;
        resource.configuration = None;
        assert_eq!(subtitle(&resource), "Short Form Game - 6 players");
    }
}
