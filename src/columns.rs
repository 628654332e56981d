//! Column specification for the resource table.
//!
//! The table renderer never decides what a column shows or how it filters; it
//! walks the [`ColumnSet`] produced by [`build_columns`] and asks each
//! descriptor to render a [`Cell`] or test a row against a filter value. The
//! descriptors are plain data (no callbacks), so the same flags always give the
//! same ordered columns.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::filter::{contains_ignore_case, find_ignore_case, FilterValue};
use crate::models::{PublicationStatus, Resource, ResourceConfiguration, ResourceType};

/// Stable column identifiers. `as_str` matches the field names of the query
/// layer so filter state can be keyed by either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Select,
    Title,
    Type,
    Configuration,
    Categories,
    AlternativeNames,
    PublicationStatus,
    EditProposal,
}

impl ColumnId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Title => "title",
            Self::Type => "type",
            Self::Configuration => "configuration",
            Self::Categories => "categories",
            Self::AlternativeNames => "alternativeNames",
            Self::PublicationStatus => "publicationStatus",
            Self::EditProposal => "editProposalOriginalResourceId",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns offered in the filter toolbar when filtering is enabled.
pub const TOOLBAR_FILTERS: [ColumnId; 4] = [
    ColumnId::Title,
    ColumnId::Type,
    ColumnId::Configuration,
    ColumnId::Categories,
];

/// Table-level switches that decide which columns exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnFlags {
    pub show_published_status: bool,
    pub show_edit_proposals: bool,
    pub show_selection: bool,
    pub enable_filtering: bool,
}

/// How a column turns a resource into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRule {
    SelectCheckbox,
    /// Title with the active title filter highlighted.
    HighlightedTitle,
    /// Highlighted title wrapped in a link to the detail page.
    LinkedTitle,
    TypeLabel,
    ConfigurationLabel,
    CategoryBadges,
    AlternativeNameTags,
    PublicationStatusBadge,
    EditProposalBadge,
}

/// Row predicate attached to a filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    /// Case-insensitive substring match on the title.
    TextContains,
    TypeAnyOf,
    ConfigurationAnyOf,
    /// Passes when any of the row's category ids is in the filter set.
    CategoryAnyOf,
}

impl FilterRule {
    /// Test one row. Inactive values (empty text, empty set) always pass;
    /// missing row data never matches an active value.
    pub fn matches(self, resource: &Resource, value: &FilterValue) -> bool {
        if !value.is_active() {
            return true;
        }
        match self {
            Self::TextContains => value
                .values()
                .any(|needle| contains_ignore_case(&resource.title, needle)),
            Self::TypeAnyOf => value.contains(resource.kind.code()),
            Self::ConfigurationAnyOf => resource
                .configuration
                .is_some_and(|configuration| value.contains(configuration.code())),
            Self::CategoryAnyOf => resource.category_ids().any(|id| value.contains(id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Default,
    Outline,
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: BadgeTone,
}

impl Badge {
    fn new(label: impl Into<String>, tone: BadgeTone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }
}

/// Piece of a title, flagged when it matched the active title filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub highlighted: bool,
}

/// Library-neutral cell content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Checkbox(bool),
    Text(String),
    Title {
        segments: Vec<TextSegment>,
        link: Option<String>,
    },
    Badges(Vec<Badge>),
    Tags(Vec<String>),
    /// Nothing to show. Renderers decide whether that reads as blank or "N/A".
    Empty,
}

/// Per-row inputs a cell may depend on besides the resource itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellContext<'a> {
    pub title_filter: Option<&'a str>,
    pub selected: bool,
}

/// Sort key of a sortable column. Missing values sort first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Rank(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    pub header: &'static str,
    pub cell: CellRule,
    pub filter: Option<FilterRule>,
    pub sortable: bool,
    pub hideable: bool,
    pub hidden_by_default: bool,
    /// Dropped from narrow layouts.
    pub hidden_on_compact: bool,
}

impl ColumnDescriptor {
    fn new(id: ColumnId, header: &'static str, cell: CellRule) -> Self {
        Self {
            id,
            header,
            cell,
            filter: None,
            sortable: true,
            hideable: true,
            hidden_by_default: false,
            hidden_on_compact: false,
        }
    }

    fn with_filter(mut self, rule: FilterRule) -> Self {
        self.filter = Some(rule);
        self
    }

    fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    fn fixed(mut self) -> Self {
        self.sortable = false;
        self.hideable = false;
        self
    }

    fn hidden_by_default(mut self) -> Self {
        self.hidden_by_default = true;
        self
    }

    fn hidden_on_compact(mut self) -> Self {
        self.hidden_on_compact = true;
        self
    }

    /// Produce the cell for one row.
    pub fn render(&self, resource: &Resource, ctx: &CellContext<'_>) -> Cell {
        match self.cell {
            CellRule::SelectCheckbox => Cell::Checkbox(ctx.selected),
            CellRule::HighlightedTitle => Cell::Title {
                segments: highlight_segments(&resource.title, ctx.title_filter),
                link: None,
            },
            CellRule::LinkedTitle => Cell::Title {
                segments: highlight_segments(&resource.title, ctx.title_filter),
                link: Some(resource.detail_path()),
            },
            CellRule::TypeLabel => Cell::Text(resource.kind.label().to_string()),
            CellRule::ConfigurationLabel => resource
                .configuration
                .map(|configuration| Cell::Text(configuration.label().to_string()))
                .unwrap_or(Cell::Empty),
            CellRule::CategoryBadges => {
                let mut categories: Vec<_> = resource.categories.iter().collect();
                categories.sort_by(|a, b| compare_names(&a.name, &b.name));
                Cell::Badges(
                    categories
                        .into_iter()
                        .map(|category| Badge::new(category.name.clone(), BadgeTone::Default))
                        .collect(),
                )
            }
            CellRule::AlternativeNameTags => {
                let names = resource.alternative_names();
                if names.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Tags(names)
                }
            }
            CellRule::PublicationStatusBadge => {
                let status = resource.publication_status;
                let tone = match status {
                    PublicationStatus::Published => BadgeTone::Success,
                    PublicationStatus::ReadyForReview => BadgeTone::Warning,
                    PublicationStatus::Draft => BadgeTone::Info,
                };
                Cell::Badges(vec![Badge::new(status.label(), tone)])
            }
            CellRule::EditProposalBadge => {
                if resource.is_edit_proposal() {
                    Cell::Badges(vec![Badge::new("Proposal", BadgeTone::Outline)])
                } else {
                    Cell::Empty
                }
            }
        }
    }

    /// Test a row against this column's filter. Columns without a rule
    /// impose no constraint.
    pub fn matches(&self, resource: &Resource, value: &FilterValue) -> bool {
        self.filter
            .map_or(true, |rule| rule.matches(resource, value))
    }

    /// Key used to order rows by this column, or `None` for unsortable columns
    /// and rows without a value.
    pub fn sort_key(&self, resource: &Resource) -> Option<SortKey> {
        if !self.sortable {
            return None;
        }
        match self.id {
            ColumnId::Title => Some(SortKey::Text(resource.title.to_lowercase())),
            ColumnId::Type => ResourceType::ALL
                .iter()
                .position(|kind| *kind == resource.kind)
                .map(SortKey::Rank),
            ColumnId::Configuration => resource.configuration.and_then(|configuration| {
                ResourceConfiguration::ALL
                    .iter()
                    .position(|candidate| *candidate == configuration)
                    .map(SortKey::Rank)
            }),
            ColumnId::PublicationStatus => PublicationStatus::ALL
                .iter()
                .position(|status| *status == resource.publication_status)
                .map(SortKey::Rank),
            _ => None,
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Split `title` into plain and highlighted runs for every non-overlapping
/// case-insensitive occurrence of `filter`.
pub fn highlight_segments(title: &str, filter: Option<&str>) -> Vec<TextSegment> {
    let Some(needle) = filter.filter(|needle| !needle.is_empty()) else {
        return vec![TextSegment {
            text: title.to_string(),
            highlighted: false,
        }];
    };

    let mut segments = Vec::new();
    let mut rest = title;
    while let Some(range) = find_ignore_case(rest, needle) {
        if range.start > 0 {
            segments.push(TextSegment {
                text: rest[..range.start].to_string(),
                highlighted: false,
            });
        }
        segments.push(TextSegment {
            text: rest[range.clone()].to_string(),
            highlighted: true,
        });
        rest = &rest[range.end..];
    }
    if !rest.is_empty() || segments.is_empty() {
        segments.push(TextSegment {
            text: rest.to_string(),
            highlighted: false,
        });
    }
    segments
}

/// Ordered columns of one table instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
    filtering_enabled: bool,
}

impl ColumnSet {
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|column| column.id).collect()
    }

    pub fn get(&self, id: ColumnId) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn filtering_enabled(&self) -> bool {
        self.filtering_enabled
    }

    pub fn has_selection(&self) -> bool {
        self.get(ColumnId::Select).is_some()
    }

    /// Columns the filter toolbar may offer; empty when filtering is off.
    pub fn toolbar_filters(&self) -> &'static [ColumnId] {
        if self.filtering_enabled {
            &TOOLBAR_FILTERS
        } else {
            &[]
        }
    }

    /// Sortable columns in display order, used to cycle the sort column.
    pub fn sortable_ids(&self) -> Vec<ColumnId> {
        self.columns
            .iter()
            .filter(|column| column.sortable)
            .map(|column| column.id)
            .collect()
    }
}

/// Build the ordered column list for a table.
pub fn build_columns(flags: ColumnFlags) -> ColumnSet {
    let mut columns = vec![
        ColumnDescriptor::new(ColumnId::Type, "Type", CellRule::TypeLabel)
            .with_filter(FilterRule::TypeAnyOf),
        ColumnDescriptor::new(
            ColumnId::Configuration,
            "Configuration",
            CellRule::ConfigurationLabel,
        )
        .with_filter(FilterRule::ConfigurationAnyOf)
        .hidden_on_compact(),
        ColumnDescriptor::new(ColumnId::Categories, "Categories", CellRule::CategoryBadges)
            .with_filter(FilterRule::CategoryAnyOf)
            .unsortable()
            .hidden_on_compact(),
        ColumnDescriptor::new(
            ColumnId::AlternativeNames,
            "Alternative Names",
            CellRule::AlternativeNameTags,
        )
        .unsortable()
        .hidden_by_default(),
    ];

    if flags.show_published_status {
        columns.push(ColumnDescriptor::new(
            ColumnId::PublicationStatus,
            "Publication Status",
            CellRule::PublicationStatusBadge,
        ));
    }

    if flags.show_edit_proposals {
        columns.push(
            ColumnDescriptor::new(ColumnId::EditProposal, "", CellRule::EditProposalBadge)
                .unsortable(),
        );
    }

    if flags.show_selection {
        columns.insert(
            0,
            ColumnDescriptor::new(ColumnId::Title, "Title", CellRule::HighlightedTitle)
                .with_filter(FilterRule::TextContains),
        );
        columns.insert(
            0,
            ColumnDescriptor::new(ColumnId::Select, "", CellRule::SelectCheckbox).fixed(),
        );
    } else {
        columns.insert(
            0,
            ColumnDescriptor::new(ColumnId::Title, "Title", CellRule::LinkedTitle)
                .with_filter(FilterRule::TextContains),
        );
    }

    if !flags.enable_filtering {
        for column in &mut columns {
            column.sortable = false;
            column.hideable = false;
        }
    }

    ColumnSet {
        columns,
        filtering_enabled: flags.enable_filtering,
    }
}

/// Which columns are currently shown. Starts from each column's default and
/// only lets the user toggle hideable columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    hidden: HashSet<ColumnId>,
}

impl ColumnVisibility {
    pub fn from_defaults(columns: &ColumnSet) -> Self {
        Self {
            hidden: columns
                .iter()
                .filter(|column| column.hidden_by_default)
                .map(|column| column.id)
                .collect(),
        }
    }

    /// Flip a column's visibility. Returns `false` when the column cannot be
    /// hidden or does not exist.
    pub fn toggle(&mut self, columns: &ColumnSet, id: ColumnId) -> bool {
        match columns.get(id) {
            Some(column) if column.hideable => {
                if !self.hidden.remove(&id) {
                    self.hidden.insert(id);
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_visible(&self, column: &ColumnDescriptor, compact: bool) -> bool {
        !self.hidden.contains(&column.id) && !(compact && column.hidden_on_compact)
    }

    pub fn visible_columns<'a>(
        &self,
        columns: &'a ColumnSet,
        compact: bool,
    ) -> Vec<&'a ColumnDescriptor> {
        columns
            .iter()
            .filter(|column| self.is_visible(column, compact))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::exercise;
    use crate::models::{AlternativeNames, Category};

    fn all_flags() -> ColumnFlags {
        ColumnFlags {
            show_published_status: true,
            show_edit_proposals: true,
            show_selection: true,
            enable_filtering: true,
        }
    }

    #[test]
    fn base_columns_follow_the_title() {
        let columns = build_columns(ColumnFlags::default());
        assert_eq!(
            columns.ids(),
            vec![
                ColumnId::Title,
                ColumnId::Type,
                ColumnId::Configuration,
                ColumnId::Categories,
                ColumnId::AlternativeNames,
            ]
        );
        assert_eq!(
            columns.get(ColumnId::Title).map(|column| column.cell),
            Some(CellRule::LinkedTitle)
        );
    }

    #[test]
    fn selection_prepends_checkbox_and_highlighted_title() {
        let columns = build_columns(all_flags());
        assert_eq!(
            columns.ids(),
            vec![
                ColumnId::Select,
                ColumnId::Title,
                ColumnId::Type,
                ColumnId::Configuration,
                ColumnId::Categories,
                ColumnId::AlternativeNames,
                ColumnId::PublicationStatus,
                ColumnId::EditProposal,
            ]
        );
        assert_eq!(
            columns.get(ColumnId::Title).map(|column| column.cell),
            Some(CellRule::HighlightedTitle)
        );
        assert!(columns.has_selection());
    }

    #[test]
    fn disabled_filtering_turns_off_sorting_and_hiding() {
        let columns = build_columns(ColumnFlags {
            enable_filtering: false,
            ..all_flags()
        });
        assert!(columns.iter().all(|column| !column.sortable && !column.hideable));
        assert!(columns.toolbar_filters().is_empty());
        assert!(columns.sortable_ids().is_empty());
    }

    #[test]
    fn categories_render_sorted_by_name() {
        let mut resource = exercise("zip-zap", "Zip Zap", &[]);
        resource.categories = vec![
            Category {
                id: "2".into(),
                name: "warm-up".into(),
            },
            Category {
                id: "1".into(),
                name: "Focus".into(),
            },
        ];
        let columns = build_columns(ColumnFlags::default());
        let cell = columns
            .get(ColumnId::Categories)
            .unwrap()
            .render(&resource, &CellContext::default());
        let Cell::Badges(badges) = cell else {
            panic!("expected badges, got {cell:?}");
        };
        let names: Vec<_> = badges.iter().map(|badge| badge.label.as_str()).collect();
        assert_eq!(names, vec!["Focus", "warm-up"]);
    }

    #[test]
    fn edit_proposal_badge_only_for_proposals() {
        let columns = build_columns(all_flags());
        let column = columns.get(ColumnId::EditProposal).unwrap();
        let mut resource = exercise("zip-zap-proposal", "Zip Zap", &[]);
        assert_eq!(column.render(&resource, &CellContext::default()), Cell::Empty);

        resource.edit_proposal_original_resource_id = Some("zip-zap".into());
        assert!(matches!(
            column.render(&resource, &CellContext::default()),
            Cell::Badges(badges) if badges.len() == 1 && badges[0].label == "Proposal"
        ));
    }

    #[test]
    fn linked_title_highlights_and_links() {
        let columns = build_columns(ColumnFlags::default());
        let resource = exercise("zip-zap", "Zip Zap Zop", &[]);
        let cell = columns.get(ColumnId::Title).unwrap().render(
            &resource,
            &CellContext {
                title_filter: Some("zap"),
                selected: false,
            },
        );
        assert_eq!(
            cell,
            Cell::Title {
                segments: vec![
                    TextSegment {
                        text: "Zip ".into(),
                        highlighted: false
                    },
                    TextSegment {
                        text: "Zap".into(),
                        highlighted: true
                    },
                    TextSegment {
                        text: " Zop".into(),
                        highlighted: false
                    },
                ],
                link: Some("/resource/zip-zap".into()),
            }
        );
    }

    #[test]
    fn alternative_names_render_as_tags() {
        let columns = build_columns(ColumnFlags::default());
        let mut resource = exercise("zip-zap", "Zip Zap", &[]);
        resource.alternative_names = Some(AlternativeNames::LegacyDelimited(
            "Zip Zap Zop;Zip Zop Zap".into(),
        ));
        assert_eq!(
            columns
                .get(ColumnId::AlternativeNames)
                .unwrap()
                .render(&resource, &CellContext::default()),
            Cell::Tags(vec!["Zip Zap Zop".into(), "Zip Zop Zap".into()])
        );
    }

    #[test]
    fn visibility_respects_defaults_and_hideability() {
        let columns = build_columns(all_flags());
        let mut visibility = ColumnVisibility::from_defaults(&columns);
        let visible: Vec<_> = visibility
            .visible_columns(&columns, true)
            .iter()
            .map(|column| column.id)
            .collect();
        assert!(!visible.contains(&ColumnId::AlternativeNames));
        assert!(!visible.contains(&ColumnId::Categories));

        assert!(visibility.toggle(&columns, ColumnId::AlternativeNames));
        assert!(!visibility.toggle(&columns, ColumnId::Select));
        assert!(visibility.is_visible(columns.get(ColumnId::AlternativeNames).unwrap(), false));
    }
}
