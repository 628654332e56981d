//! Row filtering for the resource table.
//!
//! A row is visible when every active entry of the [`FilterState`] passes the
//! predicate of its column. Filtering never reorders rows.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::columns::{ColumnId, ColumnSet};
use crate::models::{Resource, ResourceConfiguration, ResourceType};

/// Active value of one column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    AnyOf(BTreeSet<String>),
}

impl FilterValue {
    /// Empty text and empty sets do not constrain anything.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Text(text) => !text.trim().is_empty(),
            Self::AnyOf(values) => !values.is_empty(),
        }
    }

    pub fn values(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Text(text) => Box::new(std::iter::once(text.as_str())),
            Self::AnyOf(values) => Box::new(values.iter().map(String::as_str)),
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        match self {
            Self::Text(text) => text == candidate,
            Self::AnyOf(values) => values.contains(candidate),
        }
    }
}

/// Active filters keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    active: BTreeMap<ColumnId, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn get(&self, column: ColumnId) -> Option<&FilterValue> {
        self.active.get(&column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &FilterValue)> {
        self.active.iter().map(|(column, value)| (*column, value))
    }

    /// Set a free-text filter; blank text clears it.
    pub fn set_text(&mut self, column: ColumnId, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.active.remove(&column);
        } else {
            self.active.insert(column, FilterValue::Text(text));
        }
    }

    pub fn text(&self, column: ColumnId) -> Option<&str> {
        match self.active.get(&column) {
            Some(FilterValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_values<I, S>(&mut self, column: ColumnId, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.active.remove(&column);
        } else {
            self.active.insert(column, FilterValue::AnyOf(values));
        }
    }

    /// Add or remove one acceptable value of a multi-select filter. Returns
    /// whether the value is selected afterwards.
    pub fn toggle_value(&mut self, column: ColumnId, value: &str) -> bool {
        let mut values = match self.active.remove(&column) {
            Some(FilterValue::AnyOf(values)) => values,
            _ => BTreeSet::new(),
        };
        let selected = if values.remove(value) {
            false
        } else {
            values.insert(value.to_string());
            true
        };
        if !values.is_empty() {
            self.active.insert(column, FilterValue::AnyOf(values));
        }
        selected
    }

    pub fn is_value_selected(&self, column: ColumnId, value: &str) -> bool {
        matches!(self.active.get(&column), Some(FilterValue::AnyOf(values)) if values.contains(value))
    }

    pub fn clear(&mut self, column: ColumnId) {
        self.active.remove(&column);
    }

    pub fn clear_all(&mut self) {
        self.active.clear();
    }
}

/// Rows that pass every active filter, in their original order.
pub fn visible_rows<'a>(
    rows: &'a [Resource],
    columns: &ColumnSet,
    filters: &FilterState,
) -> Vec<&'a Resource> {
    let predicates: Vec<_> = filters
        .iter()
        .filter(|(_, value)| value.is_active())
        .filter_map(|(id, value)| columns.get(id).map(|column| (column, value)))
        .collect();

    rows.iter()
        .filter(|row| {
            predicates
                .iter()
                .all(|(column, value)| column.matches(row, value))
        })
        .collect()
}

/// One pick-list entry of a faceted filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Distinct values of a faceted column with the number of rows carrying each.
/// Type and configuration follow enum order; categories sort by name.
pub fn facet_options(rows: &[Resource], column: ColumnId) -> Vec<FacetOption> {
    match column {
        ColumnId::Type => ResourceType::ALL
            .iter()
            .filter_map(|kind| {
                let count = rows.iter().filter(|row| row.kind == *kind).count();
                (count > 0).then(|| FacetOption {
                    value: kind.code().to_string(),
                    label: kind.label().to_string(),
                    count,
                })
            })
            .collect(),
        ColumnId::Configuration => ResourceConfiguration::ALL
            .iter()
            .filter_map(|configuration| {
                let count = rows
                    .iter()
                    .filter(|row| row.configuration == Some(*configuration))
                    .count();
                (count > 0).then(|| FacetOption {
                    value: configuration.code().to_string(),
                    label: configuration.label().to_string(),
                    count,
                })
            })
            .collect(),
        ColumnId::Categories => {
            let mut counts: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
            for category in rows.iter().flat_map(|row| row.categories.iter()) {
                counts
                    .entry(category.id.as_str())
                    .or_insert((category.name.as_str(), 0))
                    .1 += 1;
            }
            let mut options: Vec<_> = counts
                .into_iter()
                .map(|(id, (name, count))| FacetOption {
                    value: id.to_string(),
                    label: name.to_string(),
                    count,
                })
                .collect();
            options.sort_by(|a, b| {
                a.label
                    .to_lowercase()
                    .cmp(&b.label.to_lowercase())
                    .then_with(|| a.value.cmp(&b.value))
            });
            options
        }
        _ => Vec::new(),
    }
}

/// Byte range of the first case-insensitive occurrence of `needle`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    'outer: for (start, _) in haystack.char_indices() {
        let mut hay = haystack[start..].char_indices();
        let mut end = start;
        for expected in needle.chars() {
            match hay.next() {
                Some((offset, actual)) if actual.to_lowercase().eq(expected.to_lowercase()) => {
                    end = start + offset + actual.len_utf8();
                }
                _ => continue 'outer,
            }
        }
        return Some(start..end);
    }
    None
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || find_ignore_case(haystack, needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{build_columns, ColumnFlags};
    use crate::models::fixtures::exercise;
    use pretty_assertions::assert_eq;

    fn titles<'a>(rows: &[&'a Resource]) -> Vec<&'a str> {
        rows.iter().map(|row| row.title.as_str()).collect()
    }

    fn table() -> ColumnSet {
        build_columns(ColumnFlags {
            enable_filtering: true,
            ..ColumnFlags::default()
        })
    }

    #[test]
    fn category_filter_is_any_of() {
        let rows = vec![
            exercise("one", "One", &["a", "b"]),
            exercise("two", "Two", &["b"]),
            exercise("three", "Three", &[]),
        ];
        let mut filters = FilterState::new();
        filters.set_values(ColumnId::Categories, ["a"]);
        assert_eq!(titles(&visible_rows(&rows, &table(), &filters)), vec!["One"]);

        filters.set_values(ColumnId::Categories, ["a", "b"]);
        assert_eq!(
            titles(&visible_rows(&rows, &table(), &filters)),
            vec!["One", "Two"]
        );
    }

    #[test]
    fn title_filter_is_case_insensitive_substring() {
        let rows = vec![
            exercise("zip", "Zip Zap Zop", &[]),
            exercise("bunny", "Bunny Bunny", &[]),
        ];
        let mut filters = FilterState::new();
        filters.set_text(ColumnId::Title, "zAP");
        assert_eq!(
            titles(&visible_rows(&rows, &table(), &filters)),
            vec!["Zip Zap Zop"]
        );
    }

    #[test]
    fn missing_configuration_never_matches_an_active_filter() {
        let mut long_form = exercise("harold", "Harold", &[]);
        long_form.kind = ResourceType::LongForm;
        long_form.configuration = None;
        let rows = vec![long_form, exercise("circle", "Circle Game", &[])];

        let mut filters = FilterState::new();
        filters.set_values(ColumnId::Configuration, ["CIRCLE", "SOLO"]);
        assert_eq!(
            titles(&visible_rows(&rows, &table(), &filters)),
            vec!["Circle Game"]
        );
    }

    #[test]
    fn filters_combine_across_columns() {
        let mut short_form = exercise("freeze", "Freeze", &["a"]);
        short_form.kind = ResourceType::ShortForm;
        short_form.configuration = None;
        let rows = vec![short_form, exercise("zip", "Zip Zap", &["a"])];

        let mut filters = FilterState::new();
        filters.set_values(ColumnId::Categories, ["a"]);
        filters.set_values(ColumnId::Type, ["SHORT_FORM"]);
        assert_eq!(titles(&visible_rows(&rows, &table(), &filters)), vec!["Freeze"]);
    }

    #[test]
    fn toggle_value_drops_empty_filters() {
        let mut filters = FilterState::new();
        assert!(filters.toggle_value(ColumnId::Type, "EXERCISE"));
        assert!(filters.is_value_selected(ColumnId::Type, "EXERCISE"));
        assert!(!filters.toggle_value(ColumnId::Type, "EXERCISE"));
        assert!(filters.is_empty());
    }

    #[test]
    fn facets_count_rows_per_value() {
        let rows = vec![
            exercise("one", "One", &["b", "a"]),
            exercise("two", "Two", &["b"]),
        ];
        let facets = facet_options(&rows, ColumnId::Categories);
        let summary: Vec<_> = facets
            .iter()
            .map(|facet| (facet.value.as_str(), facet.count))
            .collect();
        assert_eq!(summary, vec![("a", 1), ("b", 2)]);

        let types = facet_options(&rows, ColumnId::Type);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].count, 2);
    }

    #[test]
    fn find_ignore_case_handles_multibyte_text() {
        assert_eq!(find_ignore_case("Ça Ira", "ça"), Some(0..3));
        assert_eq!(find_ignore_case("Zip", "zop"), None);
        assert_eq!(find_ignore_case("Zip", ""), None);
    }
}
