use std::cmp::min;

use crate::columns::{build_columns, ColumnFlags, ColumnId, ColumnSet, ColumnVisibility};
use crate::filter::{facet_options, visible_rows, FacetOption, FilterState};
use crate::models::{PublicationStatus, Resource};
use crate::table::{sort_rows, Pagination, SortState};

/// Table shaping state for the resource list: columns, filters, sort, the
/// current page and the row cursor within it.
pub(crate) struct ListScreen {
    pub(crate) columns: ColumnSet,
    pub(crate) visibility: ColumnVisibility,
    pub(crate) filters: FilterState,
    pub(crate) sort: Option<SortState>,
    /// `None` when pagination is switched off and every row is one page.
    pub(crate) pagination: Option<Pagination>,
    pub(crate) cursor: usize,
}

impl ListScreen {
    pub(crate) fn new(flags: ColumnFlags, page_size: usize, paginate: bool) -> Self {
        let columns = build_columns(flags);
        let visibility = ColumnVisibility::from_defaults(&columns);
        Self {
            columns,
            visibility,
            filters: FilterState::new(),
            sort: None,
            pagination: paginate.then(|| Pagination::new(page_size)),
            cursor: 0,
        }
    }

    /// Rows after filtering and sorting, before pagination.
    pub(crate) fn shaped_rows<'a>(&self, rows: &'a [Resource]) -> Vec<&'a Resource> {
        let filtered = visible_rows(rows, &self.columns, &self.filters);
        sort_rows(filtered, &self.columns, self.sort)
    }

    pub(crate) fn page_of<'s, 'a>(&self, shaped: &'s [&'a Resource]) -> &'s [&'a Resource] {
        match &self.pagination {
            Some(pagination) => pagination.slice(shaped),
            None => shaped,
        }
    }

    pub(crate) fn page_index(&self) -> usize {
        self.pagination.map_or(0, |pagination| pagination.page_index)
    }

    pub(crate) fn page_count(&self, total: usize) -> usize {
        self.pagination
            .map_or(1, |pagination| pagination.page_count(total))
    }

    pub(crate) fn next_page(&mut self, total: usize) -> bool {
        let moved = self
            .pagination
            .as_mut()
            .is_some_and(|pagination| pagination.next(total));
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub(crate) fn previous_page(&mut self) -> bool {
        let moved = self
            .pagination
            .as_mut()
            .is_some_and(|pagination| pagination.previous());
        if moved {
            self.cursor = 0;
        }
        moved
    }

    /// Re-fit page and cursor after the row count changed.
    pub(crate) fn clamp(&mut self, total: usize) {
        if let Some(pagination) = self.pagination.as_mut() {
            pagination.clamp(total);
        }
        let page_len = match &self.pagination {
            Some(pagination) => min(
                pagination.page_size,
                total.saturating_sub(pagination.page_index * pagination.page_size),
            ),
            None => total,
        };
        self.cursor = min(self.cursor, page_len.saturating_sub(1));
    }

    /// Filters change the row set, so they always start from the first page.
    pub(crate) fn reset_page(&mut self) {
        if let Some(pagination) = self.pagination.as_mut() {
            pagination.page_index = 0;
        }
        self.cursor = 0;
    }

    pub(crate) fn move_cursor(&mut self, offset: isize, page_len: usize) {
        if page_len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + offset;
        self.cursor = next.clamp(0, page_len as isize - 1) as usize;
    }

    /// Advance the sort: each sortable column ascending, then descending,
    /// then back to the stored order.
    pub(crate) fn cycle_sort(&mut self) -> Option<SortState> {
        let sortable = self.columns.sortable_ids();
        self.sort = match self.sort {
            None => sortable.first().map(|column| SortState {
                column: *column,
                descending: false,
            }),
            Some(SortState {
                column,
                descending: false,
            }) => Some(SortState {
                column,
                descending: true,
            }),
            Some(SortState {
                column,
                descending: true,
            }) => sortable
                .iter()
                .position(|id| *id == column)
                .and_then(|index| sortable.get(index + 1))
                .map(|next| SortState {
                    column: *next,
                    descending: false,
                }),
        };
        self.sort
    }

    pub(crate) fn title_filter(&self) -> Option<&str> {
        self.filters.text(ColumnId::Title)
    }
}

/// Full view of one resource.
pub(crate) struct DetailScreen {
    pub(crate) resource: Resource,
    pub(crate) scroll: u16,
}

impl DetailScreen {
    pub(crate) fn new(resource: Resource) -> Self {
        Self {
            resource,
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        self.scroll = (self.scroll as i32 + offset).clamp(0, u16::MAX as i32) as u16;
    }
}

/// Live title filter prompt. Esc puts `previous` back.
pub(crate) struct TitlePrompt {
    pub(crate) query: String,
    pub(crate) previous: Option<String>,
}

impl TitlePrompt {
    pub(crate) fn new(previous: Option<&str>) -> Self {
        Self {
            query: previous.unwrap_or_default().to_string(),
            previous: previous.map(str::to_string),
        }
    }
}

/// Pick list over the distinct values of one faceted column.
pub(crate) struct FacetPicker {
    pub(crate) column: ColumnId,
    pub(crate) title: &'static str,
    pub(crate) options: Vec<FacetOption>,
    pub(crate) selected: usize,
}

impl FacetPicker {
    pub(crate) fn new(column: ColumnId, title: &'static str, rows: &[Resource]) -> Self {
        Self {
            column,
            title,
            options: facet_options(rows, column),
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.options.is_empty() {
            self.selected = 0;
            return;
        }
        let len = self.options.len() as isize;
        self.selected = (self.selected as isize + offset).rem_euclid(len) as usize;
    }

    pub(crate) fn current(&self) -> Option<&FacetOption> {
        self.options.get(self.selected)
    }
}

/// Pending bulk status change.
pub(crate) struct ConfirmStatus {
    pub(crate) status: PublicationStatus,
    pub(crate) ids: Vec<String>,
}

/// Pending bulk delete.
pub(crate) struct ConfirmDelete {
    pub(crate) ids: Vec<String>,
    pub(crate) titles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::exercise;
    use crate::models::ResourceType;

    fn flags() -> ColumnFlags {
        ColumnFlags {
            show_published_status: true,
            show_edit_proposals: true,
            show_selection: true,
            enable_filtering: true,
        }
    }

    fn rows(count: usize) -> Vec<Resource> {
        (0..count)
            .map(|index| exercise(&format!("game-{index:02}"), &format!("Game {index:02}"), &[]))
            .collect()
    }

    #[test]
    fn pages_through_shaped_rows() {
        let rows = rows(12);
        let mut screen = ListScreen::new(flags(), 5, true);
        let shaped = screen.shaped_rows(&rows);
        assert_eq!(screen.page_of(&shaped).len(), 5);
        assert_eq!(screen.page_count(shaped.len()), 3);

        assert!(screen.next_page(shaped.len()));
        assert!(screen.next_page(shaped.len()));
        assert!(!screen.next_page(shaped.len()));
        assert_eq!(screen.page_of(&shaped).len(), 2);

        screen.cursor = 1;
        screen.clamp(11);
        assert_eq!(screen.page_index(), 2);
        assert_eq!(screen.cursor, 0);
    }

    #[test]
    fn unpaginated_list_is_one_page() {
        let rows = rows(12);
        let mut screen = ListScreen::new(flags(), 5, false);
        let shaped = screen.shaped_rows(&rows);
        assert_eq!(screen.page_of(&shaped).len(), 12);
        assert!(!screen.next_page(shaped.len()));
        assert_eq!(screen.page_count(shaped.len()), 1);
    }

    #[test]
    fn sort_cycles_through_sortable_columns_and_back() {
        let mut screen = ListScreen::new(flags(), 10, true);
        let sortable = screen.columns.sortable_ids();
        assert_eq!(sortable.first(), Some(&ColumnId::Title));

        let mut seen = Vec::new();
        for _ in 0..sortable.len() * 2 {
            seen.push(screen.cycle_sort());
        }
        assert!(seen.iter().all(Option::is_some));
        assert_eq!(screen.cycle_sort(), None);
    }

    #[test]
    fn disabled_filtering_has_nothing_to_sort() {
        let mut screen = ListScreen::new(
            ColumnFlags {
                enable_filtering: false,
                ..flags()
            },
            10,
            true,
        );
        assert_eq!(screen.cycle_sort(), None);
    }

    #[test]
    fn facet_picker_wraps_around() {
        let mut rows = rows(2);
        rows[1].kind = ResourceType::ShortForm;
        rows[1].configuration = None;
        let mut picker = FacetPicker::new(ColumnId::Type, "Type", &rows);
        assert_eq!(picker.options.len(), 2);
        picker.move_selection(-1);
        assert_eq!(
            picker.current().map(|option| option.value.as_str()),
            Some("SHORT_FORM")
        );
    }

    #[test]
    fn title_prompt_remembers_previous_value() {
        let prompt = TitlePrompt::new(Some("zip"));
        assert_eq!(prompt.query, "zip");
        assert_eq!(prompt.previous.as_deref(), Some("zip"));
    }
}
