//! Sorting and pagination of the filtered rows. Together with the column set
//! and the selection tracker this is everything a renderer needs.

use std::cmp::min;

use crate::columns::{ColumnId, ColumnSet};
use crate::models::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: ColumnId,
    pub descending: bool,
}

/// Stable sort by a sortable column. Unknown or unsortable columns leave the
/// order untouched.
pub fn sort_rows<'a>(
    mut rows: Vec<&'a Resource>,
    columns: &ColumnSet,
    sort: Option<SortState>,
) -> Vec<&'a Resource> {
    let Some(sort) = sort else {
        return rows;
    };
    let Some(column) = columns.get(sort.column).filter(|column| column.sortable) else {
        return rows;
    };

    if sort.descending {
        // reverse() would flip equal keys too
        rows.sort_by(|a, b| column.sort_key(b).cmp(&column.sort_key(a)));
    } else {
        rows.sort_by_cached_key(|row| column.sort_key(row));
    }
    rows
}

/// Zero-based page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages for `total` rows; an empty table still has one page.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Pull the page index back inside the valid range after rows shrink.
    pub fn clamp(&mut self, total: usize) {
        self.page_index = min(self.page_index, self.page_count(total) - 1);
    }

    pub fn next(&mut self, total: usize) -> bool {
        if self.page_index + 1 < self.page_count(total) {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn slice<'s, T>(&self, rows: &'s [T]) -> &'s [T] {
        let start = min(self.page_index * self.page_size, rows.len());
        let end = min(start + self.page_size, rows.len());
        &rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{build_columns, ColumnFlags};
    use crate::models::fixtures::exercise;
    use crate::models::PublicationStatus;

    fn sortable_table() -> ColumnSet {
        build_columns(ColumnFlags {
            show_published_status: true,
            enable_filtering: true,
            ..ColumnFlags::default()
        })
    }

    #[test]
    fn sorts_titles_case_insensitively() {
        let rows = [
            exercise("b", "bunny bunny", &[]),
            exercise("a", "Zip Zap", &[]),
            exercise("c", "Alien Tour Guide", &[]),
        ];
        let sorted = sort_rows(
            rows.iter().collect(),
            &sortable_table(),
            Some(SortState {
                column: ColumnId::Title,
                descending: false,
            }),
        );
        let ids: Vec<_> = sorted.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn descending_sort_keeps_ties_stable() {
        let mut draft = exercise("draft", "Draft", &[]);
        draft.publication_status = PublicationStatus::Draft;
        let rows = [
            exercise("p1", "P1", &[]),
            draft,
            exercise("p2", "P2", &[]),
        ];
        let sorted = sort_rows(
            rows.iter().collect(),
            &sortable_table(),
            Some(SortState {
                column: ColumnId::PublicationStatus,
                descending: true,
            }),
        );
        let ids: Vec<_> = sorted.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "draft"]);
    }

    #[test]
    fn unsortable_columns_keep_order() {
        let rows = [exercise("b", "B", &[]), exercise("a", "A", &[])];
        let table = build_columns(ColumnFlags::default());
        let sorted = sort_rows(
            rows.iter().collect(),
            &table,
            Some(SortState {
                column: ColumnId::Title,
                descending: false,
            }),
        );
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn pagination_slices_and_clamps() {
        let rows: Vec<u32> = (0..25).collect();
        let mut pagination = Pagination::new(10);
        assert_eq!(pagination.page_count(rows.len()), 3);
        assert!(pagination.next(rows.len()));
        assert!(pagination.next(rows.len()));
        assert!(!pagination.next(rows.len()));
        assert_eq!(pagination.slice(&rows), &[20, 21, 22, 23, 24]);

        pagination.clamp(5);
        assert_eq!(pagination.page_index, 0);
        assert_eq!(pagination.page_count(0), 1);
        assert!(pagination.slice(&rows[..0]).is_empty());
    }
}
