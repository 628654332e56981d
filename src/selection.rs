//! Row selection for the resource table.
//!
//! The tracker keeps the selected ids for the whole dataset but scopes the
//! "select all" checkbox to the rows of the current page. Selections survive
//! paging and filter changes; every mutation reports the full selection, in
//! dataset order, to the registered listener.
//!
//! The tracker is owned by a single event loop. Hosts that share it across
//! threads must serialise access, since every toggle is a read-modify-write.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::models::Resource;

/// Anything that can be selected by a stable string key.
pub trait RowKey {
    fn row_key(&self) -> &str;
}

impl RowKey for Resource {
    fn row_key(&self) -> &str {
        &self.id
    }
}

/// Tri-state of the header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

type Listener<T> = Box<dyn FnMut(&[&T])>;

pub struct SelectionTracker<T> {
    rows: Vec<T>,
    page: Vec<String>,
    selected: HashSet<String>,
    listener: Option<Listener<T>>,
}

impl<T: RowKey> SelectionTracker<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            page: Vec::new(),
            selected: HashSet::new(),
            listener: None,
        }
    }

    /// Register the callback that receives the selection after each change.
    pub fn on_change(&mut self, listener: impl FnMut(&[&T]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Swap in a fresh dataset snapshot. Selected ids that disappeared are
    /// dropped, which counts as a change.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        let known: HashSet<&str> = self.rows.iter().map(RowKey::row_key).collect();
        let before = self.selected.len();
        self.selected.retain(|id| known.contains(id.as_str()));
        if self.selected.len() != before {
            debug!(dropped = before - self.selected.len(), "pruned stale selection");
            self.notify();
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Set the ids of the rows currently on screen.
    pub fn set_page<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.page = ids.into_iter().map(Into::into).collect();
    }

    pub fn page(&self) -> &[String] {
        &self.page
    }

    /// Flip one row. Returns whether the row is selected afterwards.
    pub fn toggle_row(&mut self, id: &str) -> bool {
        let selected = if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        };
        self.notify();
        selected
    }

    /// Select or clear every row of the current page. Off-page rows keep
    /// their state.
    pub fn toggle_all_on_page(&mut self, checked: bool) {
        for id in &self.page {
            if checked {
                self.selected.insert(id.clone());
            } else {
                self.selected.remove(id);
            }
        }
        self.notify();
    }

    pub fn clear(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.selected.clear();
        self.notify();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// True when the page has rows and all of them are selected.
    pub fn is_all_selected(&self) -> bool {
        !self.page.is_empty() && self.page.iter().all(|id| self.selected.contains(id))
    }

    /// True when some, but not all, page rows are selected.
    pub fn is_some_selected(&self) -> bool {
        self.page.iter().any(|id| self.selected.contains(id)) && !self.is_all_selected()
    }

    pub fn page_check_state(&self) -> CheckState {
        if self.is_all_selected() {
            CheckState::Checked
        } else if self.is_some_selected() {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// Selected rows in dataset order.
    pub fn selected_rows(&self) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|row| self.selected.contains(row.row_key()))
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected_rows()
            .into_iter()
            .map(|row| row.row_key().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    fn notify(&mut self) {
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        let selected: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.selected.contains(row.row_key()))
            .collect();
        listener(&selected);
    }
}

impl<T> fmt::Debug for SelectionTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("rows", &self.rows.len())
            .field("page", &self.page)
            .field("selected", &self.selected)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::models::fixtures::exercise;

    fn tracker() -> SelectionTracker<Resource> {
        SelectionTracker::new(vec![
            exercise("a", "A", &[]),
            exercise("b", "B", &[]),
            exercise("c", "C", &[]),
            exercise("d", "D", &[]),
        ])
    }

    #[test]
    fn select_all_on_page_marks_page_as_selected() {
        let mut selection = tracker();
        selection.set_page(["a", "b"]);
        selection.toggle_all_on_page(true);
        assert!(selection.is_all_selected());
        assert!(!selection.is_some_selected());
        assert_eq!(selection.page_check_state(), CheckState::Checked);
    }

    #[test]
    fn unselecting_page_keeps_off_page_rows() {
        let mut selection = tracker();
        selection.toggle_row("d");
        selection.set_page(["a", "b"]);
        selection.toggle_all_on_page(true);
        selection.toggle_all_on_page(false);

        assert!(!selection.is_selected("a"));
        assert!(!selection.is_selected("b"));
        assert!(selection.is_selected("d"));
        assert_eq!(selection.page_check_state(), CheckState::Unchecked);
    }

    #[test]
    fn partial_page_selection_is_indeterminate() {
        let mut selection = tracker();
        selection.set_page(["a", "b"]);
        selection.toggle_row("b");
        assert!(selection.is_some_selected());
        assert_eq!(selection.page_check_state(), CheckState::Indeterminate);
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let selection = tracker();
        assert!(!selection.is_all_selected());
        assert!(!selection.is_some_selected());
    }

    #[test]
    fn listener_receives_rows_in_dataset_order_across_pages() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut selection = tracker();
        selection.on_change(move |rows: &[&Resource]| {
            *sink.borrow_mut() = rows.iter().map(|row| row.id.clone()).collect();
        });
        selection.set_page(["c", "d"]);
        selection.toggle_row("d");
        selection.set_page(["a", "b"]);
        selection.toggle_row("a");

        assert_eq!(*seen.borrow(), vec!["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn replacing_rows_drops_missing_selection() {
        let mut selection = tracker();
        selection.toggle_row("a");
        selection.toggle_row("c");
        selection.set_rows(vec![exercise("c", "C", &[])]);
        assert_eq!(selection.selected_ids(), vec!["c".to_string()]);
    }
}
