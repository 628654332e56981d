//! Snapshot delivery from the query layer. Loading, failure and an empty
//! success are three different things for the list view and must never share
//! fallback content.

use crate::error::CatalogError;
use crate::models::Resource;

/// Message shown when the snapshot could not be loaded.
pub const UNAVAILABLE_TITLE: &str = "Oh no!";
pub const UNAVAILABLE_MESSAGE: &str = "Something went wrong. Please try reloading the page.";
/// Heading shown above the caller's "no results" message.
pub const EMPTY_TITLE: &str = "No resources found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Build the state from a fetch result, keeping the failure text.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Failure becomes `DataUnavailable`; loading is not a result yet.
    pub fn into_result(self) -> Option<Result<T, CatalogError>> {
        match self {
            Self::Loading => None,
            Self::Failed(reason) => Some(Err(CatalogError::DataUnavailable(reason))),
            Self::Ready(data) => Some(Ok(data)),
        }
    }
}

/// What the list view should show for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent<'a> {
    Loading,
    Unavailable {
        title: &'static str,
        message: &'static str,
    },
    Empty {
        title: &'static str,
        message: &'a str,
    },
    Rows(&'a [Resource]),
}

impl QueryState<Vec<Resource>> {
    pub fn list_content<'a>(&'a self, no_results_message: &'a str) -> ListContent<'a> {
        match self {
            Self::Loading => ListContent::Loading,
            Self::Failed(_) => ListContent::Unavailable {
                title: UNAVAILABLE_TITLE,
                message: UNAVAILABLE_MESSAGE,
            },
            Self::Ready(rows) if rows.is_empty() => ListContent::Empty {
                title: EMPTY_TITLE,
                message: no_results_message,
            },
            Self::Ready(rows) => ListContent::Rows(rows),
        }
    }
}
