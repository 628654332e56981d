//! Error kinds shared by the catalog core. Persistence and the terminal
//! front-end keep using `anyhow` for plumbing failures and wrap these values
//! when a caller needs to branch on the kind (for example to show a duplicate
//! identifier as a top-level notice instead of a field message).

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failures the catalog core can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A stored or imported code has no entry in the matching label map.
    #[error("unmapped {kind} value `{value}`")]
    UnmappedEnumValue { kind: &'static str, value: String },
    /// The query layer failed to deliver a snapshot.
    #[error("resources are unavailable: {0}")]
    DataUnavailable(String),
    /// One or more form fields are invalid.
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),
    /// A resource already exists at this URL identifier.
    #[error("a resource already exists at `{0}`")]
    DuplicateIdentifier(String),
    #[error("resource `{0}` not found")]
    NotFound(String),
}

impl CatalogError {
    pub(crate) fn unmapped(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnmappedEnumValue {
            kind,
            value: value.into(),
        }
    }
}

/// Field-keyed validation messages. Keys are the form field names so the
/// renderer can place each message next to its field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for `field`, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// Turn the collected messages into a result, failing when any exist.
    pub fn into_result(self) -> Result<(), CatalogError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::ValidationFailed(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}
