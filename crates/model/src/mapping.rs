use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps logical field names to physical column names.
///
/// Lookups are exact-match; a field without an entry resolves to itself, so
/// an empty mapping behaves as the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field-to-column entry, replacing any previous one.
    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Resolves a logical field name to its physical column name.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns.get(field).map(String::as_str).unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

impl From<HashMap<String, String>> for ColumnMapping {
    fn from(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }
}

impl<F: Into<String>, C: Into<String>> FromIterator<(F, C)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(field, column)| (field.into(), column.into()))
                .collect(),
        }
    }
}
