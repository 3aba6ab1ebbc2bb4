//! Table configuration.
//!
//! ```yaml
//! storage_key: orders
//! persist_collapse: true
//! persist_columns: true
//! case_sensitive: false
//! table_min_width: 640
//! initial_sort:
//!   current: { columnId: name, direction: ASC }
//! nested_cards:
//!   spacer_px: 4
//!   kinds:
//!     order: { bg_color: "#f5f5f5", pad_x: 8, br: 8, spacing_px: 8 }
//! ```

use crate::error::TableResult;
use crate::nested_cards::NestedCardsStyle;
use crate::sort::SortState;
use serde::{Deserialize, Serialize};

/// Settings that stay fixed for the life of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Key persisted state is stored under
    pub storage_key: Option<String>,
    /// Persist collapsed row ids under `{storage_key}`
    pub persist_collapse: bool,
    /// Persist column visibility, expansion and widths under
    /// `{storage_key}-columns`
    pub persist_columns: bool,
    /// Compare text case-sensitively when sorting
    pub case_sensitive: bool,
    /// Width the table never lays out below, in px
    pub table_min_width: f64,
    /// Sort state clicking a header eventually cycles back to
    pub initial_sort: SortState,
    /// Card chrome around parent rows
    pub nested_cards: Option<NestedCardsStyle>,
}

impl TableConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> TableResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> TableResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Persist state under `key`.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Persist collapsed ids.
    #[must_use]
    pub const fn persist_collapse(mut self) -> Self {
        self.persist_collapse = true;
        self
    }

    /// Persist column state.
    #[must_use]
    pub const fn persist_columns(mut self) -> Self {
        self.persist_columns = true;
        self
    }

    /// Sort text case-sensitively.
    #[must_use]
    pub const fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Set the minimum table width.
    #[must_use]
    pub const fn table_min_width(mut self, px: f64) -> Self {
        self.table_min_width = px;
        self
    }

    /// Set the initial sort state.
    #[must_use]
    pub fn initial_sort(mut self, sort: SortState) -> Self {
        self.initial_sort = sort;
        self
    }

    /// Draw parent rows as nested cards.
    #[must_use]
    pub fn nested_cards(mut self, style: NestedCardsStyle) -> Self {
        self.nested_cards = Some(style);
        self
    }

    /// Key of the collapsed-ids blob, when collapse persistence is on.
    #[must_use]
    pub fn collapse_key(&self) -> Option<String> {
        self.storage_key
            .as_ref()
            .filter(|_| self.persist_collapse)
            .cloned()
    }

    /// Key of the column-state blob, when column persistence is on.
    #[must_use]
    pub fn columns_key(&self) -> Option<String> {
        self.storage_key
            .as_ref()
            .filter(|_| self.persist_columns)
            .map(|key| format!("{key}-columns"))
    }
}
