//! Free-text row filter.
//!
//! A filter is a list of whitespace-separated terms. A row matches when every
//! term appears, case-insensitively, in the display text of at least one of
//! the given columns. Rows pinned without `filter` are never hidden.

use crate::column::{CellContext, Column};
use treegrid_core::Row;

/// Parsed search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    terms: Vec<String>,
}

impl SearchFilter {
    /// Parse a filter string.
    #[must_use]
    pub fn parse(filter: &str) -> Self {
        Self {
            terms: filter.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// Whether the filter has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lowercased terms.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether every term occurs in at least one of `texts`.
    pub fn matches_texts<I, S>(&self, texts: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.terms.is_empty() {
            return true;
        }
        let texts: Vec<String> = texts.into_iter().map(|t| t.as_ref().to_lowercase()).collect();
        self.terms
            .iter()
            .all(|term| texts.iter().any(|text| text.contains(term.as_str())))
    }

    /// Whether a row's own cells match.
    pub fn matches_row<D>(&self, columns: &[&Column<D>], data: &D, ctx: &CellContext<'_>) -> bool {
        self.is_empty()
            || self.matches_texts(columns.iter().map(|column| column.cell(data, ctx).display()))
    }
}

/// Whether a row ignores the search filter.
#[must_use]
pub fn is_filter_exempt<D>(row: &Row<D>) -> bool {
    row.pin.is_some_and(|pin| !pin.filter)
}

/// Filtered copy of a row tree.
///
/// A row stays when it matches, is exempt, has a matching descendant, or
/// descends from a matching row.
#[must_use]
pub fn filter_rows<D: Clone>(
    columns: &[&Column<D>],
    rows: &[Row<D>],
    filter: &SearchFilter,
) -> Vec<Row<D>> {
    if filter.is_empty() {
        return rows.to_vec();
    }
    filter_group(columns, rows, filter, 0)
}

fn filter_group<D: Clone>(
    columns: &[&Column<D>],
    rows: &[Row<D>],
    filter: &SearchFilter,
    depth: usize,
) -> Vec<Row<D>> {
    rows.iter()
        .filter_map(|row| {
            let ctx = CellContext {
                depth,
                has_children: row.has_children(),
                draggable: row.draggable,
                ..CellContext::new(&row.id, &row.kind)
            };
            if is_filter_exempt(row) || filter.matches_row(columns, &row.data, &ctx) {
                return Some(row.clone());
            }
            let children = filter_group(columns, &row.children, filter, depth + 1);
            (!children.is_empty()).then(|| Row {
                kind: row.kind.clone(),
                id: row.id.clone(),
                children,
                pin: row.pin,
                selectable: row.selectable,
                init_collapsed: row.init_collapsed,
                draggable: row.draggable,
                data: row.data.clone(),
            })
        })
        .collect()
}
