//! Sort engine.
//!
//! Sorting is per sibling group: children never leave their parent. Within a
//! group, pinned rows hold their original relative order at the start
//! (`First`) or end (`Last`) and the rest are ordered by up to two keys.
//! The sort is stable, so applying it twice gives the same order.

use crate::column::{CellContext, CellValue, Column};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use treegrid_core::{PinAt, Row, RowState};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A column sorted in a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOn {
    /// Column id
    pub column_id: String,
    /// Direction
    pub direction: SortDirection,
}

impl SortOn {
    /// Sort ascending on a column.
    #[must_use]
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Sort descending on a column.
    #[must_use]
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// User-facing sort state.
///
/// `persistent` is always the primary key; `current` is the key the user
/// toggles by clicking column headers and breaks ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortState {
    /// Toggled key
    pub current: Option<SortOn>,
    /// Fixed key
    pub persistent: Option<SortOn>,
}

impl SortState {
    /// Sort state with only a current key.
    #[must_use]
    pub const fn current(on: SortOn) -> Self {
        Self {
            current: Some(on),
            persistent: None,
        }
    }

    /// Whether any key is set.
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.current.is_some() || self.persistent.is_some()
    }
}

/// One resolved sort key: a column index and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Index into the column list
    pub column: usize,
    /// Direction
    pub direction: SortDirection,
}

/// Resolved keys for [`sort_rows`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    /// Primary key
    pub primary: Option<SortKey>,
    /// Tie-breaker
    pub secondary: Option<SortKey>,
}

impl SortSpec {
    /// Resolve a [`SortState`] against a column list.
    ///
    /// Unknown columns and columns sorted server-side contribute no key.
    #[must_use]
    pub fn from_state<D>(state: &SortState, columns: &[Column<D>]) -> Self {
        let resolve = |on: &Option<SortOn>| {
            let on = on.as_ref()?;
            let column = columns.iter().position(|c| c.id() == on.column_id)?;
            columns[column].client_side_sort().then_some(SortKey {
                column,
                direction: on.direction,
            })
        };
        match (resolve(&state.persistent), resolve(&state.current)) {
            (Some(primary), secondary) => Self {
                primary: Some(primary),
                secondary,
            },
            (None, current) => Self {
                primary: current,
                secondary: None,
            },
        }
    }

    /// Whether no key applies.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Next sort state after a click on `clicked`'s header.
///
/// An unsorted table or a different column starts ascending. Clicking the
/// sorted column again flips it when that column is the initial one;
/// otherwise it goes ascending, descending, then back to `initial`.
#[must_use]
pub fn derive_sort_state(current: &SortState, clicked: &str, initial: &SortState) -> SortState {
    let persistent = current.persistent.clone();
    let next = match &current.current {
        Some(on) if on.column_id == clicked => {
            let is_initial = initial
                .current
                .as_ref()
                .is_some_and(|init| init.column_id == clicked);
            if is_initial || on.direction == SortDirection::Asc {
                Some(SortOn {
                    column_id: on.column_id.clone(),
                    direction: on.direction.toggled(),
                })
            } else {
                initial.current.clone()
            }
        }
        _ => Some(SortOn::asc(clicked)),
    };
    SortState {
        current: next,
        persistent,
    }
}

/// Compare two cell values.
///
/// Empty values sort last in either direction; otherwise numbers come before
/// booleans, which come before text.
#[must_use]
pub fn compare_values(
    a: &CellValue,
    b: &CellValue,
    direction: SortDirection,
    case_sensitive: bool,
) -> Ordering {
    fn rank(value: &CellValue) -> u8 {
        match value {
            CellValue::Number(_) => 0,
            CellValue::Bool(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Empty => 3,
        }
    }

    let ordering = match (a, b) {
        (CellValue::Empty, CellValue::Empty) => return Ordering::Equal,
        (CellValue::Empty, _) => return Ordering::Greater,
        (_, CellValue::Empty) => return Ordering::Less,
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        (CellValue::Text(x), CellValue::Text(y)) => {
            if case_sensitive {
                x.cmp(y)
            } else {
                x.to_lowercase().cmp(&y.to_lowercase())
            }
        }
        _ => rank(a).cmp(&rank(b)),
    };
    direction.apply(ordering)
}

/// Sorted copy of a row tree.
#[must_use]
pub fn sort_rows<D: Clone>(
    columns: &[Column<D>],
    rows: &[Row<D>],
    spec: &SortSpec,
    case_sensitive: bool,
) -> Vec<Row<D>> {
    sort_row_group(columns, rows, spec, case_sensitive, 0)
}

fn sort_row_group<D: Clone>(
    columns: &[Column<D>],
    rows: &[Row<D>],
    spec: &SortSpec,
    case_sensitive: bool,
    depth: usize,
) -> Vec<Row<D>> {
    let refs: Vec<&Row<D>> = rows.iter().collect();
    let ordered = order_group(
        refs,
        |row: &&Row<D>| row.pin.map(|pin| pin.at),
        |row: &&Row<D>, key: SortKey| {
            let ctx = CellContext {
                depth,
                has_children: row.has_children(),
                draggable: row.draggable,
                ..CellContext::new(&row.id, &row.kind)
            };
            sort_value(columns, key, &row.data, &ctx)
        },
        spec,
        case_sensitive,
    );
    ordered
        .into_iter()
        .map(|row| Row {
            kind: row.kind.clone(),
            id: row.id.clone(),
            children: sort_row_group(columns, &row.children, spec, case_sensitive, depth + 1),
            pin: row.pin,
            selectable: row.selectable,
            init_collapsed: row.init_collapsed,
            draggable: row.draggable,
            data: row.data.clone(),
        })
        .collect()
}

/// Order one sibling group of row states.
///
/// Synthetic states carry no payload and sort as empty.
#[must_use]
pub fn sort_siblings<'a, D>(
    columns: &[Column<D>],
    siblings: Vec<&'a RowState<D>>,
    spec: &SortSpec,
    case_sensitive: bool,
    depth: usize,
) -> Vec<&'a RowState<D>> {
    order_group(
        siblings,
        |state: &&RowState<D>| state.row().and_then(|row| row.pin).map(|pin| pin.at),
        |state: &&RowState<D>, key: SortKey| {
            let Some(row) = state.row() else {
                return CellValue::Empty;
            };
            let ctx = CellContext {
                depth,
                selected: state.selected(),
                collapsed: state.is_collapsed(),
                has_children: !state.children().is_empty(),
                draggable: row.draggable,
                ..CellContext::new(state.id(), state.kind())
            };
            sort_value(columns, key, &row.data, &ctx)
        },
        spec,
        case_sensitive,
    )
}

fn sort_value<D>(columns: &[Column<D>], key: SortKey, data: &D, ctx: &CellContext<'_>) -> CellValue {
    columns
        .get(key.column)
        .map_or(CellValue::Empty, |column| column.cell(data, ctx).sort_key().clone())
}

/// Shared ordering of a sibling group: pins first, stable keyed sort, pins
/// last.
fn order_group<T>(
    items: Vec<T>,
    pin_of: impl Fn(&T) -> Option<PinAt>,
    value_of: impl Fn(&T, SortKey) -> CellValue,
    spec: &SortSpec,
    case_sensitive: bool,
) -> Vec<T> {
    let mut first = Vec::new();
    let mut last = Vec::new();
    let mut unpinned = Vec::with_capacity(items.len());
    for item in items {
        match pin_of(&item) {
            Some(PinAt::First) => first.push(item),
            Some(PinAt::Last) => last.push(item),
            None => unpinned.push(item),
        }
    }

    if !spec.is_empty() {
        let mut keyed: Vec<(Option<CellValue>, Option<CellValue>, T)> = unpinned
            .into_iter()
            .map(|item| {
                let primary = spec.primary.map(|key| value_of(&item, key));
                let secondary = spec.secondary.map(|key| value_of(&item, key));
                (primary, secondary, item)
            })
            .collect();
        keyed.sort_by(|a, b| {
            compare_keyed(&a.0, &b.0, spec.primary, case_sensitive)
                .then_with(|| compare_keyed(&a.1, &b.1, spec.secondary, case_sensitive))
        });
        unpinned = keyed.into_iter().map(|(_, _, item)| item).collect();
    }

    first.extend(unpinned);
    first.extend(last);
    first
}

fn compare_keyed(
    a: &Option<CellValue>,
    b: &Option<CellValue>,
    key: Option<SortKey>,
    case_sensitive: bool,
) -> Ordering {
    match (a, b, key) {
        (Some(a), Some(b), Some(key)) => compare_values(a, b, key.direction, case_sensitive),
        _ => Ordering::Equal,
    }
}
