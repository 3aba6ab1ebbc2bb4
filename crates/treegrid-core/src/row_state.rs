//! Per-row engine state.

use crate::row::{is_reserved_kind, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Tri-state selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedState {
    /// Selected
    Checked,
    /// Not selected
    #[default]
    Unchecked,
    /// Some but not all children selected
    Partial,
}

impl SelectedState {
    /// Map a boolean selection onto the tri-state.
    #[must_use]
    pub const fn from_bool(selected: bool) -> Self {
        if selected {
            Self::Checked
        } else {
            Self::Unchecked
        }
    }

    /// Check if checked (true for Checked, false for others).
    #[must_use]
    pub const fn is_checked(&self) -> bool {
        matches!(self, Self::Checked)
    }

    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
            Self::Partial => "partial",
        }
    }

    /// Check if partial.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial)
    }

    /// Derive a parent's state from its children's states.
    ///
    /// Returns `None` when there are no children to derive from.
    pub fn derive(children: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut any = false;
        let mut all_checked = true;
        let mut all_unchecked = true;
        for state in children {
            any = true;
            all_checked &= state == Self::Checked;
            all_unchecked &= state == Self::Unchecked;
        }
        if !any {
            None
        } else if all_checked {
            Some(Self::Checked)
        } else if all_unchecked {
            Some(Self::Unchecked)
        } else {
            Some(Self::Partial)
        }
    }
}

impl fmt::Display for SelectedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Removal status of a row state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Removed {
    /// Present in the current row tree
    #[default]
    No,
    /// Missing from the latest row tree; kept if still selected
    Soft,
    /// Explicitly deleted
    Hard,
}

impl Removed {
    /// Whether the row is removed in any way.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        !matches!(self, Self::No)
    }
}

/// Engine-owned wrapper around one row.
///
/// Parent and children are stored as ids into the owning arena.
#[derive(Debug, Clone)]
pub struct RowState<D> {
    pub(crate) id: String,
    pub(crate) kind: String,
    pub(crate) serial: u64,
    pub(crate) row: Option<Arc<Row<D>>>,
    pub(crate) collapsed: bool,
    pub(crate) selected: SelectedState,
    pub(crate) removed: Removed,
    pub(crate) is_dragged_over: bool,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,
}

impl<D> RowState<D> {
    pub(crate) fn synthetic(kind: &str, serial: u64, collapsed: bool) -> Self {
        Self {
            id: kind.to_string(),
            kind: kind.to_string(),
            serial,
            row: None,
            collapsed,
            selected: SelectedState::Unchecked,
            removed: Removed::No,
            is_dragged_over: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn for_row(row: Row<D>, serial: u64, collapsed: bool) -> Self {
        Self {
            id: row.id.clone(),
            kind: row.kind.clone(),
            serial,
            row: Some(Arc::new(row)),
            collapsed,
            selected: SelectedState::Unchecked,
            removed: Removed::No,
            is_dragged_over: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Row id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Row kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Creation serial; stable for the life of this state.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// The wrapped row (children detached), `None` for synthetic rows.
    #[must_use]
    pub fn row(&self) -> Option<&Arc<Row<D>>> {
        self.row.as_ref()
    }

    /// Whether the row is collapsed.
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Current tri-state selection.
    #[must_use]
    pub const fn selected(&self) -> SelectedState {
        self.selected
    }

    /// Removal status.
    #[must_use]
    pub const fn removed(&self) -> Removed {
        self.removed
    }

    /// Whether a drag is hovering this row.
    #[must_use]
    pub const fn is_dragged_over(&self) -> bool {
        self.is_dragged_over
    }

    /// Parent id, `None` for the header.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Child ids in row order.
    #[must_use]
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Whether this is one of the synthetic rows.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved_kind(&self.kind)
    }

    /// Whether selection applies to this row.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.row.as_ref().map_or(true, |row| row.is_selectable())
    }

    /// Selected but no longer in the row tree.
    #[must_use]
    pub fn is_kept(&self) -> bool {
        self.removed == Removed::Soft && self.selected.is_checked()
    }
}
