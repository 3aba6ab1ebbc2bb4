//! Caller-supplied row tree.
//!
//! A [`Row`] is a node of kind-tagged data with a globally unique id. The
//! tree is handed to the engine wholesale on every update; the engine diffs
//! it by id rather than by position.

use serde::{Deserialize, Serialize};

/// Kind of the synthetic header row (root of every row tree).
pub const HEADER: &str = "header";

/// Kind of the synthetic group that holds selected-but-removed rows.
pub const KEPT_GROUP: &str = "keptGroup";

/// Whether a kind is reserved for synthetic rows.
#[must_use]
pub fn is_reserved_kind(kind: &str) -> bool {
    kind == HEADER || kind == KEPT_GROUP
}

/// Where a pinned row is anchored within its sibling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinAt {
    First,
    Last,
}

/// Pin configuration for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Anchor position
    pub at: PinAt,
    /// Whether the search filter still applies to this row
    #[serde(default)]
    pub filter: bool,
}

impl Pin {
    /// Pin to the start of the sibling group.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            at: PinAt::First,
            filter: false,
        }
    }

    /// Pin to the end of the sibling group.
    #[must_use]
    pub const fn last() -> Self {
        Self {
            at: PinAt::Last,
            filter: false,
        }
    }

    /// Let the search filter hide this row.
    #[must_use]
    pub const fn filtered(mut self) -> Self {
        self.filter = true;
        self
    }
}

/// A node in the caller's row tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<D> {
    /// Discriminant selecting the per-column renderer
    pub kind: String,
    /// Unique across the whole tree
    pub id: String,
    /// Ordered children
    #[serde(default = "Vec::new")]
    pub children: Vec<Row<D>>,
    /// Pin configuration
    #[serde(default)]
    pub pin: Option<Pin>,
    /// `Some(false)` opts the row out of selection
    #[serde(default)]
    pub selectable: Option<bool>,
    /// Collapsed state used the first time the row is seen
    #[serde(default)]
    pub init_collapsed: bool,
    /// Whether the row can be dragged
    #[serde(default)]
    pub draggable: bool,
    /// Kind-specific payload
    pub data: D,
}

impl<D> Row<D> {
    /// Create a leaf row.
    pub fn new(kind: impl Into<String>, id: impl Into<String>, data: D) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            children: Vec::new(),
            pin: None,
            selectable: None,
            init_collapsed: false,
            draggable: false,
            data,
        }
    }

    /// Add a child row.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Pin the row within its sibling group.
    #[must_use]
    pub const fn pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Set whether the row is selectable.
    #[must_use]
    pub const fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = Some(selectable);
        self
    }

    /// Start the row collapsed.
    #[must_use]
    pub const fn init_collapsed(mut self, collapsed: bool) -> Self {
        self.init_collapsed = collapsed;
        self
    }

    /// Mark the row draggable.
    #[must_use]
    pub const fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    /// Whether the row participates in selection.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.selectable != Some(false)
    }

    /// Whether this row has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Detach the children, leaving a childless node.
    pub(crate) fn split_children(mut self) -> (Self, Vec<Self>) {
        let children = std::mem::take(&mut self.children);
        (self, children)
    }

    /// Visit every row id in depth-first order.
    pub fn walk_ids<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        f(&self.id);
        for child in &self.children {
            child.walk_ids(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_new_defaults() {
        let row = Row::new("data", "r1", 5);
        assert_eq!(row.kind, "data");
        assert_eq!(row.id, "r1");
        assert!(row.children.is_empty());
        assert!(row.pin.is_none());
        assert!(row.is_selectable());
        assert!(!row.init_collapsed);
        assert!(!row.draggable);
    }

    #[test]
    fn test_row_builder() {
        let row = Row::new("parent", "p", ())
            .child(Row::new("child", "c1", ()))
            .child(Row::new("child", "c2", ()))
            .pin(Pin::first().filtered())
            .selectable(false)
            .init_collapsed(true)
            .draggable(true);
        assert_eq!(row.children.len(), 2);
        assert_eq!(
            row.pin,
            Some(Pin {
                at: PinAt::First,
                filter: true
            })
        );
        assert!(!row.is_selectable());
        assert!(row.init_collapsed);
        assert!(row.draggable);
        assert!(row.has_children());
    }

    #[test]
    fn test_split_children() {
        let row = Row::new("p", "p", ()).child(Row::new("c", "c", ()));
        let (node, children) = row.split_children();
        assert!(node.children.is_empty());
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_walk_ids_depth_first() {
        let row = Row::new("p", "a", ())
            .child(Row::new("c", "b", ()).child(Row::new("g", "c", ())))
            .child(Row::new("c", "d", ()));
        let mut ids = Vec::new();
        row.walk_ids(&mut |id| ids.push(id));
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_reserved_kinds() {
        assert!(is_reserved_kind(HEADER));
        assert!(is_reserved_kind(KEPT_GROUP));
        assert!(!is_reserved_kind("data"));
    }

    #[test]
    fn test_row_deserialize_defaults() {
        let row: Row<u32> =
            serde_json::from_str(r#"{"kind":"data","id":"r","data":3}"#).unwrap();
        assert_eq!(row.data, 3);
        assert!(row.children.is_empty());
        assert!(row.selectable.is_none());
    }

    #[test]
    fn test_pin_serde_lowercase() {
        let json = serde_json::to_string(&Pin::last()).unwrap();
        assert_eq!(json, r#"{"at":"last","filter":false}"#);
    }
}
