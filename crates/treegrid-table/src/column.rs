//! Column model.
//!
//! A [`Column`] produces one [`Cell`] per row by dispatching on the row's
//! kind. Kinds without an explicit renderer fall back to the column's default
//! renderer, which is how the stock action columns (select, collapse, drag
//! handle) render any kind a caller invents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use treegrid_core::SelectedState;
use treegrid_layout::{ColumnSizing, DeclaredWidth};

/// Id of the stock selection column.
pub const SELECT_COLUMN: &str = "select";

/// Id of the stock collapse column.
pub const COLLAPSE_COLUMN: &str = "collapse";

/// Id of the stock drag-handle column.
pub const DRAG_HANDLE_COLUMN: &str = "dragHandle";

/// A cell value in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Empty cell
    Empty,
}

impl CellValue {
    /// Get display text for the cell.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format!("{n}"),
            Self::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
            Self::Empty => String::new(),
        }
    }

    /// Check if the cell is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Rendered content of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Displayed value
    pub value: CellValue,
    /// Value used for sorting instead of `value`
    pub sort_value: Option<CellValue>,
}

impl Cell {
    /// Create a cell.
    #[must_use]
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            sort_value: None,
        }
    }

    /// Create an empty cell.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            sort_value: None,
        }
    }

    /// Sort by a value other than the displayed one.
    #[must_use]
    pub fn sort_by(mut self, value: impl Into<CellValue>) -> Self {
        self.sort_value = Some(value.into());
        self
    }

    /// The value the sort engine compares.
    #[must_use]
    pub fn sort_key(&self) -> &CellValue {
        self.sort_value.as_ref().unwrap_or(&self.value)
    }

    /// Display text.
    #[must_use]
    pub fn display(&self) -> String {
        self.value.display()
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Self {
            value,
            sort_value: None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::new(n)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Self::new(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::new(b)
    }
}

/// Row facts a renderer may use besides the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellContext<'a> {
    /// Row id
    pub row_id: &'a str,
    /// Row kind
    pub kind: &'a str,
    /// Nesting depth, 0 for top-level rows
    pub depth: usize,
    /// Selection state
    pub selected: SelectedState,
    /// Whether the row is collapsed
    pub collapsed: bool,
    /// Whether the row has children
    pub has_children: bool,
    /// Whether the row can be dragged
    pub draggable: bool,
}

impl<'a> CellContext<'a> {
    /// Context for a row outside any table state.
    #[must_use]
    pub const fn new(row_id: &'a str, kind: &'a str) -> Self {
        Self {
            row_id,
            kind,
            depth: 0,
            selected: SelectedState::Unchecked,
            collapsed: false,
            has_children: false,
            draggable: false,
        }
    }
}

/// Cell renderer.
pub type Renderer<D> = Arc<dyn Fn(&D, &CellContext<'_>) -> Cell + Send + Sync>;

/// Text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Edge a sticky column sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sticky {
    Left,
    Right,
}

/// Column definition.
pub struct Column<D> {
    id: String,
    header: String,
    renderers: HashMap<String, Renderer<D>>,
    default_renderer: Option<Renderer<D>>,
    w: Option<DeclaredWidth>,
    expanded_width: Option<DeclaredWidth>,
    mw: Option<String>,
    align: TextAlign,
    sticky: Option<Sticky>,
    is_action: bool,
    client_side_sort: bool,
    server_side_sort_key: Option<String>,
    can_hide: bool,
    init_visible: bool,
    expand_columns: Vec<Column<D>>,
}

impl<D> Clone for Column<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            renderers: self.renderers.clone(),
            default_renderer: self.default_renderer.clone(),
            w: self.w.clone(),
            expanded_width: self.expanded_width.clone(),
            mw: self.mw.clone(),
            align: self.align,
            sticky: self.sticky,
            is_action: self.is_action,
            client_side_sort: self.client_side_sort,
            server_side_sort_key: self.server_side_sort_key.clone(),
            can_hide: self.can_hide,
            init_visible: self.init_visible,
            expand_columns: self.expand_columns.clone(),
        }
    }
}

impl<D> fmt::Debug for Column<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&String> = self.renderers.keys().collect();
        kinds.sort();
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("kinds", &kinds)
            .field("has_default", &self.default_renderer.is_some())
            .field("w", &self.w)
            .field("is_action", &self.is_action)
            .field("expand_columns", &self.expand_columns)
            .finish_non_exhaustive()
    }
}

impl<D> Column<D> {
    /// Create a column with no renderers; every cell is empty until one is
    /// added.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: String::new(),
            renderers: HashMap::new(),
            default_renderer: None,
            w: None,
            expanded_width: None,
            mw: None,
            align: TextAlign::Left,
            sticky: None,
            is_action: false,
            client_side_sort: true,
            server_side_sort_key: None,
            can_hide: false,
            init_visible: true,
            expand_columns: Vec::new(),
        }
    }

    /// Create a column that renders every kind with `render` unless
    /// overridden with [`Column::render`].
    #[must_use]
    pub fn with_default<F>(id: impl Into<String>, render: F) -> Self
    where
        F: Fn(&D, &CellContext<'_>) -> Cell + Send + Sync + 'static,
    {
        Self::new(id).default_render(render)
    }

    /// Stock selection column: a checkbox cell carrying the tri-state as
    /// `"checked"`, `"partial"` or `"unchecked"`.
    #[must_use]
    pub fn select() -> Self {
        Self::with_default(SELECT_COLUMN, |_, ctx| Cell::new(ctx.selected.as_str()))
            .w("40px")
            .action()
            .align(TextAlign::Center)
            .sticky(Sticky::Left)
    }

    /// Stock collapse column: an expand/collapse toggle for rows with
    /// children.
    #[must_use]
    pub fn collapse() -> Self {
        Self::with_default(COLLAPSE_COLUMN, |_, ctx| {
            if ctx.has_children {
                Cell::new(!ctx.collapsed)
            } else {
                Cell::empty()
            }
        })
        .w("32px")
        .action()
        .align(TextAlign::Center)
    }

    /// Stock drag-handle column: a handle for draggable rows.
    #[must_use]
    pub fn drag_handle() -> Self {
        Self::with_default(DRAG_HANDLE_COLUMN, |_, ctx| {
            if ctx.draggable {
                Cell::new("⠿")
            } else {
                Cell::empty()
            }
        })
        .w("24px")
        .action()
        .align(TextAlign::Center)
    }

    /// Set the header label.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Render rows of `kind` with `render`.
    #[must_use]
    pub fn render<F>(mut self, kind: impl Into<String>, render: F) -> Self
    where
        F: Fn(&D, &CellContext<'_>) -> Cell + Send + Sync + 'static,
    {
        self.renderers.insert(kind.into(), Arc::new(render));
        self
    }

    /// Render every kind without an explicit renderer with `render`.
    #[must_use]
    pub fn default_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&D, &CellContext<'_>) -> Cell + Send + Sync + 'static,
    {
        self.default_renderer = Some(Arc::new(render));
        self
    }

    /// Set the declared width.
    #[must_use]
    pub fn w(mut self, w: impl Into<DeclaredWidth>) -> Self {
        self.w = Some(w.into());
        self
    }

    /// Set the width used while the column is expanded.
    #[must_use]
    pub fn expanded_width(mut self, w: impl Into<DeclaredWidth>) -> Self {
        self.expanded_width = Some(w.into());
        self
    }

    /// Set the minimum width (`"Npx"`).
    #[must_use]
    pub fn mw(mut self, mw: impl Into<String>) -> Self {
        self.mw = Some(mw.into());
        self
    }

    /// Set text alignment.
    #[must_use]
    pub const fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Stick the column to an edge while scrolling.
    #[must_use]
    pub const fn sticky(mut self, sticky: Sticky) -> Self {
        self.sticky = Some(sticky);
        self
    }

    /// Mark as an action column: fixed during resize, never client-sorted.
    #[must_use]
    pub const fn action(mut self) -> Self {
        self.is_action = true;
        self.client_side_sort = false;
        self
    }

    /// Leave ordering on this column to the server.
    #[must_use]
    pub fn server_side_sort(mut self, key: impl Into<String>) -> Self {
        self.server_side_sort_key = Some(key.into());
        self.client_side_sort = false;
        self
    }

    /// Let the user hide the column.
    #[must_use]
    pub const fn can_hide(mut self) -> Self {
        self.can_hide = true;
        self
    }

    /// Start hidden (only meaningful for hideable columns).
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.init_visible = false;
        self
    }

    /// Columns shown after this one while it is expanded.
    #[must_use]
    pub fn expand_columns(mut self, columns: impl IntoIterator<Item = Self>) -> Self {
        self.expand_columns = columns.into_iter().collect();
        self
    }

    /// Column id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header label.
    #[must_use]
    pub fn header_label(&self) -> &str {
        &self.header
    }

    /// Declared width.
    #[must_use]
    pub const fn width(&self) -> Option<&DeclaredWidth> {
        self.w.as_ref()
    }

    /// Minimum width.
    #[must_use]
    pub fn min_width(&self) -> Option<&str> {
        self.mw.as_deref()
    }

    /// Text alignment.
    #[must_use]
    pub const fn text_align(&self) -> TextAlign {
        self.align
    }

    /// Sticky edge.
    #[must_use]
    pub const fn sticky_edge(&self) -> Option<Sticky> {
        self.sticky
    }

    /// Whether this is an action column.
    #[must_use]
    pub const fn is_action(&self) -> bool {
        self.is_action
    }

    /// Whether the table sorts on this column itself.
    #[must_use]
    pub const fn client_side_sort(&self) -> bool {
        self.client_side_sort
    }

    /// Server-side sort key.
    #[must_use]
    pub fn server_side_sort_key(&self) -> Option<&str> {
        self.server_side_sort_key.as_deref()
    }

    /// Whether the column can be hidden.
    #[must_use]
    pub const fn is_hideable(&self) -> bool {
        self.can_hide
    }

    /// Whether the column starts visible.
    #[must_use]
    pub const fn init_visible(&self) -> bool {
        self.init_visible
    }

    /// Columns revealed by expanding this one.
    #[must_use]
    pub fn expand_column_list(&self) -> &[Self] {
        &self.expand_columns
    }

    /// Whether a renderer exists for `kind`.
    #[must_use]
    pub fn renders(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind) || self.default_renderer.is_some()
    }

    /// Render the cell for a row; kinds without a renderer get an empty cell.
    pub fn cell(&self, data: &D, ctx: &CellContext<'_>) -> Cell {
        self.renderers
            .get(ctx.kind)
            .or(self.default_renderer.as_ref())
            .map_or_else(Cell::empty, |render| render(data, ctx))
    }

    /// Width inputs for the layout engine.
    #[must_use]
    pub fn to_sizing(&self) -> ColumnSizing {
        ColumnSizing {
            id: self.id.clone(),
            w: self.w.clone(),
            expanded_width: self.expanded_width.clone(),
            mw: self.mw.clone(),
            is_action: self.is_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        name: &'static str,
        qty: i32,
    }

    fn item() -> Item {
        Item {
            name: "Widget",
            qty: 3,
        }
    }

    // =========================================================================
    // CellValue Tests
    // =========================================================================

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Text("hi".to_string()).display(), "hi");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
        assert_eq!(CellValue::Bool(true).display(), "Yes");
        assert_eq!(CellValue::Bool(false).display(), "No");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_cell_value_from() {
        assert_eq!(CellValue::from("a"), CellValue::Text("a".to_string()));
        assert_eq!(CellValue::from(4), CellValue::Number(4.0));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert!(CellValue::Empty.is_empty());
    }

    #[test]
    fn test_cell_sort_key_prefers_sort_value() {
        let cell = Cell::new("March").sort_by(3);
        assert_eq!(cell.sort_key(), &CellValue::Number(3.0));
        assert_eq!(cell.display(), "March");
        assert_eq!(Cell::new("a").sort_key(), &CellValue::Text("a".to_string()));
    }

    // =========================================================================
    // Column Tests
    // =========================================================================

    #[test]
    fn test_column_defaults() {
        let col: Column<Item> = Column::new("name");
        assert_eq!(col.id(), "name");
        assert!(col.client_side_sort());
        assert!(col.init_visible());
        assert!(!col.is_hideable());
        assert!(!col.is_action());
        assert_eq!(col.text_align(), TextAlign::Left);
    }

    #[test]
    fn test_column_renders_by_kind() {
        let col = Column::new("name").render("item", |d: &Item, _| Cell::new(d.name));
        let ctx = CellContext::new("i1", "item");
        assert_eq!(col.cell(&item(), &ctx).display(), "Widget");

        let other = CellContext::new("g1", "group");
        assert_eq!(col.cell(&item(), &other), Cell::empty());
        assert!(col.renders("item"));
        assert!(!col.renders("group"));
    }

    #[test]
    fn test_default_renderer_covers_unknown_kinds() {
        let col = Column::with_default("qty", |d: &Item, _| Cell::new(d.qty))
            .render("total", |_, _| Cell::new("-"));
        let any = CellContext::new("x", "invented-kind");
        assert_eq!(col.cell(&item(), &any).value, CellValue::Number(3.0));
        let total = CellContext::new("t", "total");
        assert_eq!(col.cell(&item(), &total).display(), "-");
        assert!(col.renders("anything"));
    }

    #[test]
    fn test_select_column_reflects_selection() {
        let col: Column<Item> = Column::select();
        assert_eq!(col.id(), SELECT_COLUMN);
        assert!(col.is_action());
        assert!(!col.client_side_sort());
        let mut ctx = CellContext::new("a", "anything");
        assert_eq!(col.cell(&item(), &ctx).display(), "unchecked");
        ctx.selected = SelectedState::Partial;
        assert_eq!(col.cell(&item(), &ctx).display(), "partial");
        ctx.selected = SelectedState::Checked;
        assert_eq!(col.cell(&item(), &ctx).display(), "checked");
    }

    #[test]
    fn test_collapse_column_only_for_parents() {
        let col: Column<Item> = Column::collapse();
        let mut ctx = CellContext::new("a", "group");
        assert!(col.cell(&item(), &ctx).value.is_empty());
        ctx.has_children = true;
        assert_eq!(col.cell(&item(), &ctx).value, CellValue::Bool(true));
        ctx.collapsed = true;
        assert_eq!(col.cell(&item(), &ctx).value, CellValue::Bool(false));
    }

    #[test]
    fn test_drag_handle_only_for_draggable() {
        let col: Column<Item> = Column::drag_handle();
        let mut ctx = CellContext::new("a", "item");
        assert!(col.cell(&item(), &ctx).value.is_empty());
        ctx.draggable = true;
        assert!(!col.cell(&item(), &ctx).value.is_empty());
    }

    #[test]
    fn test_server_side_sort_disables_client_sort() {
        let col: Column<Item> = Column::new("created").server_side_sort("created_at");
        assert!(!col.client_side_sort());
        assert_eq!(col.server_side_sort_key(), Some("created_at"));
    }

    #[test]
    fn test_to_sizing() {
        let col: Column<Item> = Column::new("a").w("100px").mw("40px").expanded_width(2);
        let sizing = col.to_sizing();
        assert_eq!(sizing.id, "a");
        assert_eq!(sizing.w, Some(DeclaredWidth::Text("100px".to_string())));
        assert_eq!(sizing.expanded_width, Some(DeclaredWidth::Number(2.0)));
        assert_eq!(sizing.mw.as_deref(), Some("40px"));
    }

    #[test]
    fn test_clone_shares_renderers() {
        let col = Column::new("name").render("item", |d: &Item, _| Cell::new(d.name));
        let cloned = col.clone();
        let ctx = CellContext::new("i", "item");
        assert_eq!(cloned.cell(&item(), &ctx).display(), "Widget");
    }

    #[test]
    fn test_debug_lists_kinds() {
        let col = Column::new("name")
            .render("b", |_: &Item, _| Cell::empty())
            .render("a", |_: &Item, _| Cell::empty());
        let debug = format!("{col:?}");
        assert!(debug.contains("[\"a\", \"b\"]"));
    }
}
