//! Table state facade.
//!
//! [`TableState`] composes the row-state arena, the column model, sorting,
//! search, column visibility and widths into the one object a renderer reads.
//! Reads are pure recomputations over the current inputs; every mutator bumps
//! [`TableState::version`] and notifies subscribers, so a renderer can
//! memoize reads by version and drop them on notification.

use crate::column::{CellContext, Column};
use crate::config::TableConfig;
use crate::error::{TableError, TableResult};
use crate::nested_cards::{ChromeRow, NestedCards};
use crate::search::{is_filter_exempt, SearchFilter};
use crate::sort::{derive_sort_state, sort_siblings, SortSpec, SortState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use treegrid_core::{
    is_reserved_kind, load_json, save_json, Row, RowState, RowStates, SelectedState, StateStore,
    Subscribers, SubscriptionId,
};
use treegrid_layout::{
    calc_column_sizes, calculate_preview_width, handle_column_resize, ColumnSize, ResizeColumn,
};

/// What a mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEvent {
    Rows,
    Columns,
    Selection,
    Collapse,
    Sort,
    Search,
    Width,
    Resize,
    DragOver,
}

/// Column visibility, expansion and locked widths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnState {
    /// Visible hideable columns; `None` means each column's `init_visible`
    pub visible: Option<Vec<String>>,
    /// Expanded column ids
    pub expanded: Vec<String>,
    /// Widths locked by manual resizing, in px
    pub resized_widths: BTreeMap<String, f64>,
}

/// One row as the renderer sees it.
#[derive(Debug)]
pub struct VisibleRow<D> {
    /// Row id
    pub id: String,
    /// Row kind
    pub kind: String,
    /// Identity of the underlying row state
    pub serial: u64,
    /// Caller row, without children; `None` for synthetic rows
    pub row: Option<Arc<Row<D>>>,
    /// Nesting depth
    pub depth: usize,
    /// Selection state
    pub selected: SelectedState,
    /// Whether the row is collapsed
    pub collapsed: bool,
    /// Whether the row has live children
    pub has_children: bool,
    /// Whether the row is a kept (selected but removed) row
    pub kept: bool,
    /// Whether a dragged row hovers over this one
    pub is_dragged_over: bool,
}

impl<D> Clone for VisibleRow<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            serial: self.serial,
            row: self.row.clone(),
            depth: self.depth,
            selected: self.selected,
            collapsed: self.collapsed,
            has_children: self.has_children,
            kept: self.kept,
            is_dragged_over: self.is_dragged_over,
        }
    }
}

impl<D> VisibleRow<D> {
    /// Whether this is the header or kept-group row.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved_kind(&self.kind)
    }
}

/// A renderable row: content or coalesced card chrome.
#[derive(Debug)]
pub enum RenderRow<D> {
    Chrome(ChromeRow),
    Row(VisibleRow<D>),
}

impl<D> RenderRow<D> {
    /// The content row, if this is one.
    #[must_use]
    pub const fn as_row(&self) -> Option<&VisibleRow<D>> {
        match self {
            Self::Row(row) => Some(row),
            Self::Chrome(_) => None,
        }
    }
}

/// Sort keys resolved against the columns they index.
struct SortOrder<'a, D> {
    columns: &'a [Column<D>],
    spec: &'a SortSpec,
}

/// State of one hierarchical table.
pub struct TableState<D> {
    config: TableConfig,
    rows: RowStates<D>,
    columns: Vec<Column<D>>,
    column_state: ColumnState,
    sort: SortState,
    search_text: String,
    search: SearchFilter,
    table_width: Option<f64>,
    store: Option<Box<dyn StateStore + Send>>,
    version: u64,
    subscribers: Subscribers<TableEvent>,
}

impl<D> fmt::Debug for TableState<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns.len())
            .field("column_state", &self.column_state)
            .field("sort", &self.sort)
            .field("search", &self.search_text)
            .field("table_width", &self.table_width)
            .field("has_store", &self.store.is_some())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<D> Default for TableState<D> {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl<D> TableState<D> {
    /// Create a table without persistence.
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        Self {
            sort: config.initial_sort.clone(),
            config,
            rows: RowStates::new(),
            columns: Vec::new(),
            column_state: ColumnState::default(),
            search_text: String::new(),
            search: SearchFilter::default(),
            table_width: None,
            store: None,
            version: 0,
            subscribers: Subscribers::new(),
        }
    }

    /// Create a table that restores and saves state through `store`.
    #[must_use]
    pub fn with_store(config: TableConfig, store: Box<dyn StateStore + Send>) -> Self {
        let mut state = Self::new(config);
        if let Some(key) = state.config.collapse_key() {
            if let Some(ids) = load_json::<Vec<String>>(store.as_ref(), &key) {
                log::debug!("restored {} collapsed ids from {key}", ids.len());
                state.rows.attach_persisted_collapse(ids);
            }
        }
        if let Some(key) = state.config.columns_key() {
            if let Some(columns) = load_json::<ColumnState>(store.as_ref(), &key) {
                log::debug!("restored column state from {key}");
                state.column_state = columns;
            }
        }
        state.store = Some(store);
        state
    }

    fn changed(&mut self, event: TableEvent) {
        self.version += 1;
        self.subscribers.notify(&event);
    }

    fn persist_collapse(&mut self) -> TableResult<()> {
        let (Some(key), Some(store)) = (self.config.collapse_key(), self.store.as_mut()) else {
            return Ok(());
        };
        save_json(store.as_mut(), &key, &self.rows.collapsed_ids())?;
        Ok(())
    }

    fn persist_columns(&mut self) -> TableResult<()> {
        let (Some(key), Some(store)) = (self.config.columns_key(), self.store.as_mut()) else {
            return Ok(());
        };
        save_json(store.as_mut(), &key, &self.column_state)?;
        Ok(())
    }

    fn find_column(&self, id: &str) -> Option<&Column<D>> {
        self.columns.iter().find_map(|column| {
            if column.id() == id {
                Some(column)
            } else {
                column.expand_column_list().iter().find(|c| c.id() == id)
            }
        })
    }

    /// Every column a sort key can name: top-level columns, then each
    /// column's expansion columns.
    fn sortable_columns(&self) -> Vec<Column<D>> {
        self.columns
            .iter()
            .cloned()
            .chain(
                self.columns
                    .iter()
                    .flat_map(|column| column.expand_column_list().iter().cloned()),
            )
            .collect()
    }

    fn require_column(&self, id: &str) -> TableResult<()> {
        self.find_column(id)
            .map(|_| ())
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Replace the row tree.
    pub fn set_rows(&mut self, rows: Vec<Row<D>>) -> TableResult<()> {
        self.rows.set_rows(rows)?;
        self.changed(TableEvent::Rows);
        Ok(())
    }

    /// Replace the column model.
    pub fn set_columns(&mut self, columns: Vec<Column<D>>) {
        log::debug!("set {} columns", columns.len());
        self.columns = columns;
        self.changed(TableEvent::Columns);
    }

    /// Select or deselect a row.
    pub fn select_row(&mut self, id: &str, selected: bool) {
        self.rows.select(id, selected);
        self.changed(TableEvent::Selection);
    }

    /// Toggle a row's collapse; `"header"` collapses or expands everything.
    pub fn toggle_collapsed(&mut self, id: &str) -> TableResult<()> {
        self.rows.toggle_collapsed(id);
        self.persist_collapse()?;
        self.changed(TableEvent::Collapse);
        Ok(())
    }

    /// Advance the sort state as if `column_id`'s header was clicked.
    pub fn set_sort_key(&mut self, column_id: &str) -> TableResult<()> {
        self.require_column(column_id)?;
        self.sort = derive_sort_state(&self.sort, column_id, &self.config.initial_sort);
        log::debug!("sort state now {:?}", self.sort);
        self.changed(TableEvent::Sort);
        Ok(())
    }

    /// Replace the sort state.
    pub fn set_sort_state(&mut self, sort: SortState) {
        self.sort = sort;
        self.changed(TableEvent::Sort);
    }

    /// Set the free-text filter.
    pub fn set_search(&mut self, filter: &str) {
        filter.clone_into(&mut self.search_text);
        self.search = SearchFilter::parse(filter);
        self.changed(TableEvent::Search);
    }

    /// Show exactly these hideable columns.
    pub fn set_visible_columns<S: AsRef<str>>(&mut self, ids: &[S]) -> TableResult<()> {
        for id in ids {
            self.require_column(id.as_ref())?;
        }
        self.column_state.visible = Some(ids.iter().map(|id| id.as_ref().to_string()).collect());
        self.persist_columns()?;
        self.changed(TableEvent::Columns);
        Ok(())
    }

    /// Expand or unexpand a column.
    pub fn toggle_expanded_column(&mut self, id: &str) -> TableResult<()> {
        self.require_column(id)?;
        let expanded = &mut self.column_state.expanded;
        if let Some(pos) = expanded.iter().position(|e| e == id) {
            expanded.remove(pos);
        } else {
            expanded.push(id.to_string());
        }
        self.persist_columns()?;
        self.changed(TableEvent::Columns);
        Ok(())
    }

    /// Set the measured table width in px.
    pub fn set_table_width(&mut self, px: f64) {
        self.table_width = Some(px);
        self.changed(TableEvent::Width);
    }

    /// Resize visible column `id` (at `index`) toward `px`.
    ///
    /// The first resize locks every visible column to its current pixel
    /// width. Returns the column's final width, or `None` while widths are
    /// not yet resolvable to pixels.
    pub fn handle_column_resize(&mut self, id: &str, px: f64, index: usize) -> TableResult<Option<f64>> {
        let Some((columns, index)) = self.resize_columns(id, index)? else {
            return Ok(None);
        };
        let Some(outcome) = handle_column_resize(&columns, index, px) else {
            return Ok(None);
        };
        if self.column_state.resized_widths.is_empty() {
            log::debug!("locking {} columns to pixel widths", outcome.widths.len());
        }
        self.column_state
            .resized_widths
            .extend(outcome.widths.iter().cloned());
        log::debug!(
            "resized {id} to {}px ({}px unapplied)",
            outcome.width,
            outcome.unapplied
        );
        self.persist_columns()?;
        self.changed(TableEvent::Resize);
        Ok(Some(outcome.width))
    }

    /// Width column `id` would get from resizing to `px`, without applying it.
    pub fn calculate_preview_width(&self, id: &str, px: f64, index: usize) -> TableResult<Option<f64>> {
        Ok(self
            .resize_columns(id, index)?
            .and_then(|(columns, index)| calculate_preview_width(&columns, index, px)))
    }

    fn resize_columns(&self, id: &str, index: usize) -> TableResult<Option<(Vec<ResizeColumn>, usize)>> {
        let visible = self.visible_columns();
        let index = if visible.get(index).is_some_and(|c| c.id() == id) {
            index
        } else {
            visible
                .iter()
                .position(|c| c.id() == id)
                .ok_or_else(|| TableError::UnknownColumn(id.to_string()))?
        };
        let sizes = self.column_sizes()?;
        let mut columns = Vec::with_capacity(visible.len());
        for (column, (_, size)) in visible.iter().zip(&sizes) {
            let Some(width) = size.px() else {
                return Ok(None);
            };
            let sizing = column.to_sizing();
            columns.push(ResizeColumn {
                min_width: sizing.min_px()?,
                id: sizing.id,
                width,
                is_action: sizing.is_action,
            });
        }
        Ok(Some((columns, index)))
    }

    /// Hard-delete rows so they never show up as kept.
    pub fn delete_rows<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.rows.delete_rows(ids);
        self.changed(TableEvent::Rows);
    }

    /// Mark a row as the current drop target.
    pub fn set_dragged_over(&mut self, id: &str, dragged_over: bool) {
        self.rows.set_dragged_over(id, dragged_over);
        self.changed(TableEvent::DragOver);
    }

    /// Register a change callback.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&TableEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Remove a change callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    fn is_column_visible(&self, column: &Column<D>) -> bool {
        if !column.is_hideable() {
            return true;
        }
        self.column_state
            .visible
            .as_ref()
            .map_or(column.init_visible(), |ids| ids.iter().any(|id| id == column.id()))
    }

    /// Columns in display order, expansion columns after their parent.
    #[must_use]
    pub fn visible_columns(&self) -> Vec<&Column<D>> {
        let mut out = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if !self.is_column_visible(column) {
                continue;
            }
            out.push(column);
            if self.column_state.expanded.iter().any(|id| id == column.id()) {
                out.extend(column.expand_column_list());
            }
        }
        out
    }

    /// Ids of [`TableState::visible_columns`].
    #[must_use]
    pub fn visible_column_ids(&self) -> Vec<String> {
        self.visible_columns()
            .iter()
            .map(|c| c.id().to_string())
            .collect()
    }

    /// Resolved width of every visible column.
    pub fn column_sizes(&self) -> TableResult<Vec<(String, ColumnSize)>> {
        let visible = self.visible_columns();
        let sizings: Vec<_> = visible.iter().map(|c| c.to_sizing()).collect();
        let sizes = calc_column_sizes(
            &sizings,
            self.table_width,
            self.config.table_min_width,
            &self.column_state.expanded,
            &self.column_state.resized_widths,
        )?;
        Ok(sizings.into_iter().map(|s| s.id).zip(sizes).collect())
    }

    /// Column visibility, expansion and locked widths.
    #[must_use]
    pub const fn column_state(&self) -> &ColumnState {
        &self.column_state
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    fn context<'a>(&self, state: &'a RowState<D>, depth: usize) -> CellContext<'a> {
        CellContext {
            depth,
            selected: state.selected(),
            collapsed: state.is_collapsed(),
            has_children: !state.children().is_empty(),
            draggable: state.row().is_some_and(|row| row.draggable),
            ..CellContext::new(state.id(), state.kind())
        }
    }

    fn entry(&self, state: &RowState<D>, depth: usize, has_children: bool) -> VisibleRow<D> {
        VisibleRow {
            id: state.id().to_string(),
            kind: state.kind().to_string(),
            serial: state.serial(),
            row: state.row().cloned(),
            depth,
            selected: state.selected(),
            collapsed: state.is_collapsed(),
            has_children,
            kept: state.is_kept(),
            is_dragged_over: state.is_dragged_over(),
        }
    }

    fn top_level_states(&self) -> Vec<&RowState<D>> {
        self.rows
            .top_level()
            .iter()
            .filter_map(|id| self.rows.get(id))
            .filter(|state| !state.removed().is_removed())
            .collect()
    }

    /// Rows in display order.
    ///
    /// The header comes first, then the kept group and its rows when any
    /// rows are kept, then the sorted and filtered tree with collapsed
    /// subtrees skipped.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<VisibleRow<D>> {
        let mut out = Vec::with_capacity(self.rows.len() + 2);
        let header = self.rows.header();
        out.push(self.entry(header, 0, !self.rows.top_level().is_empty()));

        let kept = self.rows.kept_ids();
        if !kept.is_empty() {
            let group = self.rows.kept_group();
            out.push(self.entry(group, 0, true));
            if !group.is_collapsed() {
                out.extend(
                    kept.iter()
                        .filter_map(|id| self.rows.get(id))
                        .map(|state| self.entry(state, 1, false)),
                );
            }
        }

        let shown = if self.search.is_empty() {
            None
        } else {
            Some(self.search_matches())
        };
        let columns = self.sortable_columns();
        let spec = SortSpec::from_state(&self.sort, &columns);
        let order = SortOrder {
            columns: &columns,
            spec: &spec,
        };
        self.collect_visible(self.top_level_states(), 0, &order, shown.as_ref(), &mut out);
        out
    }

    fn collect_visible(
        &self,
        siblings: Vec<&RowState<D>>,
        depth: usize,
        order: &SortOrder<'_, D>,
        shown: Option<&HashSet<String>>,
        out: &mut Vec<VisibleRow<D>>,
    ) {
        let ordered = sort_siblings(
            order.columns,
            siblings,
            order.spec,
            self.config.case_sensitive,
            depth,
        );
        for state in ordered {
            if shown.is_some_and(|shown| !shown.contains(state.id())) {
                continue;
            }
            let children: Vec<&RowState<D>> = self.rows.live_children(state.id()).collect();
            out.push(self.entry(state, depth, !children.is_empty()));
            if !state.is_collapsed() {
                self.collect_visible(children, depth + 1, order, shown, out);
            }
        }
    }

    /// Ids of rows that survive the search filter.
    fn search_matches(&self) -> HashSet<String> {
        let columns: Vec<&Column<D>> = self
            .visible_columns()
            .into_iter()
            .filter(|c| !c.is_action())
            .collect();
        let mut shown = HashSet::new();
        for state in self.top_level_states() {
            self.mark_matches(state, 0, false, &columns, &mut shown);
        }
        shown
    }

    fn mark_matches(
        &self,
        state: &RowState<D>,
        depth: usize,
        covered: bool,
        columns: &[&Column<D>],
        shown: &mut HashSet<String>,
    ) -> bool {
        let own = state.row().is_some_and(|row| {
            is_filter_exempt(row)
                || self
                    .search
                    .matches_row(columns, &row.data, &self.context(state, depth))
        });
        let covered = covered || own;
        let mut descendant = false;
        for child in self.rows.live_children(state.id()) {
            descendant |= self.mark_matches(child, depth + 1, covered, columns, shown);
        }
        let show = covered || descendant;
        if show {
            shown.insert(state.id().to_string());
        }
        show
    }

    /// Visible rows interleaved with nested-card chrome.
    ///
    /// Without a nested-card style this is [`TableState::visible_rows`]
    /// wrapped as content rows.
    pub fn render_rows(&self) -> TableResult<Vec<RenderRow<D>>> {
        let rows = self.visible_rows();
        let Some(style) = &self.config.nested_cards else {
            return Ok(rows.into_iter().map(RenderRow::Row).collect());
        };

        let depths: Vec<usize> = rows.iter().map(|row| row.depth).collect();
        let mut cards = NestedCards::new(style.clone());
        let mut open_depths: Vec<usize> = Vec::new();
        let mut prev_depth: Option<usize> = None;
        let mut out = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            if row.kept || row.is_reserved() {
                out.push(RenderRow::Row(row));
                continue;
            }
            while open_depths.last().is_some_and(|open| *open >= row.depth) {
                cards.end_row()?;
                open_depths.pop();
            }
            if prev_depth.is_some_and(|prev| prev >= row.depth) {
                cards.between_children()?;
            }
            let opens = depths.get(i + 1).is_some_and(|next| *next > row.depth);
            if cards.begin_row(&row.kind, opens)? {
                open_depths.push(row.depth);
            }
            if let Some(chrome) = cards.take_chrome_row() {
                out.push(RenderRow::Chrome(chrome));
            }
            prev_depth = Some(row.depth);
            out.push(RenderRow::Row(row));
        }

        cards.finish()?;
        if let Some(chrome) = cards.take_chrome_row() {
            out.push(RenderRow::Chrome(chrome));
        }
        Ok(out)
    }

    /// Checked rows: live rows in tree order, then kept rows.
    #[must_use]
    pub fn selected_rows(&self) -> Vec<Arc<Row<D>>> {
        self.rows.selected_rows()
    }

    /// Ids of [`TableState::selected_rows`].
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        self.rows.selected_ids()
    }

    /// Rows that are selected but no longer in the tree.
    #[must_use]
    pub fn kept_rows(&self) -> Vec<Arc<Row<D>>> {
        self.rows.kept_rows()
    }

    /// Collapsed ids, `"header"` first when everything is collapsed.
    #[must_use]
    pub fn collapsed_ids(&self) -> Vec<String> {
        self.rows.collapsed_ids()
    }

    /// Selection of a row; unknown ids read as unchecked.
    #[must_use]
    pub fn get_selected(&self, id: &str) -> SelectedState {
        self.rows.selected_state(id)
    }

    /// Collapse of a row; unknown ids read as expanded.
    #[must_use]
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.rows.is_collapsed(id)
    }

    /// Current sort state.
    #[must_use]
    pub const fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search_text
    }

    /// Measured table width.
    #[must_use]
    pub const fn table_width(&self) -> Option<f64> {
        self.table_width
    }

    /// Incremented by every mutation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The underlying row-state arena.
    #[must_use]
    pub const fn row_states(&self) -> &RowStates<D> {
        &self.rows
    }

    /// The persistence store, if any.
    #[must_use]
    pub fn store(&self) -> Option<&dyn StateStore> {
        self.store.as_deref().map(|store| store as &dyn StateStore)
    }
}
