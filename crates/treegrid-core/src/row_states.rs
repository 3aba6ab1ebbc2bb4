//! Row-state arena and reconciliation.
//!
//! [`RowStates`] owns one [`RowState`] per row id ever seen. Every call to
//! [`RowStates::set_rows`] diffs the incoming tree against the arena by id:
//! existing states are rebound in place, so their selection, collapse and
//! serial survive row-list churn, and states whose ids vanished are marked
//! soft-removed. Selected soft-removed states are "kept" and surface under
//! the synthetic kept group.
//!
//! # Example
//!
//! ```
//! use treegrid_core::{Row, RowStates, SelectedState};
//!
//! let mut states = RowStates::new();
//! states
//!     .set_rows(vec![Row::new("parent", "p", ())
//!         .child(Row::new("child", "c1", ()))
//!         .child(Row::new("child", "c2", ()))])
//!     .unwrap();
//!
//! states.select("c1", true);
//! assert_eq!(states.selected_state("p"), SelectedState::Partial);
//! states.select("c2", true);
//! assert_eq!(states.selected_state("p"), SelectedState::Checked);
//! ```

use crate::error::{CoreError, CoreResult};
use crate::row::{is_reserved_kind, Row, HEADER, KEPT_GROUP};
use crate::row_state::{Removed, RowState, SelectedState};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Owner of the row-state tree.
#[derive(Debug)]
pub struct RowStates<D> {
    header: RowState<D>,
    kept_group: RowState<D>,
    states: HashMap<String, RowState<D>>,
    top_level: Vec<String>,
    next_serial: u64,
    /// Persisted collapsed ids, consulted until the first real rows arrive.
    persisted_collapse: Option<Vec<String>>,
}

impl<D> Default for RowStates<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> RowStates<D> {
    /// Create an empty arena holding only the synthetic rows.
    #[must_use]
    pub fn new() -> Self {
        let mut header = RowState::synthetic(HEADER, 0, false);
        header.children = vec![KEPT_GROUP.to_string()];
        let mut kept_group = RowState::synthetic(KEPT_GROUP, 1, true);
        kept_group.parent = Some(HEADER.to_string());
        Self {
            header,
            kept_group,
            states: HashMap::new(),
            top_level: Vec::new(),
            next_serial: 2,
            persisted_collapse: None,
        }
    }

    /// Create an arena seeded with persisted collapsed ids.
    #[must_use]
    pub fn with_persisted_collapse(ids: Vec<String>) -> Self {
        let mut states = Self::new();
        states.attach_persisted_collapse(ids);
        states
    }

    /// Seed collapse state from a persisted list of collapsed ids.
    ///
    /// The list decides the initial collapse of rows created by the next
    /// `set_rows` that contains real rows, after which it is dropped and
    /// each row's own `init_collapsed` applies.
    pub fn attach_persisted_collapse(&mut self, ids: Vec<String>) {
        self.header.collapsed = ids.iter().any(|id| id == HEADER);
        for state in self.states.values_mut() {
            state.collapsed = ids.contains(&state.id);
        }
        self.persisted_collapse = Some(ids);
    }

    /// Whether a persisted collapse list is still attached.
    #[must_use]
    pub const fn has_persisted_collapse(&self) -> bool {
        self.persisted_collapse.is_some()
    }

    fn bump_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Reconcile the arena against a new row tree.
    ///
    /// Fails without touching any state if an id repeats within the tree or
    /// collides with a synthetic row.
    pub fn set_rows(&mut self, rows: Vec<Row<D>>) -> CoreResult<()> {
        check_unique_ids(&rows)?;

        let mut touched = HashSet::new();
        let mut top_level = Vec::with_capacity(rows.len());
        for row in rows {
            top_level.push(self.adopt(row, HEADER, &mut touched));
        }

        let mut newly_removed = 0usize;
        for state in self.states.values_mut() {
            if !touched.contains(&state.id) && state.removed == Removed::No {
                state.removed = Removed::Soft;
                newly_removed += 1;
            }
        }

        self.header.children = std::iter::once(KEPT_GROUP.to_string())
            .chain(top_level.iter().cloned())
            .collect();
        self.top_level = top_level;

        if self.persisted_collapse.is_some() && !touched.is_empty() {
            self.persisted_collapse = None;
        }

        self.rederive_selection();
        log::debug!(
            "reconciled {} rows, {} newly removed, {} kept",
            touched.len(),
            newly_removed,
            self.kept_ids().len()
        );
        Ok(())
    }

    fn adopt(&mut self, row: Row<D>, parent: &str, touched: &mut HashSet<String>) -> String {
        let (node, children) = row.split_children();
        let id = node.id.clone();

        if let Some(state) = self.states.get_mut(&id) {
            state.kind.clone_from(&node.kind);
            state.row = Some(Arc::new(node));
            state.parent = Some(parent.to_string());
            state.removed = Removed::No;
        } else {
            let collapsed = match &self.persisted_collapse {
                Some(ids) => ids.contains(&id),
                None => node.init_collapsed,
            };
            let serial = self.bump_serial();
            let mut state = RowState::for_row(node, serial, collapsed);
            state.parent = Some(parent.to_string());
            self.states.insert(id.clone(), state);
        }
        touched.insert(id.clone());

        let child_ids: Vec<String> = children
            .into_iter()
            .map(|child| self.adopt(child, &id, touched))
            .collect();
        if let Some(state) = self.states.get_mut(&id) {
            state.children = child_ids;
        }
        id
    }

    /// Hard-remove rows so they are never kept.
    pub fn delete_rows<S: AsRef<str>>(&mut self, ids: &[S]) {
        let mut deleted = 0usize;
        for id in ids {
            if let Some(state) = self.states.get_mut(id.as_ref()) {
                state.removed = Removed::Hard;
                state.selected = SelectedState::Unchecked;
                deleted += 1;
            }
        }
        if deleted > 0 {
            self.rederive_selection();
        }
        log::debug!("hard-deleted {deleted} rows");
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Look up a state by id, including the synthetic rows.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RowState<D>> {
        match id {
            HEADER => Some(&self.header),
            KEPT_GROUP => Some(&self.kept_group),
            _ => self.states.get(id),
        }
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut RowState<D>> {
        match id {
            HEADER => Some(&mut self.header),
            KEPT_GROUP => Some(&mut self.kept_group),
            _ => self.states.get_mut(id),
        }
    }

    /// The synthetic header row.
    #[must_use]
    pub const fn header(&self) -> &RowState<D> {
        &self.header
    }

    /// The synthetic kept group row.
    #[must_use]
    pub const fn kept_group(&self) -> &RowState<D> {
        &self.kept_group
    }

    /// Ids of the current top-level rows, in row order.
    #[must_use]
    pub fn top_level(&self) -> &[String] {
        &self.top_level
    }

    /// Number of non-synthetic states in the arena (live or removed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the arena holds no rows besides the synthetic ones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Children of `id` that still point back at it and are not deleted.
    pub fn live_children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a RowState<D>> + 'a {
        self.get(id)
            .map(|state| state.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.states.get(child))
            .filter(move |child| child.parent.as_deref() == Some(id) && child.removed == Removed::No)
    }

    /// Ids of every live row in depth-first tree order.
    #[must_use]
    pub fn live_ids(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.states.len());
        let mut stack: Vec<&str> = self.top_level.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            let Some(state) = self.states.get(id) else {
                continue;
            };
            if state.removed != Removed::No {
                continue;
            }
            out.push(state.id.clone());
            stack.extend(state.children.iter().rev().map(String::as_str));
        }
        out
    }

    /// Selection for `id`; unseen ids read as unchecked.
    #[must_use]
    pub fn selected_state(&self, id: &str) -> SelectedState {
        self.get(id).map_or(SelectedState::Unchecked, RowState::selected)
    }

    /// Collapse for `id`; unseen ids read as expanded.
    #[must_use]
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.get(id).is_some_and(RowState::is_collapsed)
    }

    /// Ids of kept rows, oldest first.
    #[must_use]
    pub fn kept_ids(&self) -> Vec<String> {
        let mut kept: Vec<&RowState<D>> = self.states.values().filter(|s| s.is_kept()).collect();
        kept.sort_by_key(|s| s.serial);
        kept.into_iter().map(|s| s.id.clone()).collect()
    }

    /// Rows that are selected but no longer in the tree.
    #[must_use]
    pub fn kept_rows(&self) -> Vec<Arc<Row<D>>> {
        self.kept_ids()
            .iter()
            .filter_map(|id| self.states.get(id).and_then(|s| s.row.clone()))
            .collect()
    }

    /// Ids of checked rows: live rows in tree order, then kept rows.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .live_ids()
            .into_iter()
            .filter(|id| {
                self.states
                    .get(id)
                    .is_some_and(|s| !is_reserved_kind(&s.kind) && s.selected.is_checked())
            })
            .collect();
        ids.extend(self.kept_ids());
        ids
    }

    /// Checked rows: live rows in tree order, then kept rows.
    #[must_use]
    pub fn selected_rows(&self) -> Vec<Arc<Row<D>>> {
        self.selected_ids()
            .iter()
            .filter_map(|id| self.states.get(id).and_then(|s| s.row.clone()))
            .collect()
    }

    /// Collapsed ids in tree order, `"header"` first when all are collapsed.
    #[must_use]
    pub fn collapsed_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if self.header.collapsed {
            ids.push(HEADER.to_string());
        }
        ids.extend(
            self.live_ids()
                .into_iter()
                .filter(|id| self.states.get(id).is_some_and(|s| s.collapsed)),
        );
        ids
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Select or deselect a row and propagate through the tree.
    pub fn select(&mut self, id: &str, selected: bool) {
        match id {
            HEADER => self.select_all(selected),
            KEPT_GROUP => self.select_kept(selected),
            _ => self.select_row(id, selected),
        }
    }

    fn select_all(&mut self, selected: bool) {
        if selected {
            for id in self.live_ids() {
                if let Some(state) = self.states.get_mut(&id) {
                    if state.is_selectable() {
                        state.selected = SelectedState::Checked;
                    }
                }
            }
            self.header.selected = SelectedState::Checked;
        } else {
            for state in self.states.values_mut() {
                state.selected = SelectedState::Unchecked;
            }
            self.header.selected = SelectedState::Unchecked;
            self.kept_group.selected = SelectedState::Unchecked;
        }
    }

    fn select_kept(&mut self, selected: bool) {
        if selected {
            return;
        }
        for id in self.kept_ids() {
            if let Some(state) = self.states.get_mut(&id) {
                state.selected = SelectedState::Unchecked;
            }
        }
        self.rederive_header();
    }

    fn select_row(&mut self, id: &str, selected: bool) {
        let Some(state) = self.states.get(id) else {
            log::debug!("select ignored for unknown row {id}");
            return;
        };
        if !state.is_selectable() {
            return;
        }
        let removed = state.removed;
        let target = SelectedState::from_bool(selected);

        // Target and descendants take the same value.
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(state) = self.states.get_mut(&current) else {
                continue;
            };
            if state.is_selectable() {
                state.selected = target;
            }
            let children = state.children.clone();
            stack.extend(children.into_iter().filter(|child| {
                self.states
                    .get(child)
                    .is_some_and(|c| c.parent.as_deref() == Some(current.as_str()))
            }));
        }

        if removed == Removed::No {
            let mut parent = self.states.get(id).and_then(|s| s.parent.clone());
            while let Some(parent_id) = parent {
                if parent_id == HEADER {
                    break;
                }
                parent = self.rederive_one(&parent_id);
            }
        }
        self.rederive_header();
    }

    /// Re-derive one row from its children; returns its parent id.
    fn rederive_one(&mut self, id: &str) -> Option<String> {
        let derived = SelectedState::derive(
            self.live_children(id)
                .filter(|child| child.is_selectable())
                .map(RowState::selected),
        );
        let state = self.states.get_mut(id)?;
        if let Some(derived) = derived {
            if state.is_selectable() {
                state.selected = derived;
            }
        }
        state.parent.clone()
    }

    fn rederive_header(&mut self) {
        let derived = SelectedState::derive(
            self.top_level
                .iter()
                .filter_map(|id| self.states.get(id))
                .filter(|s| {
                    !is_reserved_kind(&s.kind) && s.is_selectable() && s.removed == Removed::No
                })
                .map(RowState::selected),
        );
        self.header.selected = derived.unwrap_or(SelectedState::Unchecked);
    }

    /// Re-derive every parent bottom-up, then the header.
    fn rederive_selection(&mut self) {
        let order = self.live_ids();
        for id in order.iter().rev() {
            let has_children = self.states.get(id).is_some_and(|s| !s.children.is_empty());
            if has_children {
                self.rederive_one(id);
            }
        }
        self.rederive_header();
    }

    // -------------------------------------------------------------------------
    // Collapse
    // -------------------------------------------------------------------------

    /// Toggle collapse of a row, or of everything when `id` is the header.
    pub fn toggle_collapsed(&mut self, id: &str) {
        match id {
            HEADER => self.toggle_all_collapsed(),
            KEPT_GROUP => self.kept_group.collapsed = !self.kept_group.collapsed,
            _ => {
                let Some(state) = self.states.get_mut(id) else {
                    log::debug!("collapse ignored for unknown row {id}");
                    return;
                };
                state.collapsed = !state.collapsed;
                self.reconcile_header_collapsed();
            }
        }
    }

    fn toggle_all_collapsed(&mut self) {
        if self.header.collapsed {
            self.header.collapsed = false;
            self.kept_group.collapsed = false;
            for state in self.states.values_mut() {
                state.collapsed = false;
            }
        } else {
            self.header.collapsed = true;
            for state in self.states.values_mut() {
                if !state.children.is_empty() {
                    state.collapsed = true;
                }
            }
            if !self.kept_ids().is_empty() {
                self.kept_group.collapsed = true;
            }
        }
    }

    fn reconcile_header_collapsed(&mut self) {
        let groups: Vec<bool> = self
            .top_level
            .iter()
            .filter_map(|id| self.states.get(id))
            .filter(|s| !is_reserved_kind(&s.kind) && !s.children.is_empty())
            .map(|s| s.collapsed)
            .collect();
        if groups.is_empty() {
            return;
        }
        if groups.iter().all(|collapsed| !collapsed) {
            self.header.collapsed = false;
        } else if groups.iter().all(|collapsed| *collapsed) {
            self.header.collapsed = true;
        }
    }

    // -------------------------------------------------------------------------
    // Drag
    // -------------------------------------------------------------------------

    /// Mark whether a drag currently hovers `id`.
    pub fn set_dragged_over(&mut self, id: &str, dragged_over: bool) {
        if let Some(state) = self.get_mut(id) {
            state.is_dragged_over = dragged_over;
        }
    }
}

fn check_unique_ids<D>(rows: &[Row<D>]) -> CoreResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicate: Option<String> = None;
    for row in rows {
        row.walk_ids(&mut |id| {
            if duplicate.is_none() && (is_reserved_kind(id) || !seen.insert(id)) {
                duplicate = Some(id.to_string());
            }
        });
    }
    match duplicate {
        Some(id) => Err(CoreError::DuplicateRowId(id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(id: &str) -> Row<()> {
        Row::new("data", id, ())
    }

    fn group(id: &str, children: Vec<Row<()>>) -> Row<()> {
        Row::new("group", id, ()).with_children(children)
    }

    fn two_groups() -> Vec<Row<()>> {
        vec![
            group("p1", vec![leaf("a"), leaf("b")]),
            group("p2", vec![leaf("c"), group("p3", vec![leaf("d"), leaf("e")])]),
        ]
    }

    fn loaded(rows: Vec<Row<()>>) -> RowStates<()> {
        let mut states = RowStates::new();
        states.set_rows(rows).unwrap();
        states
    }

    // =========================================================================
    // Reconciliation Tests
    // =========================================================================

    #[test]
    fn test_new_has_synthetic_rows() {
        let states: RowStates<()> = RowStates::new();
        assert_eq!(states.header().id(), HEADER);
        assert!(states.kept_group().is_collapsed());
        assert_eq!(states.header().children(), &[KEPT_GROUP.to_string()]);
        assert!(states.is_empty());
    }

    #[test]
    fn test_set_rows_builds_tree() {
        let states = loaded(two_groups());
        assert_eq!(states.len(), 8);
        assert_eq!(states.top_level(), &["p1".to_string(), "p2".to_string()]);
        assert_eq!(
            states.header().children(),
            &[KEPT_GROUP.to_string(), "p1".to_string(), "p2".to_string()]
        );
        assert_eq!(states.get("d").unwrap().parent(), Some("p3"));
        assert_eq!(states.get("p1").unwrap().parent(), Some(HEADER));
        assert_eq!(states.live_ids(), vec!["p1", "a", "b", "p2", "c", "p3", "d", "e"]);
    }

    #[test]
    fn test_set_rows_detaches_children_from_row() {
        let states = loaded(two_groups());
        let row = states.get("p1").unwrap().row().unwrap();
        assert!(row.children.is_empty());
        assert_eq!(states.get("p1").unwrap().children().len(), 2);
    }

    #[test]
    fn test_set_rows_preserves_identity() {
        let mut states = loaded(two_groups());
        let before: Vec<(String, u64)> = states
            .live_ids()
            .into_iter()
            .map(|id| {
                let serial = states.get(&id).unwrap().serial();
                (id, serial)
            })
            .collect();
        states.set_rows(two_groups()).unwrap();
        for (id, serial) in before {
            assert_eq!(states.get(&id).unwrap().serial(), serial, "{id}");
        }
    }

    #[test]
    fn test_set_rows_preserves_selection_and_collapse() {
        let mut states = loaded(two_groups());
        states.select("a", true);
        states.toggle_collapsed("p2");
        states.set_rows(two_groups()).unwrap();
        assert_eq!(states.selected_state("a"), SelectedState::Checked);
        assert!(states.is_collapsed("p2"));
    }

    #[test]
    fn test_set_rows_rebinds_moved_row() {
        let mut states = loaded(two_groups());
        let serial = states.get("a").unwrap().serial();
        states
            .set_rows(vec![group("p1", vec![leaf("b")]), group("p2", vec![leaf("a")])])
            .unwrap();
        let a = states.get("a").unwrap();
        assert_eq!(a.parent(), Some("p2"));
        assert_eq!(a.serial(), serial);
    }

    #[test]
    fn test_set_rows_duplicate_id_fails() {
        let mut states = loaded(two_groups());
        let err = states
            .set_rows(vec![group("x", vec![leaf("dup")]), leaf("dup")])
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRowId(id) if id == "dup"));
        // Untouched by the failed call
        assert_eq!(states.top_level(), &["p1".to_string(), "p2".to_string()]);
        assert!(states.get("x").is_none());
    }

    #[test]
    fn test_set_rows_reserved_id_fails() {
        let mut states: RowStates<()> = RowStates::new();
        assert!(states.set_rows(vec![leaf(HEADER)]).is_err());
        assert!(states.set_rows(vec![leaf(KEPT_GROUP)]).is_err());
    }

    #[test]
    fn test_missing_rows_become_soft_removed() {
        let mut states = loaded(two_groups());
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        assert_eq!(states.get("b").unwrap().removed(), Removed::Soft);
        assert_eq!(states.get("p3").unwrap().removed(), Removed::Soft);
        assert_eq!(states.get("a").unwrap().removed(), Removed::No);
    }

    #[test]
    fn test_removed_row_comes_back() {
        let mut states = loaded(two_groups());
        states.set_rows(vec![]).unwrap();
        assert_eq!(states.get("a").unwrap().removed(), Removed::Soft);
        states.set_rows(two_groups()).unwrap();
        assert_eq!(states.get("a").unwrap().removed(), Removed::No);
    }

    #[test]
    fn test_selected_missing_row_is_kept() {
        let mut states = loaded(two_groups());
        states.select("b", true);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        assert_eq!(states.kept_ids(), vec!["b"]);
        assert_eq!(states.kept_rows().len(), 1);
        assert_eq!(states.selected_ids(), vec!["b"]);
    }

    #[test]
    fn test_delete_rows_never_kept() {
        let mut states = loaded(two_groups());
        states.select("b", true);
        states.delete_rows(&["b"]);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        assert!(states.kept_ids().is_empty());
        assert_eq!(states.get("b").unwrap().removed(), Removed::Hard);
    }

    #[test]
    fn test_delete_rows_rederives_parent() {
        let mut states = loaded(two_groups());
        states.select("a", true);
        assert_eq!(states.selected_state("p1"), SelectedState::Partial);
        states.delete_rows(&["b"]);
        assert_eq!(states.selected_state("p1"), SelectedState::Checked);
    }

    #[test]
    fn test_new_child_under_checked_parent_is_partial() {
        let mut states = loaded(vec![group("p", vec![leaf("a")])]);
        states.select("p", true);
        states
            .set_rows(vec![group("p", vec![leaf("a"), leaf("b")])])
            .unwrap();
        assert_eq!(states.selected_state("p"), SelectedState::Partial);
    }

    // =========================================================================
    // Persisted Collapse Tests
    // =========================================================================

    #[test]
    fn test_persisted_collapse_applies_to_first_real_rows() {
        let mut states =
            RowStates::with_persisted_collapse(vec![HEADER.to_string(), "p2".to_string()]);
        assert!(states.is_collapsed(HEADER));
        states.set_rows(vec![]).unwrap();
        assert!(states.has_persisted_collapse());
        states.set_rows(two_groups()).unwrap();
        assert!(states.is_collapsed("p2"));
        assert!(!states.is_collapsed("p1"));
        assert!(!states.has_persisted_collapse());
    }

    #[test]
    fn test_persisted_collapse_handoff_uses_init_collapsed_later() {
        let mut states = RowStates::with_persisted_collapse(vec!["p1".to_string()]);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        states
            .set_rows(vec![
                group("p1", vec![leaf("a")]),
                group("p9", vec![leaf("z")]).init_collapsed(true),
                group("p8", vec![leaf("y")]),
            ])
            .unwrap();
        assert!(states.is_collapsed("p1"));
        assert!(states.is_collapsed("p9"));
        assert!(!states.is_collapsed("p8"));
    }

    #[test]
    fn test_init_collapsed_without_persistence() {
        let states = loaded(vec![group("p", vec![leaf("a")]).init_collapsed(true)]);
        assert!(states.is_collapsed("p"));
    }

    // =========================================================================
    // Selection Tests
    // =========================================================================

    #[test]
    fn test_select_leaf_partial_then_checked() {
        let mut states = loaded(vec![group("p", vec![leaf("c1"), leaf("c2")])]);
        states.select("c1", true);
        assert_eq!(states.selected_state("p"), SelectedState::Partial);
        assert_eq!(states.selected_state(HEADER), SelectedState::Partial);
        states.select("c2", true);
        assert_eq!(states.selected_state("p"), SelectedState::Checked);
        assert_eq!(states.selected_state(HEADER), SelectedState::Checked);
    }

    #[test]
    fn test_select_parent_sets_descendants() {
        let mut states = loaded(two_groups());
        states.select("p2", true);
        for id in ["p2", "c", "p3", "d", "e"] {
            assert_eq!(states.selected_state(id), SelectedState::Checked, "{id}");
        }
        assert_eq!(states.selected_state("p1"), SelectedState::Unchecked);
        assert_eq!(states.selected_state(HEADER), SelectedState::Partial);
        states.select("p2", false);
        assert_eq!(states.selected_state("d"), SelectedState::Unchecked);
    }

    #[test]
    fn test_select_deep_leaf_propagates_to_root() {
        let mut states = loaded(two_groups());
        states.select("d", true);
        assert_eq!(states.selected_state("p3"), SelectedState::Partial);
        assert_eq!(states.selected_state("p2"), SelectedState::Partial);
        states.select("e", true);
        assert_eq!(states.selected_state("p3"), SelectedState::Checked);
        assert_eq!(states.selected_state("p2"), SelectedState::Partial);
        states.select("c", true);
        assert_eq!(states.selected_state("p2"), SelectedState::Checked);
    }

    #[test]
    fn test_select_header_all_and_none() {
        let mut states = loaded(two_groups());
        states.select(HEADER, true);
        for id in states.live_ids() {
            assert_eq!(states.selected_state(&id), SelectedState::Checked);
        }
        assert_eq!(states.selected_state(HEADER), SelectedState::Checked);
        states.select(HEADER, false);
        for id in states.live_ids() {
            assert_eq!(states.selected_state(&id), SelectedState::Unchecked);
        }
        assert_eq!(states.selected_state(HEADER), SelectedState::Unchecked);
    }

    #[test]
    fn test_select_header_does_not_keep_removed_rows() {
        let mut states = loaded(two_groups());
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        states.select(HEADER, true);
        assert!(states.kept_ids().is_empty());
    }

    #[test]
    fn test_select_header_false_clears_kept() {
        let mut states = loaded(two_groups());
        states.select("c", true);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        assert_eq!(states.kept_ids(), vec!["c"]);
        states.select(HEADER, false);
        assert!(states.kept_ids().is_empty());
    }

    #[test]
    fn test_deselect_kept_group_drops_kept_rows() {
        let mut states = loaded(two_groups());
        states.select("c", true);
        states.select("a", true);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        states.select(KEPT_GROUP, false);
        assert!(states.kept_ids().is_empty());
        assert_eq!(states.selected_state("a"), SelectedState::Checked);
    }

    #[test]
    fn test_deselect_kept_row() {
        let mut states = loaded(two_groups());
        states.select("c", true);
        states.set_rows(vec![group("p1", vec![leaf("a")])]).unwrap();
        states.select("c", false);
        assert!(states.kept_ids().is_empty());
    }

    #[test]
    fn test_unknown_id_reads_default() {
        let states = loaded(two_groups());
        assert_eq!(states.selected_state("nope"), SelectedState::Unchecked);
        assert!(!states.is_collapsed("nope"));
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let mut states = loaded(two_groups());
        states.select("nope", true);
        assert!(states.selected_ids().is_empty());
    }

    #[test]
    fn test_non_selectable_rows_are_skipped() {
        let mut states = loaded(vec![Row::new("group", "p", ()).with_children(vec![
            leaf("a"),
            leaf("locked").selectable(false),
        ])]);
        states.select("locked", true);
        assert_eq!(states.selected_state("locked"), SelectedState::Unchecked);
        states.select("a", true);
        assert_eq!(states.selected_state("p"), SelectedState::Checked);
        states.select(HEADER, true);
        assert_eq!(states.selected_state("locked"), SelectedState::Unchecked);
    }

    #[test]
    fn test_selected_rows_excludes_partial() {
        let mut states = loaded(two_groups());
        states.select("a", true);
        assert_eq!(states.selected_ids(), vec!["a"]);
        assert_eq!(states.selected_rows()[0].id, "a");
    }

    // =========================================================================
    // Collapse Tests
    // =========================================================================

    #[test]
    fn test_toggle_header_collapses_all_groups_then_expands() {
        let mut states = loaded(two_groups());
        states.toggle_collapsed(HEADER);
        assert!(states.is_collapsed(HEADER));
        for id in ["p1", "p2", "p3"] {
            assert!(states.is_collapsed(id), "{id}");
        }
        assert!(!states.is_collapsed("a"));
        states.toggle_collapsed(HEADER);
        for id in states.live_ids() {
            assert!(!states.is_collapsed(&id));
        }
        assert!(!states.is_collapsed(HEADER));
    }

    #[test]
    fn test_toggle_row_reconciles_header() {
        let mut states = loaded(two_groups());
        states.toggle_collapsed("p1");
        assert!(!states.is_collapsed(HEADER));
        states.toggle_collapsed("p2");
        assert!(states.is_collapsed(HEADER));
        states.toggle_collapsed("p1");
        assert!(states.is_collapsed(HEADER));
        states.toggle_collapsed("p2");
        assert!(!states.is_collapsed(HEADER));
    }

    #[test]
    fn test_collapsed_ids_order() {
        let mut states = loaded(two_groups());
        states.toggle_collapsed(HEADER);
        assert_eq!(states.collapsed_ids(), vec![HEADER, "p1", "p2", "p3"]);
        states.toggle_collapsed("p1");
        assert_eq!(states.collapsed_ids(), vec![HEADER, "p2", "p3"]);
    }

    #[test]
    fn test_toggle_kept_group() {
        let mut states: RowStates<()> = RowStates::new();
        assert!(states.is_collapsed(KEPT_GROUP));
        states.toggle_collapsed(KEPT_GROUP);
        assert!(!states.is_collapsed(KEPT_GROUP));
    }

    #[test]
    fn test_set_dragged_over() {
        let mut states = loaded(two_groups());
        states.set_dragged_over("a", true);
        assert!(states.get("a").unwrap().is_dragged_over());
        states.set_dragged_over("a", false);
        assert!(!states.get("a").unwrap().is_dragged_over());
    }

    // =========================================================================
    // Property Tests
    // =========================================================================

    fn arb_tree() -> impl Strategy<Value = Vec<Row<()>>> {
        // Up to 4 groups of up to 4 leaves; ids are unique by construction.
        prop::collection::vec(0usize..5, 1..5).prop_map(|sizes| {
            sizes
                .iter()
                .enumerate()
                .map(|(g, n)| {
                    let children = (0..*n).map(|c| leaf(&format!("g{g}c{c}"))).collect();
                    group(&format!("g{g}"), children)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_parent_state_matches_children(rows in arb_tree(), picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10)) {
            let mut states = loaded(rows);
            let ids = states.live_ids();
            for pick in picks {
                let id = pick.get(&ids).clone();
                let current = states.selected_state(&id).is_checked();
                states.select(&id, !current);
            }
            for id in &ids {
                let children: Vec<SelectedState> =
                    states.live_children(id).map(RowState::selected).collect();
                if let Some(expected) = SelectedState::derive(children) {
                    prop_assert_eq!(states.selected_state(id), expected);
                }
            }
        }

        #[test]
        fn prop_header_select_covers_everything(rows in arb_tree()) {
            let mut states = loaded(rows);
            states.select(HEADER, true);
            for id in states.live_ids() {
                prop_assert_eq!(states.selected_state(&id), SelectedState::Checked);
            }
            states.select(HEADER, false);
            for id in states.live_ids() {
                prop_assert_eq!(states.selected_state(&id), SelectedState::Unchecked);
            }
        }

        #[test]
        fn prop_reconcile_keeps_serials(rows in arb_tree()) {
            let mut states = loaded(rows.clone());
            let serials: Vec<u64> = states.live_ids().iter().map(|id| states.get(id).unwrap().serial()).collect();
            states.set_rows(rows).unwrap();
            let after: Vec<u64> = states.live_ids().iter().map(|id| states.get(id).unwrap().serial()).collect();
            prop_assert_eq!(serials, after);
        }
    }
}
