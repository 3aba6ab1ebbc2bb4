//! Treegrid: state engine for hierarchical tables.
//!
//! Turns a tree of kind-tagged rows and a set of column definitions into the
//! flattened, filtered, sorted list of visible rows a renderer paints, with
//! tri-state selection, collapse propagation, column widths and interactive
//! resizing.
//!
//! The engine is split across three crates, re-exported here:
//!
//! - [`rows`]: row tree, row-state arena, reconciliation, persistence
//! - [`layout`]: column width resolution and resize redistribution
//! - [`table`]: column model, sorting, search, nested cards, [`TableState`]
//!
//! # Example
//!
//! ```
//! use treegrid::prelude::*;
//!
//! let mut table = TableState::new(TableConfig::default());
//! table.set_columns(vec![
//!     Column::select(),
//!     Column::with_default("name", |name: &&str, _| Cell::new(*name)),
//! ]);
//! table
//!     .set_rows(vec![Row::new("parent", "p", "Parent")
//!         .child(Row::new("child", "c1", "One"))
//!         .child(Row::new("child", "c2", "Two"))])
//!     .unwrap();
//!
//! table.select_row("c1", true);
//! assert_eq!(table.get_selected("p"), SelectedState::Partial);
//! table.select_row("c2", true);
//! assert_eq!(table.get_selected("p"), SelectedState::Checked);
//! ```

pub use treegrid_core as rows;
pub use treegrid_layout as layout;
pub use treegrid_table as table;

pub use treegrid_table::{TableConfig, TableError, TableResult, TableState};

/// Commonly used types.
pub mod prelude {
    pub use treegrid_core::{
        MemoryStore, Pin, PinAt, Removed, Row, RowStates, SelectedState, StateStore, HEADER,
        KEPT_GROUP,
    };
    pub use treegrid_layout::{ColumnSize, DeclaredWidth};
    pub use treegrid_table::{
        Cell, CellContext, CellValue, Column, RenderRow, SortDirection, SortOn, SortState,
        TableConfig, TableError, TableEvent, TableResult, TableState, VisibleRow,
    };
}
