#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::ref_option)]
//! Table state for treegrid.
//!
//! Builds on the row-state arena of `treegrid-core` and the column sizing of
//! `treegrid-layout`:
//!
//! - **Column model**: per-kind renderers with a default fallback, plus stock
//!   select, collapse and drag-handle columns ([`Column`])
//! - **Sort engine**: pinned-aware, two-key, per-sibling-group sorting
//!   ([`sort_rows`], [`derive_sort_state`])
//! - **Search**: whitespace-separated, case-insensitive terms
//!   ([`SearchFilter`])
//! - **Nested cards**: synthetic chrome rows around parent rows
//!   ([`NestedCards`])
//! - **Facade**: [`TableState`], the single object a renderer reads
//!
//! # Example
//!
//! ```
//! use treegrid_core::Row;
//! use treegrid_table::{Cell, Column, SelectedState, TableConfig, TableState};
//!
//! let mut table = TableState::new(TableConfig::default());
//! table.set_columns(vec![Column::with_default("name", |name: &String, _| {
//!     Cell::new(name.clone())
//! })]);
//! table
//!     .set_rows(vec![Row::new("group", "g", "Group".to_string())
//!         .child(Row::new("item", "a", "A".to_string()))
//!         .child(Row::new("item", "b", "B".to_string()))])
//!     .unwrap();
//!
//! table.select_row("a", true);
//! assert_eq!(table.get_selected("g"), SelectedState::Partial);
//! assert_eq!(table.visible_rows().len(), 4);
//! ```

mod column;
mod config;
mod error;
mod nested_cards;
mod search;
mod sort;
mod table_state;

pub use column::{
    Cell, CellContext, CellValue, Column, Renderer, Sticky, TextAlign, COLLAPSE_COLUMN,
    DRAG_HANDLE_COLUMN, SELECT_COLUMN,
};
pub use config::TableConfig;
pub use error::{TableError, TableResult};
pub use nested_cards::{
    CardLayer, ChromeKind, ChromePiece, ChromeRow, NestedCardStyle, NestedCards, NestedCardsStyle,
};
pub use search::{filter_rows, is_filter_exempt, SearchFilter};
pub use sort::{
    compare_values, derive_sort_state, sort_rows, sort_siblings, SortDirection, SortKey, SortOn,
    SortSpec, SortState,
};
pub use table_state::{ColumnState, RenderRow, TableEvent, TableState, VisibleRow};
pub use treegrid_core::SelectedState;
