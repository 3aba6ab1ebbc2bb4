#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_markdown)]
//! Column sizing for treegrid tables.
//!
//! Two engines live here:
//!
//! - **Width resolution**: declared `fr` / `px` / `%` widths become pixel
//!   widths when the table width is known, or `calc()` expressions when it is
//!   not. See [`calc_column_sizes`].
//! - **Resize redistribution**: a dragged column trades width with the
//!   columns to its right, keeping the table total fixed. See
//!   [`handle_column_resize`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use treegrid_layout::{calc_column_sizes, ColumnSizing};
//!
//! let columns = vec![
//!     ColumnSizing::new("a").w(1),
//!     ColumnSizing::new("b").w(1),
//!     ColumnSizing::new("c").w("100px"),
//! ];
//! let sizes = calc_column_sizes(&columns, Some(500.0), 0.0, &[], &BTreeMap::new()).unwrap();
//! let px: Vec<String> = sizes.iter().map(ToString::to_string).collect();
//! assert_eq!(px, ["200px", "200px", "100px"]);
//! ```

mod error;
mod resize;
mod width;

pub use error::{LayoutError, LayoutResult};
pub use resize::{calculate_preview_width, handle_column_resize, ResizeColumn, ResizeOutcome};
pub use width::{
    calc_column_sizes, parse_min_width, ColumnSize, ColumnSizing, DeclaredWidth, TrackSize,
};
