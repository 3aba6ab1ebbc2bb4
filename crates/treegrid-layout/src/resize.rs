//! Interactive column resize.
//!
//! Dragging a column edge changes that column's width and hands the
//! difference to the columns on its right, in proportion to their current
//! widths. Right-hand columns never shrink below their minimum; whatever they
//! cannot absorb is reported as `unapplied` and the dragged column stops
//! short, so the table's total width is unchanged.
//!
//! Runs on every pointer move during a drag, so work is limited to the
//! columns right of the dragged one.

use serde::{Deserialize, Serialize};

/// Resize inputs of one column, in resolved pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeColumn {
    /// Column id
    pub id: String,
    /// Current width in px
    pub width: f64,
    /// Minimum width in px
    pub min_width: f64,
    /// Action columns keep their width
    pub is_action: bool,
}

impl ResizeColumn {
    /// Create a resize column with no minimum.
    #[must_use]
    pub fn new(id: impl Into<String>, width: f64) -> Self {
        Self {
            id: id.into(),
            width,
            min_width: 0.0,
            is_action: false,
        }
    }

    /// Set the minimum width.
    #[must_use]
    pub const fn min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self
    }

    /// Mark as an action column.
    #[must_use]
    pub const fn action(mut self) -> Self {
        self.is_action = true;
        self
    }
}

/// Result of a resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeOutcome {
    /// Every column's width after the resize, in column order
    pub widths: Vec<(String, f64)>,
    /// Final width of the resized column
    pub width: f64,
    /// Part of the requested change the right-hand columns could not absorb
    pub unapplied: f64,
}

impl ResizeOutcome {
    /// Sum of all column widths.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.widths.iter().map(|(_, w)| w).sum()
    }

    /// Width of a column by id.
    #[must_use]
    pub fn width_of(&self, id: &str) -> Option<f64> {
        self.widths.iter().find(|(c, _)| c == id).map(|(_, w)| *w)
    }
}

/// Resize `columns[index]` toward `requested` px.
///
/// Returns `None` when `index` is out of range.
#[must_use]
pub fn handle_column_resize(
    columns: &[ResizeColumn],
    index: usize,
    requested: f64,
) -> Option<ResizeOutcome> {
    let target = columns.get(index)?;
    let clamped = requested.max(target.min_width);
    let delta = clamped - target.width;

    let right: Vec<usize> = (index + 1..columns.len())
        .filter(|&i| !columns[i].is_action)
        .collect();
    let right_total: f64 = right.iter().map(|&i| columns[i].width).sum();

    let mut widths: Vec<(String, f64)> =
        columns.iter().map(|c| (c.id.clone(), c.width)).collect();

    let mut absorbed = 0.0;
    if right_total > 0.0 && delta != 0.0 {
        for &i in &right {
            let column = &columns[i];
            let share = column.width / right_total;
            // a column already under its minimum never grows to reach it
            let floor = column.min_width.min(column.width);
            let next = (column.width - delta * share).max(floor);
            absorbed += next - column.width;
            widths[i].1 = next;
        }
    }

    let width = target.width - absorbed;
    widths[index].1 = width;
    let unapplied = delta + absorbed;

    log::trace!(
        "resize {} to {requested}px: final {width}px, unapplied {unapplied}px",
        target.id
    );

    Some(ResizeOutcome {
        widths,
        width,
        unapplied,
    })
}

/// Width `columns[index]` would end up with, without committing anything.
#[must_use]
pub fn calculate_preview_width(columns: &[ResizeColumn], index: usize, requested: f64) -> Option<f64> {
    handle_column_resize(columns, index, requested).map(|outcome| outcome.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    fn three() -> Vec<ResizeColumn> {
        vec![
            ResizeColumn::new("a", 200.0),
            ResizeColumn::new("b", 200.0),
            ResizeColumn::new("c", 100.0),
        ]
    }

    // =========================================================================
    // handle_column_resize Tests
    // =========================================================================

    #[test]
    fn test_grow_shrinks_right_proportionally() {
        let outcome = handle_column_resize(&three(), 0, 260.0).unwrap();
        approx(Some(outcome.width), 260.0);
        approx(outcome.width_of("b"), 160.0);
        approx(outcome.width_of("c"), 80.0);
        approx(Some(outcome.unapplied), 0.0);
        approx(Some(outcome.total()), 500.0);
    }

    #[test]
    fn test_shrink_grows_right_proportionally() {
        let outcome = handle_column_resize(&three(), 0, 140.0).unwrap();
        approx(Some(outcome.width), 140.0);
        approx(outcome.width_of("b"), 240.0);
        approx(outcome.width_of("c"), 120.0);
        approx(Some(outcome.total()), 500.0);
    }

    #[test]
    fn test_right_minimum_limits_growth() {
        let columns = vec![
            ResizeColumn::new("a", 200.0),
            ResizeColumn::new("b", 200.0).min_width(180.0),
            ResizeColumn::new("c", 100.0).min_width(90.0),
        ];
        let outcome = handle_column_resize(&columns, 0, 400.0).unwrap();
        approx(outcome.width_of("b"), 180.0);
        approx(outcome.width_of("c"), 90.0);
        approx(Some(outcome.width), 230.0);
        approx(Some(outcome.unapplied), 170.0);
        approx(Some(outcome.total()), 500.0);
    }

    #[test]
    fn test_own_minimum_clamps_request() {
        let columns = vec![
            ResizeColumn::new("a", 200.0).min_width(150.0),
            ResizeColumn::new("b", 300.0),
        ];
        let outcome = handle_column_resize(&columns, 0, 10.0).unwrap();
        approx(Some(outcome.width), 150.0);
        approx(outcome.width_of("b"), 350.0);
    }

    #[test]
    fn test_column_under_minimum_absorbs_nothing() {
        let columns = vec![
            ResizeColumn::new("a", 200.0),
            ResizeColumn::new("b", 50.0).min_width(80.0),
            ResizeColumn::new("c", 100.0),
        ];
        let outcome = handle_column_resize(&columns, 0, 260.0).unwrap();
        approx(outcome.width_of("b"), 50.0);
        approx(outcome.width_of("c"), 60.0);
        approx(Some(outcome.width), 240.0);
        approx(Some(outcome.unapplied), 20.0);
        approx(Some(outcome.total()), 350.0);
    }

    #[test]
    fn test_action_columns_keep_width() {
        let columns = vec![
            ResizeColumn::new("a", 200.0),
            ResizeColumn::new("b", 200.0),
            ResizeColumn::new("actions", 50.0).action(),
        ];
        let outcome = handle_column_resize(&columns, 0, 250.0).unwrap();
        approx(outcome.width_of("actions"), 50.0);
        approx(outcome.width_of("b"), 150.0);
        approx(Some(outcome.width), 250.0);
    }

    #[test]
    fn test_last_column_cannot_resize() {
        let outcome = handle_column_resize(&three(), 2, 300.0).unwrap();
        approx(Some(outcome.width), 100.0);
        approx(Some(outcome.unapplied), 200.0);
        approx(Some(outcome.total()), 500.0);
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(handle_column_resize(&three(), 3, 100.0).is_none());
        assert!(calculate_preview_width(&[], 0, 100.0).is_none());
    }

    #[test]
    fn test_preview_matches_commit() {
        let columns = three();
        let preview = calculate_preview_width(&columns, 1, 250.0).unwrap();
        let outcome = handle_column_resize(&columns, 1, 250.0).unwrap();
        assert_eq!(preview, outcome.width);
        approx(Some(preview), 250.0);
    }

    // =========================================================================
    // Property Tests
    // =========================================================================

    proptest! {
        #[test]
        fn prop_total_width_invariant(
            widths in prop::collection::vec(20.0f64..400.0, 2..8),
            mins in prop::collection::vec(0.0f64..20.0, 8),
            index in 0usize..8,
            requested in 0.0f64..1000.0,
        ) {
            let columns: Vec<ResizeColumn> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| ResizeColumn::new(format!("c{i}"), *w).min_width(mins[i]))
                .collect();
            let index = index % columns.len();
            let before: f64 = columns.iter().map(|c| c.width).sum();
            let outcome = handle_column_resize(&columns, index, requested).unwrap();
            prop_assert!((outcome.total() - before).abs() < 1e-6);
            for (column, (_, w)) in columns.iter().zip(&outcome.widths).skip(index + 1) {
                prop_assert!(*w >= column.min_width - 1e-9);
            }
        }
    }
}
