//! Column width resolution.
//!
//! Columns declare widths the way CSS grid tracks do:
//! - a bare number or `"Nfr"`: a fractional share of the remaining width
//! - `"Npx"`: a fixed pixel width
//! - `"N%"`: a percentage of the table width
//!
//! When the table width is known every column resolves to pixels. When it is
//! not, fractional columns resolve to a `calc()` expression so that two
//! independently laid out strips (header and body) agree to the pixel
//! without ever measuring the table.

use crate::error::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A width as written on a column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredWidth {
    /// Unit-less fractional weight
    Number(f64),
    /// Width with a unit suffix
    Text(String),
}

impl From<f64> for DeclaredWidth {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for DeclaredWidth {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for DeclaredWidth {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DeclaredWidth {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for DeclaredWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A classified track size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackSize {
    /// Fixed size in pixels
    Px(f64),
    /// Percentage of the table width
    Percent(f64),
    /// Flexible fraction of remaining space
    Fr(f64),
}

impl Default for TrackSize {
    fn default() -> Self {
        Self::Fr(1.0)
    }
}

impl TrackSize {
    /// Classify a declared width.
    pub fn parse(column: &str, width: &DeclaredWidth) -> LayoutResult<Self> {
        let unsupported = || LayoutError::UnsupportedWidth {
            column: column.to_string(),
            value: width.to_string(),
        };
        match width {
            DeclaredWidth::Number(n) => non_negative(*n).map(Self::Fr).ok_or_else(unsupported),
            DeclaredWidth::Text(text) => {
                let text = text.trim();
                let parsed = if let Some(n) = text.strip_suffix("px") {
                    parse_number(n).map(Self::Px)
                } else if let Some(n) = text.strip_suffix('%') {
                    parse_number(n).map(Self::Percent)
                } else if let Some(n) = text.strip_suffix("fr") {
                    parse_number(n).map(Self::Fr)
                } else {
                    None
                };
                parsed.ok_or_else(unsupported)
            }
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().and_then(non_negative)
}

fn non_negative(n: f64) -> Option<f64> {
    (n.is_finite() && n >= 0.0).then_some(n)
}

/// Parse a minimum width, which must be in pixels.
pub fn parse_min_width(column: &str, mw: &str) -> LayoutResult<f64> {
    mw.trim()
        .strip_suffix("px")
        .and_then(parse_number)
        .ok_or_else(|| LayoutError::NonPixelMinWidth {
            column: column.to_string(),
            value: mw.to_string(),
        })
}

/// Width inputs of one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSizing {
    /// Column id
    pub id: String,
    /// Declared width (default `1` fr)
    pub w: Option<DeclaredWidth>,
    /// Width used while the column is expanded
    pub expanded_width: Option<DeclaredWidth>,
    /// Minimum width, in px
    pub mw: Option<String>,
    /// Action columns never absorb resize deltas
    pub is_action: bool,
}

impl ColumnSizing {
    /// Create sizing inputs with a default `1fr` width.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the declared width.
    #[must_use]
    pub fn w(mut self, w: impl Into<DeclaredWidth>) -> Self {
        self.w = Some(w.into());
        self
    }

    /// Set the expanded width.
    #[must_use]
    pub fn expanded_width(mut self, w: impl Into<DeclaredWidth>) -> Self {
        self.expanded_width = Some(w.into());
        self
    }

    /// Set the minimum width.
    #[must_use]
    pub fn mw(mut self, mw: impl Into<String>) -> Self {
        self.mw = Some(mw.into());
        self
    }

    /// Mark as an action column.
    #[must_use]
    pub const fn action(mut self) -> Self {
        self.is_action = true;
        self
    }

    /// Minimum width in px (0 when unset).
    pub fn min_px(&self) -> LayoutResult<f64> {
        self.mw
            .as_deref()
            .map_or(Ok(0.0), |mw| parse_min_width(&self.id, mw))
    }

    /// The declared width in effect, before classification.
    fn effective_track(
        &self,
        expanded_ids: &[String],
        resized_widths: &BTreeMap<String, f64>,
    ) -> LayoutResult<TrackSize> {
        if let Some(px) = resized_widths.get(&self.id) {
            return Ok(TrackSize::Px(*px));
        }
        let declared = if expanded_ids.contains(&self.id) {
            self.expanded_width.as_ref().or(self.w.as_ref())
        } else {
            self.w.as_ref()
        };
        declared.map_or(Ok(TrackSize::default()), |w| TrackSize::parse(&self.id, w))
    }
}

/// A resolved column width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnSize {
    /// Concrete pixels
    Px(f64),
    /// Percentage left for the renderer to resolve
    Percent(f64),
    /// CSS expression for an unknown table width
    Calc(String),
}

impl ColumnSize {
    /// Pixel value when resolved to pixels.
    #[must_use]
    pub const fn px(&self) -> Option<f64> {
        match self {
            Self::Px(px) => Some(*px),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
            Self::Calc(expr) => f.write_str(expr),
        }
    }
}

/// Resolve every column's width.
///
/// Widths come from `resized_widths` first, then `expanded_width` for
/// expanded columns, then `w`. With a known `table_width` (floored at
/// `table_min_width`) the result is all pixels; fractional columns whose
/// minimum exceeds their share are pinned to that minimum in a single pass
/// and the rest split what remains.
pub fn calc_column_sizes(
    columns: &[ColumnSizing],
    table_width: Option<f64>,
    table_min_width: f64,
    expanded_ids: &[String],
    resized_widths: &BTreeMap<String, f64>,
) -> LayoutResult<Vec<ColumnSize>> {
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut tracks = Vec::with_capacity(columns.len());
    let mut mins = Vec::with_capacity(columns.len());
    let mut claimed_px = 0.0;
    let mut claimed_percent = 0.0;
    let mut total_fr = 0.0;

    for column in columns {
        let track = column.effective_track(expanded_ids, resized_widths)?;
        match track {
            TrackSize::Px(px) => claimed_px += px,
            TrackSize::Percent(pct) => claimed_percent += pct,
            TrackSize::Fr(fr) => total_fr += fr,
        }
        tracks.push(track);
        mins.push(column.min_px()?);
    }

    let sizes = match table_width {
        Some(width) => resolve_px(&tracks, &mins, width.max(table_min_width), claimed_px, total_fr),
        None => resolve_calc(&tracks, &mins, claimed_px, claimed_percent, total_fr),
    };
    Ok(sizes)
}

fn resolve_px(
    tracks: &[TrackSize],
    mins: &[f64],
    basis: f64,
    claimed_px: f64,
    total_fr: f64,
) -> Vec<ColumnSize> {
    let mut sizes = vec![0.0; tracks.len()];
    let mut remaining = basis - claimed_px;

    for (i, track) in tracks.iter().enumerate() {
        match track {
            TrackSize::Px(px) => sizes[i] = *px,
            TrackSize::Percent(pct) => {
                sizes[i] = (basis * pct / 100.0).max(mins[i]);
                remaining -= sizes[i];
            }
            TrackSize::Fr(_) => {}
        }
    }
    let remaining = remaining.max(0.0);

    // Single pass: columns whose minimum beats their naive share leave the pool.
    let mut pinned = vec![false; tracks.len()];
    let mut pool_width = remaining;
    let mut pool_fr = total_fr;
    for (i, track) in tracks.iter().enumerate() {
        if let TrackSize::Fr(fr) = track {
            let naive = if total_fr > 0.0 { remaining * fr / total_fr } else { 0.0 };
            if mins[i] > naive {
                pinned[i] = true;
                pool_width -= mins[i];
                pool_fr -= fr;
            }
        }
    }
    let pool_width = pool_width.max(0.0);

    for (i, track) in tracks.iter().enumerate() {
        if let TrackSize::Fr(fr) = track {
            sizes[i] = if pinned[i] {
                mins[i]
            } else {
                let share = if pool_fr > 0.0 { pool_width * fr / pool_fr } else { 0.0 };
                share.max(mins[i])
            };
        }
    }

    sizes.into_iter().map(ColumnSize::Px).collect()
}

fn resolve_calc(
    tracks: &[TrackSize],
    mins: &[f64],
    claimed_px: f64,
    claimed_percent: f64,
    total_fr: f64,
) -> Vec<ColumnSize> {
    tracks
        .iter()
        .zip(mins)
        .map(|(track, min)| match track {
            TrackSize::Px(px) => ColumnSize::Px(*px),
            TrackSize::Percent(pct) => ColumnSize::Percent(*pct),
            TrackSize::Fr(fr) => {
                let share = format!(
                    "calc((100% - {claimed_percent}% - {claimed_px}px) * ({fr} / {total_fr}))"
                );
                if *min > 0.0 {
                    ColumnSize::Calc(format!("max({min}px, {share})"))
                } else {
                    ColumnSize::Calc(share)
                }
            }
        })
        .collect()
}
