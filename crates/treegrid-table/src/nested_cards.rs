//! Nested-card chrome.
//!
//! Parent rows can be drawn as cards that wrap their descendants. Instead of
//! nesting real elements, the generator emits synthetic chrome between
//! content rows: an **open** piece above a card's first row, a **close**
//! piece below its last descendant, and **spacer** pieces between siblings.
//! Every piece is wrapped once per card still open around it, innermost
//! first, so nested cards line up without a real element tree.
//!
//! Consecutive pieces between two content rows are coalesced into a single
//! [`ChromeRow`], which keeps the row count low for virtualized renderers.

use crate::error::{TableError, TableResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Card style of one row kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedCardStyle {
    /// Card background
    pub bg_color: String,
    /// Horizontal padding inside the card, in px
    pub pad_x: f64,
    /// Corner radius, in px
    pub br: f64,
    /// Height of the open and close pieces, in px
    pub spacing_px: f64,
}

impl Default for NestedCardStyle {
    fn default() -> Self {
        Self {
            bg_color: "#ffffff".to_string(),
            pad_x: 8.0,
            br: 8.0,
            spacing_px: 8.0,
        }
    }
}

/// Card styles for every kind that opens a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedCardsStyle {
    /// Style per row kind
    pub kinds: BTreeMap<String, NestedCardStyle>,
    /// Height of spacer pieces, in px
    pub spacer_px: f64,
}

impl Default for NestedCardsStyle {
    fn default() -> Self {
        Self {
            kinds: BTreeMap::new(),
            spacer_px: 4.0,
        }
    }
}

impl NestedCardsStyle {
    /// Add a style for a kind.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>, style: NestedCardStyle) -> Self {
        self.kinds.insert(kind.into(), style);
        self
    }
}

/// What a chrome piece draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromeKind {
    Open,
    Close,
    Spacer,
}

/// One wrapping card element around a chrome piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLayer {
    /// Kind of the row that opened the card
    pub kind: String,
    /// Card background
    pub bg_color: String,
    /// Horizontal padding
    pub pad_x: f64,
    /// Top corner radius
    pub round_top: f64,
    /// Bottom corner radius
    pub round_bottom: f64,
}

/// One open, close or spacer piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromePiece {
    /// What the piece draws
    pub kind: ChromeKind,
    /// Height in px
    pub height_px: f64,
    /// Wrapping card elements, innermost first
    pub layers: Vec<CardLayer>,
}

/// Coalesced chrome between two content rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromeRow {
    /// Pieces in emission order
    pub pieces: Vec<ChromePiece>,
}

impl ChromeRow {
    /// Total height in px.
    #[must_use]
    pub fn height_px(&self) -> f64 {
        self.pieces.iter().map(|p| p.height_px).sum()
    }
}

/// Chrome generator for one pass over the visible rows.
#[derive(Debug, Clone)]
pub struct NestedCards {
    style: NestedCardsStyle,
    open: Vec<String>,
    pending: Vec<ChromePiece>,
}

impl NestedCards {
    /// Create a generator.
    #[must_use]
    pub fn new(style: NestedCardsStyle) -> Self {
        Self {
            style,
            open: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Number of open cards.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn style_for(&self, kind: &str) -> TableResult<&NestedCardStyle> {
        self.style
            .kinds
            .get(kind)
            .ok_or_else(|| TableError::NoStyleForKind(kind.to_string()))
    }

    /// Wrapping layers for the open cards, innermost first.
    fn layers(&self, round_top: bool, round_bottom: bool) -> TableResult<Vec<CardLayer>> {
        self.open
            .iter()
            .rev()
            .enumerate()
            .map(|(i, kind)| {
                let style = self.style_for(kind)?;
                let innermost = i == 0;
                Ok(CardLayer {
                    kind: kind.clone(),
                    bg_color: style.bg_color.clone(),
                    pad_x: style.pad_x,
                    round_top: if innermost && round_top { style.br } else { 0.0 },
                    round_bottom: if innermost && round_bottom { style.br } else { 0.0 },
                })
            })
            .collect()
    }

    /// Start a content row. A row with children opens a card; returns
    /// whether one was opened.
    pub fn begin_row(&mut self, kind: &str, has_children: bool) -> TableResult<bool> {
        if !has_children {
            return Ok(false);
        }
        let height_px = self.style_for(kind)?.spacing_px;
        self.open.push(kind.to_string());
        let layers = self.layers(true, false)?;
        self.pending.push(ChromePiece {
            kind: ChromeKind::Open,
            height_px,
            layers,
        });
        Ok(true)
    }

    /// Close the innermost open card.
    pub fn end_row(&mut self) -> TableResult<()> {
        let Some(kind) = self.open.last() else {
            return Ok(());
        };
        let height_px = self.style_for(kind)?.spacing_px;
        let layers = self.layers(false, true)?;
        self.pending.push(ChromePiece {
            kind: ChromeKind::Close,
            height_px,
            layers,
        });
        self.open.pop();
        Ok(())
    }

    /// Space two sibling rows apart inside the current cards.
    pub fn between_children(&mut self) -> TableResult<()> {
        let layers = self.layers(false, false)?;
        self.pending.push(ChromePiece {
            kind: ChromeKind::Spacer,
            height_px: self.style.spacer_px,
            layers,
        });
        Ok(())
    }

    /// Close every open card.
    pub fn finish(&mut self) -> TableResult<()> {
        while !self.open.is_empty() {
            self.end_row()?;
        }
        Ok(())
    }

    /// Everything emitted since the last call, as one row.
    pub fn take_chrome_row(&mut self) -> Option<ChromeRow> {
        if self.pending.is_empty() {
            return None;
        }
        Some(ChromeRow {
            pieces: std::mem::take(&mut self.pending),
        })
    }
}
