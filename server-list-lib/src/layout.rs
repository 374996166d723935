//! Column widths, layout mode and row virtualization.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::column::ColumnWidth;

/// Viewport width (logical px) from which `auto` layout becomes a table.
pub const TABLE_BREAKPOINT: f64 = 720.0;

/// Default minimum width of a table column.
pub const DEFAULT_MIN_COL_WIDTH: f64 = 140.0;

/// Width of the checkbox column when selection is enabled.
pub const SELECTION_COLUMN_WIDTH: f64 = 52.0;

/// Width of the row-actions column when row actions are present.
pub const ROW_ACTIONS_COLUMN_WIDTH: f64 = 120.0;

/// Gap between tiles of the card grid.
pub const GRID_GAP: f64 = 8.0;

/// Horizontal padding on each side of the card grid.
pub const GRID_PADDING: f64 = 12.0;

/// Smallest tile width the card grid will produce.
pub const GRID_MIN_TILE_WIDTH: f64 = 120.0;

/// Requested layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Table on wide viewports, cards otherwise.
    #[default]
    Auto,
    /// Always cards.
    Cards,
    /// Always a table.
    Table,
}

/// Layout actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveLayout {
    Cards,
    Table,
}

/// Resolves the requested layout against the viewport width.
pub fn resolve_layout(requested: LayoutMode, viewport_width: f64) -> EffectiveLayout {
    match requested {
        LayoutMode::Cards => EffectiveLayout::Cards,
        LayoutMode::Table => EffectiveLayout::Table,
        LayoutMode::Auto if viewport_width >= TABLE_BREAKPOINT => EffectiveLayout::Table,
        LayoutMode::Auto => EffectiveLayout::Cards,
    }
}

/// Pixel width of one column.
///
/// Fixed widths are raised to `min_col_width`. Percentages take that share of
/// the viewport (floored), also raised to the minimum. Anything else, including
/// non-finite values, is the minimum.
pub fn column_px(width: Option<ColumnWidth>, viewport_width: f64, min_col_width: f64) -> f64 {
    match width {
        Some(ColumnWidth::Px(px)) if px.is_finite() => px.max(min_col_width),
        Some(ColumnWidth::Percent(pct)) if pct.is_finite() => {
            let share = pct.max(0.0) / 100.0;
            min_col_width.max((viewport_width * share).floor())
        }
        _ => min_col_width,
    }
}

/// Resolved table geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableWidths {
    /// Width of each data column, in column order.
    pub columns: Vec<f64>,
    /// Width of the checkbox column, if shown.
    pub selection: Option<f64>,
    /// Width of the row-actions column, if shown.
    pub actions: Option<f64>,
    /// Sum of all of the above; the table's minimum scroll width.
    pub total: f64,
}

/// Computes all column widths and the total scrollable width.
pub fn table_widths<T>(
    columns: &[Column<T>],
    viewport_width: f64,
    min_col_width: f64,
    selectable: bool,
    row_actions: bool,
) -> TableWidths {
    let widths: Vec<f64> = columns
        .iter()
        .map(|c| column_px(c.width, viewport_width, min_col_width))
        .collect();
    let selection = selectable.then_some(SELECTION_COLUMN_WIDTH);
    let actions = row_actions.then_some(ROW_ACTIONS_COLUMN_WIDTH);
    let total = widths.iter().sum::<f64>() + selection.unwrap_or(0.0) + actions.unwrap_or(0.0);
    TableWidths {
        columns: widths,
        selection,
        actions,
        total,
    }
}

/// Tile grid for card layouts of minimum-width tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Tiles per row, at least 1.
    pub columns: usize,
    /// Width of each tile.
    pub item_width: f64,
}

/// Fits as many tiles of at least `min_item_width` as the container allows.
pub fn grid_layout(container_width: f64, min_item_width: f64) -> GridLayout {
    let inner = (container_width - GRID_PADDING * 2.0).max(0.0);
    let fit = ((inner + GRID_GAP) / (min_item_width + GRID_GAP)).floor();
    let columns = if fit.is_finite() && fit >= 1.0 {
        fit as usize
    } else {
        1
    };
    let item_width = if columns > 1 {
        ((inner - GRID_GAP * (columns - 1) as f64) / columns as f64).floor()
    } else {
        inner
    };
    GridLayout {
        columns,
        item_width: item_width.max(GRID_MIN_TILE_WIDTH),
    }
}

/// Vertical window of a virtualized list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowWindow {
    /// Scroll offset from the top of the first row.
    pub scroll_offset: f64,
    /// Height available to rows (header excluded).
    pub viewport_height: f64,
    /// Height of a single row.
    pub row_height: f64,
}

impl RowWindow {
    /// Creates a window.
    pub fn new(scroll_offset: f64, viewport_height: f64, row_height: f64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            row_height,
        }
    }

    /// Indices of rows to materialize out of `len`, with one row of overscan.
    ///
    /// A zero-height or degenerate window materializes everything.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        if !(self.row_height > 0.0 && self.viewport_height > 0.0) {
            return 0..len;
        }
        let start = ((self.scroll_offset.max(0.0) / self.row_height).floor() as usize).min(len);
        let visible = (self.viewport_height / self.row_height).ceil() as usize;
        let end = (start + visible + 1).min(len);
        start..end
    }

    /// Returns `true` if the scroll position is within `threshold` viewport
    /// heights of the end of `len` rows.
    pub fn is_near_end(&self, len: usize, threshold: f64) -> bool {
        if len == 0 || self.row_height <= 0.0 {
            return false;
        }
        let content = len as f64 * self.row_height;
        let remaining = content - (self.scroll_offset + self.viewport_height);
        remaining <= self.viewport_height * threshold
    }
}
