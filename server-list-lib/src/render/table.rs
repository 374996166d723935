//! Table renderer: fixed-width columns over a virtual row window.

use serde::Serialize;

use super::Viewport;
use crate::column::Alignment;
use crate::layout::RowWindow;
use crate::layout::TableWidths;
use crate::layout::table_widths;
use crate::list::ServerListInner;
use crate::query::QueryState;
use crate::query::SortDir;
use crate::selection::RowKey;
use crate::selection::SelectionProps;

/// How close to the end, in viewport heights, counts as end reached.
pub const END_REACHED_THRESHOLD: f64 = 0.4;

/// A header cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCell {
    /// Column key.
    pub key: String,
    /// Column header.
    pub label: String,
    /// Resolved width in logical pixels.
    pub width: f64,
    /// Whether clicking sorts by this column.
    pub sortable: bool,
    /// Direction when this column is the sort key.
    pub sort: Option<SortDir>,
    /// Alignment of the label.
    pub align: Alignment,
}

/// A body cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    /// Cell text.
    pub text: String,
    /// Resolved width in logical pixels.
    pub width: f64,
    /// Alignment of the text.
    pub align: Alignment,
}

/// A materialized table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Position in the full row list.
    pub index: usize,
    /// Key of the row.
    pub key: RowKey,
    /// Checkbox state; `None` when the list is not selectable.
    pub selected: Option<bool>,
    /// Odd rows are drawn with the alternate background.
    pub striped: bool,
    /// One cell per column.
    pub cells: Vec<TableCell>,
    /// Output of the row-actions slot.
    pub actions: Vec<String>,
}

/// The table body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// Header stays outside the scrolling rows.
    pub sticky_header: bool,
    /// One cell per column.
    pub header: Vec<HeaderCell>,
    /// Header select-all checkbox; `None` when not selectable.
    pub header_checked: Option<bool>,
    /// Column widths and total scroll width.
    pub widths: TableWidths,
    /// Rows in the visible window only.
    pub rows: Vec<TableRow>,
    /// Number of rows held overall.
    pub total_rows: usize,
    /// The scroll position is close enough to the end to load more.
    pub near_end: bool,
}

pub(super) fn build<T: Serialize>(
    inner: &ServerListInner<T>,
    query: &QueryState,
    rows: &[T],
    keys: &[RowKey],
    selection: &SelectionProps<'_>,
    all_selected: bool,
    viewport: Viewport,
) -> TableView {
    let options = &inner.options;
    let widths = table_widths(
        &inner.columns,
        viewport.width,
        options.min_col_width,
        options.selectable,
        inner.row_actions.is_some(),
    );

    let header = inner
        .columns
        .iter()
        .zip(&widths.columns)
        .map(|(c, &width)| HeaderCell {
            key: c.key.clone(),
            label: c.header.clone(),
            width,
            sortable: c.sortable,
            sort: (query.sort_by == c.key).then_some(query.sort_dir),
            align: c.align,
        })
        .collect();

    let window = RowWindow::new(viewport.scroll_offset, viewport.height, viewport.row_height);
    let range = window.visible_range(rows.len());
    let materialized = range
        .map(|index| {
            let row = &rows[index];
            let key = &keys[index];
            TableRow {
                index,
                key: key.clone(),
                selected: options.selectable.then(|| selection.is_selected(key)),
                striped: index % 2 == 1,
                cells: inner
                    .columns
                    .iter()
                    .zip(&widths.columns)
                    .map(|(c, &width)| TableCell {
                        text: c.cell_text(row),
                        width,
                        align: c.align,
                    })
                    .collect(),
                actions: inner
                    .row_actions
                    .as_ref()
                    .map(|f| f(row))
                    .unwrap_or_default(),
            }
        })
        .collect();

    TableView {
        sticky_header: options.sticky_header,
        header,
        header_checked: options.selectable.then_some(all_selected),
        widths,
        rows: materialized,
        total_rows: rows.len(),
        near_end: window.is_near_end(rows.len(), END_REACHED_THRESHOLD),
    }
}
