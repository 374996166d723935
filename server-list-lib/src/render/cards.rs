//! Card renderer: one block per row.

use serde::Serialize;

use crate::column::Alignment;
use crate::list::ServerListInner;
use crate::selection::RowKey;
use crate::selection::SelectionProps;

/// A labeled cell of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardCell {
    /// Column header.
    pub label: String,
    /// Cell text.
    pub text: String,
    /// Alignment of the text.
    pub align: Alignment,
}

/// One row drawn as a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    /// Key of the row.
    pub key: RowKey,
    /// Checkbox state; `None` when the list is not selectable.
    pub selected: Option<bool>,
    /// Output of the row-actions slot.
    pub actions: Vec<String>,
    /// One labeled cell per column.
    pub cells: Vec<CardCell>,
    /// Drawn as a separate tile.
    pub tile: bool,
}

pub(super) fn build<T: Serialize>(
    inner: &ServerListInner<T>,
    rows: &[T],
    keys: &[RowKey],
    selection: &SelectionProps<'_>,
) -> Vec<CardView> {
    rows.iter()
        .zip(keys)
        .map(|(row, key)| CardView {
            key: key.clone(),
            selected: inner
                .options
                .selectable
                .then(|| selection.is_selected(key)),
            actions: inner
                .row_actions
                .as_ref()
                .map(|f| f(row))
                .unwrap_or_default(),
            cells: inner
                .columns
                .iter()
                .map(|c| CardCell {
                    label: c.header.clone(),
                    text: c.cell_text(row),
                    align: c.align,
                })
                .collect(),
            tile: inner.options.card,
        })
        .collect()
}
