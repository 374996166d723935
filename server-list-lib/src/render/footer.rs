//! Footer for both pagination strategies.

use serde::Serialize;

use super::LOADING_MORE_TEXT;
use crate::config::PaginationMode;
use crate::response::PageMeta;

/// Previous/Next pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagerView {
    /// Whether "Anterior" is enabled.
    pub prev_enabled: bool,
    /// Whether "Siguiente" is enabled.
    pub next_enabled: bool,
    /// e.g. `Página 1 de 3 · 25 registros`.
    pub label: String,
}

impl PagerView {
    /// Label of the previous-page button.
    pub const PREV_TEXT: &'static str = "Anterior";
    /// Label of the next-page button.
    pub const NEXT_TEXT: &'static str = "Siguiente";
}

/// What is drawn below the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Footer {
    /// Previous/Next buttons (pager mode).
    Pager(PagerView),
    /// Spinner below the rows while more pages exist.
    LoadingMore(&'static str),
    /// Nothing more to load.
    None,
}

pub(super) fn build(mode: PaginationMode, meta: &PageMeta, page: u32, loading: bool) -> Footer {
    match mode {
        PaginationMode::Pager => Footer::Pager(PagerView {
            prev_enabled: page > 1 && !loading,
            next_enabled: page < meta.last_page && !loading,
            label: format!(
                "Página {} de {} · {} registros",
                meta.current_page, meta.last_page, meta.total
            ),
        }),
        PaginationMode::Infinite if meta.has_more_after(page) => {
            Footer::LoadingMore(LOADING_MORE_TEXT)
        }
        PaginationMode::Infinite => Footer::None,
    }
}
