//! Headless view models.
//!
//! [`ServerList::view`] snapshots the list into plain data a front end can draw
//! without touching engine state: toolbar, sort chips, filter panel, error
//! banner, body and footer. Slots (row actions, bulk actions, custom cells)
//! are already evaluated into strings.

#![warn(missing_docs)]

mod cards;
mod footer;
mod table;

use serde::Serialize;

pub use cards::CardCell;
pub use cards::CardView;
pub use footer::Footer;
pub use footer::PagerView;
pub use table::HeaderCell;
pub use table::TableCell;
pub use table::TableRow;
pub use table::TableView;

use crate::layout::EffectiveLayout;
use crate::layout::resolve_layout;
use crate::list::BulkActionContext;
use crate::list::ServerList;
use crate::query::FilterControl;
use crate::query::SortDir;
use crate::selection::SelectionProps;

/// Body text while the first page is loading.
pub const LOADING_TEXT: &str = "Cargando…";

/// Footer text while more rows can be fetched in infinite mode.
pub const LOADING_MORE_TEXT: &str = "Cargando más…";

/// Label of the card-mode select-all checkbox.
pub const SELECT_PAGE_TEXT: &str = "Seleccionar página";

/// Placeholder of the search box.
pub const SEARCH_PLACEHOLDER: &str = "Buscar…";

/// Default row height of the table, in logical pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 44.0;

/// What the list is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Available width.
    pub width: f64,
    /// Height available to rows.
    pub height: f64,
    /// Vertical scroll offset of the rows.
    pub scroll_offset: f64,
    /// Height of one table row.
    pub row_height: f64,
}

impl Viewport {
    /// A viewport scrolled to the top.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_offset: 0.0,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }

    /// Sets the scroll offset.
    pub fn scrolled(mut self, offset: f64) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Sets the row height.
    pub fn row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }
}

/// Search, page size and action buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolbar {
    /// Current search text.
    pub search: String,
    /// Placeholder of the search box.
    pub search_placeholder: &'static str,
    /// Whether the clear-search button is shown.
    pub show_clear_search: bool,
    /// Rows per page.
    pub per_page: u32,
    /// Choices of the page-size picker.
    pub per_page_options: Vec<u32>,
    /// Label of the filter-panel toggle; `None` when no column filters.
    pub filter_toggle: Option<&'static str>,
    /// Number of selected rows, for the badge.
    pub selected_count: usize,
    /// Output of the bulk-actions slot.
    pub bulk_actions: Vec<String>,
}

/// A sort chip for a sortable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortChip {
    /// Column key sorted by this chip.
    pub key: String,
    /// Column header.
    pub label: String,
    /// Whether this column is the sort key.
    pub active: bool,
    /// Direction of the active chip.
    pub dir: Option<SortDir>,
}

impl SortChip {
    /// Chip text with the direction arrow when active.
    pub fn text(&self) -> String {
        match self.dir {
            Some(dir) => format!("{} {}", self.label, dir.arrow()),
            None => self.label.clone(),
        }
    }
}

/// One field of the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    /// Column key of the filter.
    pub key: String,
    /// Column header.
    pub label: String,
    /// Control to draw, with its current value.
    pub control: FilterControl,
}

/// Select-all checkbox above the cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectAllBar {
    /// Checkbox label.
    pub label: &'static str,
    /// Whether every displayed row is selected.
    pub checked: bool,
}

/// Main area of the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Spinner; nothing loaded yet.
    Loading(&'static str),
    /// No rows.
    Empty(String),
    /// One card per row.
    Cards(Vec<CardView>),
    /// Virtualized table.
    Table(TableView),
}

/// Full snapshot of a list ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    /// Layout the body is drawn in.
    pub layout: EffectiveLayout,
    /// Search, page size and actions.
    pub toolbar: Toolbar,
    /// One chip per sortable column.
    pub sort_chips: Vec<SortChip>,
    /// Filter panel fields; empty while the panel is closed.
    pub filters: Vec<FilterField>,
    /// Error banner; shown above the body whatever the body is.
    pub error: Option<String>,
    /// Select-all bar, in selectable card layouts with rows.
    pub select_all: Option<SelectAllBar>,
    /// Main area.
    pub body: Body,
    /// Pager or load-more spinner.
    pub footer: Footer,
}

impl<T: Serialize + Send + Sync + 'static> ServerList<T> {
    /// Builds the view of the list for `viewport`, with `selection` as the
    /// screen's current selection.
    ///
    /// Row-key, row-action, bulk-action and cell callbacks run while the
    /// list state is locked; they must not call back into the list.
    pub fn view(&self, viewport: Viewport, selection: &SelectionProps<'_>) -> ListView {
        let inner = &self.inner;
        let options = &inner.options;
        let state = self.read();
        let query = state.query.state();
        let rows = state.fetch.data();
        let layout = resolve_layout(options.layout, viewport.width);
        let selected_count = selection.count();

        let toolbar = Toolbar {
            search: query.search.clone(),
            search_placeholder: SEARCH_PLACEHOLDER,
            show_clear_search: !query.search.is_empty(),
            per_page: query.per_page,
            per_page_options: options.per_page_options.clone(),
            filter_toggle: inner.columns.iter().any(|c| c.filter.is_some()).then_some(
                if state.filters_open {
                    "Ocultar filtros"
                } else {
                    "Filtros"
                },
            ),
            selected_count,
            bulk_actions: inner
                .bulk_actions
                .as_ref()
                .map(|f| f(BulkActionContext { selected_count }))
                .unwrap_or_default(),
        };

        let sort_chips = inner
            .columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| {
                let active = query.sort_by == c.key;
                SortChip {
                    key: c.key.clone(),
                    label: c.header.clone(),
                    active,
                    dir: active.then_some(query.sort_dir),
                }
            })
            .collect();

        let filters = if state.filters_open {
            inner
                .columns
                .iter()
                .filter_map(|c| {
                    let config = c.filter.as_ref()?;
                    Some(FilterField {
                        key: c.key.clone(),
                        label: c.header.clone(),
                        control: config.control(query.filter(&c.key)),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let keys: Vec<_> = rows.iter().map(|r| (inner.row_key)(r)).collect();
        let all_selected =
            options.selectable && crate::selection::all_selected(&keys, selection.keys);

        let select_all = (options.selectable
            && layout == EffectiveLayout::Cards
            && !rows.is_empty())
        .then_some(SelectAllBar {
            label: SELECT_PAGE_TEXT,
            checked: all_selected,
        });

        let body = if state.fetch.is_loading() && rows.is_empty() {
            Body::Loading(LOADING_TEXT)
        } else if rows.is_empty() {
            Body::Empty(options.empty_text.clone())
        } else {
            match layout {
                EffectiveLayout::Cards => Body::Cards(cards::build(inner, rows, &keys, selection)),
                EffectiveLayout::Table => Body::Table(table::build(
                    inner,
                    query,
                    rows,
                    &keys,
                    selection,
                    all_selected,
                    viewport,
                )),
            }
        };

        let footer = footer::build(
            options.pagination,
            state.fetch.meta(),
            query.page,
            state.fetch.is_loading(),
        );

        let error = state.fetch.error();
        ListView {
            layout,
            toolbar,
            sort_chips,
            filters,
            error: (!error.is_empty()).then(|| error.to_string()),
            select_all,
            body,
            footer,
        }
    }
}
