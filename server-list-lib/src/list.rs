//! The server-backed list engine.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use crate::client::Fetcher;
use crate::column::Column;
use crate::column::validate_columns;
use crate::config::ListOptions;
use crate::config::PaginationMode;
use crate::error::ConfigError;
use crate::error::FilterError;
use crate::fetch::FetchOutcome;
use crate::fetch::FetchState;
use crate::notify::QueryNotifier;
use crate::query::ExtraParams;
use crate::query::FilterEdit;
use crate::query::FilterValue;
use crate::query::QueryState;
use crate::query::QueryStateManager;
use crate::response::PageMeta;
use crate::selection;
use crate::selection::RowKey;
use crate::selection::SelectionProps;

/// Extracts the stable key of a row.
pub type RowKeyFn<T> = Arc<dyn Fn(&T) -> RowKey + Send + Sync>;

/// Called with each distinct settled query.
pub type QueryChangeFn = Arc<dyn Fn(&QueryState) + Send + Sync>;

/// Produces the row-actions slot content for a row.
pub type RowActionsFn<T> = Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>;

/// Produces the bulk-actions slot content.
pub type BulkActionsFn = Arc<dyn Fn(BulkActionContext) -> Vec<String> + Send + Sync>;

/// What the bulk-actions slot is told about the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkActionContext {
    /// Number of selected keys.
    pub selected_count: usize,
}

/// Mutable part of a list, behind one lock so every write is serialized.
pub(crate) struct ListState<T> {
    pub(crate) query: QueryStateManager,
    pub(crate) fetch: FetchState<T>,
    pub(crate) extra: ExtraParams,
    pub(crate) notifier: QueryNotifier,
    pub(crate) filters_open: bool,
}

pub(crate) struct ServerListInner<T> {
    pub(crate) fetcher: Arc<dyn Fetcher<T>>,
    pub(crate) endpoint: String,
    pub(crate) columns: Vec<Column<T>>,
    pub(crate) row_key: RowKeyFn<T>,
    pub(crate) options: ListOptions,
    pub(crate) row_actions: Option<RowActionsFn<T>>,
    pub(crate) bulk_actions: Option<BulkActionsFn>,
    pub(crate) on_query_change: Option<QueryChangeFn>,
    pub(crate) state: RwLock<ListState<T>>,
}

/// A paginated, sortable, filterable list backed by a REST endpoint.
///
/// `ServerList` is a cheap-to-clone handle; clones share state. Mutators
/// change the query synchronously. [`settle`](Self::settle) then plays the
/// role of the reactive effect: it reports a changed query to the screen and
/// fetches if the query differs from the one last requested.
///
/// # Example
///
/// ```ignore
/// let list = ServerList::builder(client, "/users", |u: &User| u.id.into())
///     .columns(vec![Column::new("name", "Nombre").sortable()])
///     .on_query_change(|q| save_deep_link(q))
///     .build()?;
///
/// list.settle().await;           // initial fetch
/// list.set_search("ana");
/// list.settle().await;           // page 1 of the search
/// ```
pub struct ServerList<T> {
    pub(crate) inner: Arc<ServerListInner<T>>,
}

impl<T> Clone for ServerList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ServerList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerList")
            .field("endpoint", &self.inner.endpoint)
            .field("columns", &self.inner.columns.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<T: Send + Sync + 'static> ServerList<T> {
    /// Starts building a list over `endpoint` served by `fetcher`.
    ///
    /// `row_key` runs with the list state locked and must not call back into
    /// the list.
    pub fn builder(
        fetcher: impl Fetcher<T> + 'static,
        endpoint: impl Into<String>,
        row_key: impl Fn(&T) -> RowKey + Send + Sync + 'static,
    ) -> ServerListBuilder<T> {
        ServerListBuilder {
            fetcher: Arc::new(fetcher),
            endpoint: endpoint.into(),
            row_key: Arc::new(row_key),
            columns: Vec::new(),
            options: ListOptions::default(),
            extra: ExtraParams::new(),
            row_actions: None,
            bulk_actions: None,
            on_query_change: None,
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ListState<T>> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ListState<T>> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The endpoint this list fetches.
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Column definitions.
    pub fn columns(&self) -> &[Column<T>] {
        &self.inner.columns
    }

    /// List options.
    pub fn options(&self) -> &ListOptions {
        &self.inner.options
    }

    /// Snapshot of the current query, e.g. for deep links.
    pub fn query(&self) -> QueryState {
        self.read().query.state().clone()
    }

    /// Metadata of the last applied response.
    pub fn meta(&self) -> PageMeta {
        *self.read().fetch.meta()
    }

    /// Error banner text; empty when there is no error.
    pub fn error(&self) -> String {
        self.read().fetch.error().to_string()
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.read().fetch.is_loading()
    }

    /// Whether a pull-to-refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.read().fetch.is_refreshing()
    }

    /// Whether the next fetch will append.
    pub fn merge_pending(&self) -> bool {
        self.read().query.merge_next()
    }

    /// Whether the filter panel is open.
    pub fn filters_open(&self) -> bool {
        self.read().filters_open
    }

    /// Static request parameters.
    pub fn extra_params(&self) -> ExtraParams {
        self.read().extra.clone()
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.read().fetch.data().len()
    }

    /// Returns `true` if no rows are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of the rows held, in display order.
    pub fn row_keys(&self) -> Vec<RowKey> {
        self.read()
            .fetch
            .data()
            .iter()
            .map(|r| (self.inner.row_key)(r))
            .collect()
    }

    /// Runs `f` over the rows held.
    pub fn with_rows<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.read().fetch.data())
    }

    /// Copy of the rows held.
    pub fn rows(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.with_rows(<[T]>::to_vec)
    }

    // -------------------------------------------------------------------------
    // Query mutators
    // -------------------------------------------------------------------------

    /// Sets the search text; back to page 1.
    pub fn set_search(&self, text: impl Into<String>) {
        self.write().query.set_search(text);
    }

    /// Sets rows per page; back to page 1.
    pub fn set_per_page(&self, per_page: u32) {
        self.write().query.set_per_page(per_page);
    }

    /// Sorts by the column with `key`.
    ///
    /// Unknown or unsortable columns are ignored. Returns `true` if the query
    /// changed.
    pub fn request_sort(&self, key: &str) -> bool {
        let Some(column) = self.inner.columns.iter().find(|c| c.key == key) else {
            return false;
        };
        self.write().query.request_sort(column)
    }

    /// Stores a filter value directly; back to page 1.
    pub fn set_filter(&self, key: impl Into<String>, value: Option<FilterValue>) {
        self.write().query.set_filter(key, value);
    }

    /// Applies a filter-control edit to the column with `key`.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownFilter`] if no column with that key declares a
    /// filter, otherwise whatever the filter kind rejects.
    pub fn edit_filter(&self, key: &str, edit: FilterEdit) -> Result<(), FilterError> {
        let config = self
            .inner
            .columns
            .iter()
            .find(|c| c.key == key)
            .and_then(|c| c.filter.as_ref())
            .ok_or_else(|| FilterError::UnknownFilter(key.to_string()))?;
        self.write().query.edit_filter(key, config, edit)
    }

    /// Resets search, sort, page size and filters to the initial options.
    pub fn clear_all(&self) {
        self.write().query.clear_all();
    }

    /// Replaces the query, e.g. with one restored from a deep link.
    pub fn restore_query(&self, state: QueryState) {
        self.write().query.restore(state);
    }

    /// Replaces the static request parameters.
    pub fn set_extra_params(&self, extra: ExtraParams) {
        self.write().extra = extra;
    }

    /// Opens or closes the filter panel. Returns the new state.
    pub fn toggle_filters(&self) -> bool {
        let mut state = self.write();
        state.filters_open = !state.filters_open;
        state.filters_open
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Whether "Previous" is enabled.
    pub fn can_go_prev(&self) -> bool {
        let state = self.read();
        state.query.state().page > 1 && !state.fetch.is_loading()
    }

    /// Whether "Next" is enabled.
    pub fn can_go_next(&self) -> bool {
        let state = self.read();
        state.query.state().page < state.fetch.meta().last_page && !state.fetch.is_loading()
    }

    /// Moves one page back. Returns `false` if disabled.
    pub fn prev_page(&self) -> bool {
        let mut state = self.write();
        let page = state.query.state().page;
        if page <= 1 || state.fetch.is_loading() {
            return false;
        }
        state.query.set_page(page - 1);
        true
    }

    /// Moves one page forward, not past the last page. Returns `false` if
    /// disabled.
    pub fn next_page(&self) -> bool {
        let mut state = self.write();
        let page = state.query.state().page;
        let last = state.fetch.meta().last_page;
        if page >= last || state.fetch.is_loading() {
            return false;
        }
        state.query.set_page((page + 1).min(last));
        true
    }

    /// Whether more rows can be loaded by scrolling (infinite mode).
    pub fn has_more(&self) -> bool {
        let state = self.read();
        self.inner.options.pagination == PaginationMode::Infinite
            && state.fetch.meta().has_more_after(state.query.state().page)
    }

    /// Scroll reached the end of the rows.
    ///
    /// In infinite mode, when idle and not on the last page, requests the next
    /// page as an append. Returns `true` if it did.
    pub fn end_reached(&self) -> bool {
        if self.inner.options.pagination != PaginationMode::Infinite {
            return false;
        }
        let mut state = self.write();
        if state.fetch.is_loading() || !state.fetch.meta().has_more_after(state.query.state().page) {
            return false;
        }
        state.query.advance_for_append();
        true
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Settles the current query.
    ///
    /// Reports the query to the screen if it differs from the last reported
    /// one, then fetches if it differs from the last requested one. Returns
    /// the fetch outcome if a fetch ran.
    pub async fn settle(&self) -> Option<FetchOutcome> {
        let (changed, stale) = {
            let mut state = self.write();
            let state = &mut *state;
            let changed = state.notifier.observe(state.query.state());
            let stale = !state.fetch.is_issued_for(state.query.state(), &state.extra);
            (changed, stale)
        };

        if let (Some(query), Some(on_change)) = (changed, self.inner.on_query_change.as_ref()) {
            on_change(&query);
        }

        if stale {
            Some(self.fetch_data().await)
        } else {
            None
        }
    }

    /// Fetches the current query again, replacing the rows.
    ///
    /// Does not cancel a request in flight; the newer one wins.
    pub async fn reload(&self) -> FetchOutcome {
        self.write().query.cancel_merge();
        self.fetch_data().await
    }

    /// Pull-to-refresh: like [`reload`](Self::reload) with `refreshing` set
    /// until the latest request in flight completes.
    pub async fn refresh(&self) -> FetchOutcome {
        {
            let mut state = self.write();
            state.fetch.set_refreshing(true);
            state.query.cancel_merge();
        }
        self.fetch_data().await
    }

    async fn fetch_data(&self) -> FetchOutcome {
        let ticket = {
            let mut state = self.write();
            let state = &mut *state;
            let merge = state.query.take_merge_next();
            let query = state.query.state().clone();
            state.fetch.begin(&query, &state.extra, merge)
        };
        log::debug!(
            "Fetching {} (generation {}, merge: {})",
            self.inner.endpoint,
            ticket.generation,
            ticket.merge
        );

        let result = self.inner.fetcher.get(&self.inner.endpoint, &ticket.params).await;

        let row_key = &self.inner.row_key;
        let mut state = self.write();
        let state = &mut *state;
        let outcome = state.fetch.complete(&ticket, result, |row| row_key(row));

        // A failed append goes back to the last loaded page so the next
        // end_reached retries the same page instead of skipping it.
        if ticket.merge && matches!(outcome, FetchOutcome::Failed { .. }) {
            let loaded = state.fetch.meta().current_page;
            if state.query.state().page > loaded {
                state.query.set_page(loaded);
                let query = state.query.state().clone();
                state.fetch.mark_issued(&query, &state.extra);
            }
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Whether every displayed row is in `selected`. Always `false` when the
    /// list is not selectable.
    pub fn all_selected(&self, selected: &HashSet<RowKey>) -> bool {
        self.inner.options.selectable && selection::all_selected(&self.row_keys(), selected)
    }

    /// "Select page" checkbox: selects the displayed rows, or clears if they
    /// already are. Returns `true` if the screen's setter was called.
    pub fn toggle_all(&self, selection: &mut SelectionProps<'_>) -> bool {
        self.inner.options.selectable && selection::toggle_all(&self.row_keys(), selection)
    }

    /// Row checkbox. Returns `true` if the screen's setter was called.
    pub fn toggle_one(&self, key: &RowKey, selection: &mut SelectionProps<'_>) -> bool {
        self.inner.options.selectable && selection::toggle_one(key, selection)
    }

    /// Empties the selection. Returns `true` if the screen's setter was called.
    pub fn clear_selection(&self, selection: &mut SelectionProps<'_>) -> bool {
        selection::clear(selection)
    }
}

/// Builder for [`ServerList`].
pub struct ServerListBuilder<T> {
    fetcher: Arc<dyn Fetcher<T>>,
    endpoint: String,
    row_key: RowKeyFn<T>,
    columns: Vec<Column<T>>,
    options: ListOptions,
    extra: ExtraParams,
    row_actions: Option<RowActionsFn<T>>,
    bulk_actions: Option<BulkActionsFn>,
    on_query_change: Option<QueryChangeFn>,
}

impl<T: Send + Sync + 'static> ServerListBuilder<T> {
    /// Sets the columns.
    pub fn columns(mut self, columns: Vec<Column<T>>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the options.
    pub fn options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets static request parameters.
    pub fn extra_params(mut self, extra: ExtraParams) -> Self {
        self.extra = extra;
        self
    }

    /// Sets the row-actions slot.
    ///
    /// Runs with the list state locked while a view is built; it must not
    /// call back into the list.
    pub fn row_actions(mut self, f: impl Fn(&T) -> Vec<String> + Send + Sync + 'static) -> Self {
        self.row_actions = Some(Arc::new(f));
        self
    }

    /// Sets the bulk-actions slot.
    ///
    /// Runs with the list state locked while a view is built; it must not
    /// call back into the list.
    pub fn bulk_actions(
        mut self,
        f: impl Fn(BulkActionContext) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.bulk_actions = Some(Arc::new(f));
        self
    }

    /// Sets the query change callback.
    ///
    /// Runs with no lock held, so it may read or change the list.
    pub fn on_query_change(mut self, f: impl Fn(&QueryState) + Send + Sync + 'static) -> Self {
        self.on_query_change = Some(Arc::new(f));
        self
    }

    /// Builds the list. Nothing is fetched until the first
    /// [`settle`](ServerList::settle).
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateColumn`] if two columns share a key.
    pub fn build(self) -> Result<ServerList<T>, ConfigError> {
        validate_columns(&self.columns)?;
        let defaults = self.options.query_defaults();
        let per_page = defaults.per_page;
        Ok(ServerList {
            inner: Arc::new(ServerListInner {
                fetcher: self.fetcher,
                endpoint: self.endpoint,
                columns: self.columns,
                row_key: self.row_key,
                options: self.options,
                row_actions: self.row_actions,
                bulk_actions: self.bulk_actions,
                on_query_change: self.on_query_change,
                state: RwLock::new(ListState {
                    query: QueryStateManager::new(defaults),
                    fetch: FetchState::new(per_page),
                    extra: self.extra,
                    notifier: QueryNotifier::new(),
                    filters_open: false,
                }),
            }),
        })
    }
}
