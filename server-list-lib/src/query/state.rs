//! Query state and its mutators.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::FilterConfig;
use super::FilterEdit;
use super::FilterValue;
use super::SortDir;
use crate::column::Column;
use crate::error::FilterError;

/// The complete description of what the list is asking the server for.
///
/// Two states are equal iff every field is equal, filters compared deeply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    /// Requested page, 1-based.
    pub page: u32,
    /// Rows per page, always > 0.
    pub per_page: u32,
    /// Sort key; empty for server default order.
    pub sort_by: String,
    /// Sort direction.
    pub sort_dir: SortDir,
    /// Free-text search.
    pub search: String,
    /// Filter values by column key; `None` is an explicitly cleared filter.
    pub filters: BTreeMap<String, Option<FilterValue>>,
}

impl QueryState {
    /// The state a list starts in and returns to on clear-all.
    pub fn initial(defaults: &QueryDefaults) -> Self {
        Self {
            page: 1,
            per_page: defaults.per_page.max(1),
            sort_by: defaults.sort_by.clone(),
            sort_dir: defaults.sort_dir,
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// The stored value of a filter, if any.
    pub fn filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key).and_then(Option::as_ref)
    }
}

/// Caller-supplied starting values, restored by clear-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    /// Initial rows per page.
    pub per_page: u32,
    /// Initial sort key.
    pub sort_by: String,
    /// Initial sort direction.
    pub sort_dir: SortDir,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            per_page: 10,
            sort_by: String::new(),
            sort_dir: SortDir::Asc,
        }
    }
}

/// Owns the [`QueryState`] and the pending-append flag.
///
/// Every mutation of search, page size, sort or filters also resets the page
/// to 1 and cancels a pending append, so a new filter is never combined with
/// a page number from the previous result set.
#[derive(Debug, Clone)]
pub struct QueryStateManager {
    state: QueryState,
    defaults: QueryDefaults,
    merge_next: bool,
}

impl QueryStateManager {
    /// Creates a manager at the initial state for `defaults`.
    pub fn new(defaults: QueryDefaults) -> Self {
        Self {
            state: QueryState::initial(&defaults),
            defaults,
            merge_next: false,
        }
    }

    /// The current state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// The defaults restored by [`clear_all`](Self::clear_all).
    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    /// Whether the next fetch should append instead of replace.
    pub fn merge_next(&self) -> bool {
        self.merge_next
    }

    /// Reads and clears the pending-append flag.
    pub fn take_merge_next(&mut self) -> bool {
        std::mem::take(&mut self.merge_next)
    }

    /// Cancels a pending append.
    pub fn cancel_merge(&mut self) {
        self.merge_next = false;
    }

    fn reset_paging(&mut self) {
        self.state.page = 1;
        self.merge_next = false;
    }

    /// Sets the search text.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search = text.into();
        self.reset_paging();
    }

    /// Sets rows per page. Zero is raised to 1.
    pub fn set_per_page(&mut self, per_page: u32) {
        self.state.per_page = per_page.max(1);
        self.reset_paging();
    }

    /// Sorts by `column`.
    ///
    /// No-op for a column that is not sortable. The active column flips
    /// direction; any other column becomes active ascending.
    ///
    /// Returns `true` if the state changed.
    pub fn request_sort<T>(&mut self, column: &Column<T>) -> bool {
        if !column.sortable {
            return false;
        }
        if self.state.sort_by == column.key {
            self.state.sort_dir = self.state.sort_dir.flipped();
        } else {
            self.state.sort_by = column.key.clone();
            self.state.sort_dir = SortDir::Asc;
        }
        self.reset_paging();
        true
    }

    /// Stores `value` for filter `key`, leaving other filters alone.
    ///
    /// A non-finite number is stored as no value.
    pub fn set_filter(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        let value = value.filter(|v| !matches!(v, FilterValue::Number(n) if !n.is_finite()));
        self.state.filters.insert(key.into(), value);
        self.reset_paging();
    }

    /// Applies a control edit to filter `key` of kind `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`FilterConfig::apply`] errors; the state is unchanged then.
    pub fn edit_filter(
        &mut self,
        key: &str,
        config: &FilterConfig,
        edit: FilterEdit,
    ) -> Result<(), FilterError> {
        let value = config.apply(self.state.filter(key), edit)?;
        self.set_filter(key, value);
        Ok(())
    }

    /// Returns every dimension to the caller-supplied defaults.
    pub fn clear_all(&mut self) {
        self.state = QueryState::initial(&self.defaults);
        self.merge_next = false;
    }

    /// Moves to `page` (at least 1) as a replacing fetch.
    pub fn set_page(&mut self, page: u32) {
        self.state.page = page.max(1);
        self.merge_next = false;
    }

    /// Moves to the next page and marks the fetch as an append.
    pub fn advance_for_append(&mut self) {
        self.state.page += 1;
        self.merge_next = true;
    }

    /// Replaces the whole state, e.g. one restored from a deep link.
    pub fn restore(&mut self, state: QueryState) {
        self.state = state;
        self.state.page = self.state.page.max(1);
        self.state.per_page = self.state.per_page.max(1);
        self.merge_next = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> QueryStateManager {
        QueryStateManager::new(QueryDefaults {
            per_page: 20,
            sort_by: "created_at".into(),
            sort_dir: SortDir::Desc,
        })
    }

    fn col(key: &str) -> Column<()> {
        Column::new(key, key)
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut m = manager();
        let name = col("name").sortable();
        m.set_page(4);

        assert!(m.request_sort(&name));
        assert_eq!(m.state().sort_by, "name");
        assert_eq!(m.state().sort_dir, SortDir::Asc);
        assert_eq!(m.state().page, 1);

        m.request_sort(&name);
        assert_eq!(m.state().sort_dir, SortDir::Desc);
        m.request_sort(&name);
        assert_eq!(m.state().sort_dir, SortDir::Asc);
    }

    #[test]
    fn test_sort_on_unsortable_is_noop() {
        let mut m = manager();
        m.set_page(3);
        let before = m.state().clone();
        assert!(!m.request_sort(&col("email")));
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn test_mutators_reset_page_and_merge() {
        let mut m = manager();

        m.advance_for_append();
        assert!(m.merge_next());
        m.set_search("a");
        assert_eq!(m.state().page, 1);
        assert!(!m.merge_next());

        m.advance_for_append();
        m.set_per_page(50);
        assert_eq!((m.state().page, m.state().per_page), (1, 50));
        assert!(!m.merge_next());

        m.advance_for_append();
        m.set_filter("role", Some(FilterValue::Number(2.0)));
        assert_eq!(m.state().page, 1);
        assert!(!m.merge_next());
    }

    #[test]
    fn test_set_filter_keeps_others() {
        let mut m = manager();
        m.set_filter("a", Some("x".into()));
        m.set_filter("b", Some(true.into()));
        m.set_filter("a", None);
        assert_eq!(m.state().filter("b"), Some(&FilterValue::Bool(true)));
        assert_eq!(m.state().filters.get("a"), Some(&None));
    }

    #[test]
    fn test_clear_all_restores_defaults() {
        let mut m = manager();
        m.request_sort(&col("name").sortable());
        m.set_per_page(5);
        m.set_search("q");
        m.set_filter("a", Some("x".into()));
        m.set_page(7);
        m.advance_for_append();

        m.clear_all();
        let s = m.state();
        assert_eq!(s.sort_by, "created_at");
        assert_eq!(s.sort_dir, SortDir::Desc);
        assert_eq!(s.per_page, 20);
        assert_eq!(s.page, 1);
        assert!(s.search.is_empty());
        assert!(s.filters.is_empty());
        assert!(!m.merge_next());
    }

    #[test]
    fn test_take_merge_next() {
        let mut m = manager();
        m.advance_for_append();
        assert_eq!(m.state().page, 2);
        assert!(m.take_merge_next());
        assert!(!m.take_merge_next());
    }

    #[test]
    fn test_edit_filter_error_leaves_state() {
        let mut m = manager();
        m.set_page(2);
        let before = m.state().clone();
        assert!(m.edit_filter("age", &FilterConfig::number(), FilterEdit::Input("abc".into())).is_err());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn test_non_finite_number_filter_is_cleared() {
        let mut m = manager();
        m.set_filter("age", Some(FilterValue::Number(f64::NAN)));
        assert_eq!(m.state().filters.get("age"), Some(&None));
        assert_eq!(m.state(), &m.state().clone());

        assert!(m.edit_filter("age", &FilterConfig::number(), FilterEdit::Input("NaN".into())).is_err());
        assert_eq!(m.state().filter("age"), None);
    }
}
