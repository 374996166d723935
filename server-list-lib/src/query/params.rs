//! Request parameter generation and parsing.

use std::collections::BTreeMap;

use super::FilterConfig;
use super::FilterValue;
use super::QueryDefaults;
use super::QueryState;
use super::RangeDate;
use crate::column::Column;

/// Ordered query-string pairs sent with the list request.
pub type Params = Vec<(String, String)>;

/// Static parameters a screen adds to every request (e.g. a tenant id).
///
/// Sent after the paging/sort/search parameters and before filters. A key
/// that collides with one of those replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraParams(BTreeMap<String, String>);

impl ExtraParams {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Removes a parameter.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for ExtraParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extra = ExtraParams::new();
        for (k, v) in iter {
            extra.insert(k, v);
        }
        extra
    }
}

impl QueryState {
    /// Serializes this state plus `extra` into request parameters.
    ///
    /// Order: `page`, `perPage`, `sortBy` (if set), `sortDir`, `search` (if
    /// set), extras, then filters in key order. Empty and null filters are
    /// omitted.
    pub fn to_params(&self, extra: &ExtraParams) -> Params {
        let mut params: Params = vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ];
        if !self.sort_by.is_empty() {
            params.push(("sortBy".to_string(), self.sort_by.clone()));
        }
        params.push(("sortDir".to_string(), self.sort_dir.as_str().to_string()));
        if !self.search.is_empty() {
            params.push(("search".to_string(), self.search.clone()));
        }

        for (key, value) in extra.iter() {
            match params.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => params.push((key.to_string(), value.to_string())),
            }
        }

        for (key, value) in &self.filters {
            if let Some(value) = value {
                value.write_params(key, &mut params);
            }
        }
        params
    }

    /// Rebuilds a state from request parameters, e.g. from a deep link.
    ///
    /// Filter values are typed through each column's filter kind; filters for
    /// keys without a filtered column are ignored, as are unknown parameters.
    /// Missing or invalid paging/sort values fall back to `defaults`.
    pub fn from_params<T>(
        params: &[(String, String)],
        columns: &[Column<T>],
        defaults: &QueryDefaults,
    ) -> QueryState {
        let mut state = QueryState::initial(defaults);
        let filter_of = |key: &str| {
            columns
                .iter()
                .find(|c| c.key == key)
                .and_then(|c| c.filter.as_ref())
        };

        for (name, raw) in params {
            match name.as_str() {
                "page" => state.page = raw.parse().ok().filter(|&p| p >= 1).unwrap_or(1),
                "perPage" => {
                    state.per_page = raw
                        .parse()
                        .ok()
                        .filter(|&n| n > 0)
                        .unwrap_or(defaults.per_page)
                }
                "sortBy" => state.sort_by = raw.clone(),
                "sortDir" => state.sort_dir = raw.parse().unwrap_or(defaults.sort_dir),
                "search" => state.search = raw.clone(),
                other => {
                    let Some((key, end)) = parse_filter_name(other) else {
                        continue;
                    };
                    let Some(config) = filter_of(key) else {
                        continue;
                    };
                    match (config, end) {
                        (FilterConfig::RangeDate, Some(end)) => {
                            let slot = state
                                .filters
                                .entry(key.to_string())
                                .or_insert_with(|| Some(FilterValue::Range(RangeDate::default())));
                            if let Some(FilterValue::Range(range)) = slot {
                                match end {
                                    RangeEnd::From => range.from = raw.clone(),
                                    RangeEnd::To => range.to = raw.clone(),
                                }
                            }
                        }
                        (FilterConfig::RangeDate, None) | (_, Some(_)) => {}
                        (config, None) => {
                            if let Some(value) = config.parse_param(raw) {
                                state.filters.insert(key.to_string(), Some(value));
                            }
                        }
                    }
                }
            }
        }
        state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeEnd {
    From,
    To,
}

/// Splits `filters[key]` / `filters[key][from]` / `filters[key][to]`.
fn parse_filter_name(name: &str) -> Option<(&str, Option<RangeEnd>)> {
    let rest = name.strip_prefix("filters[")?;
    let close = rest.find(']')?;
    let key = &rest[..close];
    let end = match &rest[close + 1..] {
        "" => None,
        "[from]" => Some(RangeEnd::From),
        "[to]" => Some(RangeEnd::To),
        _ => return None,
    };
    (!key.is_empty()).then_some((key, end))
}
