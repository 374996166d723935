//! List options and client configuration.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::layout::DEFAULT_MIN_COL_WIDTH;
use crate::layout::LayoutMode;
use crate::query::QueryDefaults;
use crate::query::SortDir;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "SERVER_LIST_BASE_URL";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "SERVER_LIST_TIMEOUT_SECS";

/// How further pages are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Previous/Next footer; each page replaces the last.
    #[default]
    Pager,
    /// Reaching the end loads the next page and appends it.
    Infinite,
}

/// Presentation and behaviour options of a list.
///
/// Fixed for the lifetime of the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListOptions {
    /// Initial rows per page.
    pub initial_per_page: u32,
    /// Initial sort key.
    pub initial_sort_by: String,
    /// Initial sort direction.
    pub initial_sort_dir: SortDir,
    /// Whether rows carry checkboxes.
    pub selectable: bool,
    /// Requested layout.
    pub layout: LayoutMode,
    /// Minimum width of a table column.
    pub min_col_width: f64,
    /// Whether the table header stays outside the scrolling rows.
    pub sticky_header: bool,
    /// Pagination strategy.
    pub pagination: PaginationMode,
    /// Text shown when there are no rows.
    pub empty_text: String,
    /// Choices of the page-size picker.
    pub per_page_options: Vec<u32>,
    /// Whether cards are drawn as separate tiles (cards layout only).
    pub card: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            initial_per_page: 10,
            initial_sort_by: String::new(),
            initial_sort_dir: SortDir::Asc,
            selectable: false,
            layout: LayoutMode::Auto,
            min_col_width: DEFAULT_MIN_COL_WIDTH,
            sticky_header: true,
            pagination: PaginationMode::Pager,
            empty_text: "Sin resultados".to_string(),
            per_page_options: vec![5, 10, 20, 50, 100],
            card: true,
        }
    }
}

impl ListOptions {
    /// The query defaults these options describe.
    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            per_page: if self.initial_per_page == 0 {
                10
            } else {
                self.initial_per_page
            },
            sort_by: self.initial_sort_by.clone(),
            sort_dir: self.initial_sort_dir,
        }
    }
}

/// Connection settings for [`ServerListClient`](crate::ServerListClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL endpoints are resolved against.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads [`ENV_BASE_URL`] and, if set, [`ENV_TIMEOUT_SECS`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingVar`] without a base URL,
    /// [`ConfigError::InvalidVar`] for a timeout that is not a whole number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(ENV_BASE_URL))?;
        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidVar {
                    name: ENV_TIMEOUT_SECS,
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT,
        };
        Ok(Self { base_url, timeout })
    }
}
