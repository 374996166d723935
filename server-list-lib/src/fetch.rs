//! Fetch coordination: the `data`/`meta`/`error`/`loading` aggregate.
//!
//! A fetch is split in two synchronous halves around the network call:
//! [`FetchState::begin`] issues a [`FetchTicket`] and [`FetchState::complete`]
//! applies its result. Each ticket carries a generation number; only the
//! latest issued generation may write, so an older request finishing late
//! cannot overwrite a newer result.

use std::collections::HashSet;

use crate::error::ApiError;
use crate::query::ExtraParams;
use crate::query::Params;
use crate::query::QueryState;
use crate::response::PageMeta;
use crate::response::ServerResponse;
use crate::selection::RowKey;

/// An issued request, to be handed back to [`FetchState::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// Generation of this request.
    pub generation: u64,
    /// Request parameters.
    pub params: Params,
    /// Whether the result is appended rather than replacing.
    pub merge: bool,
    /// Page size of the request, used for zeroed metadata.
    pub per_page: u32,
}

/// What [`FetchState::complete`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows replaced the previous rows.
    Replaced {
        /// Rows now held.
        rows: usize,
    },
    /// Rows were appended.
    Appended {
        /// Rows that were new by key.
        added: usize,
    },
    /// The request failed; the message is now the error banner.
    Failed {
        /// Banner message.
        message: String,
    },
    /// A newer request was issued since; the result was discarded.
    Stale,
}

/// Rows, metadata and status flags of a list.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    data: Vec<T>,
    meta: PageMeta,
    error: String,
    loading: bool,
    refreshing: bool,
    generation: u64,
    issued: Option<(QueryState, ExtraParams)>,
}

impl<T> FetchState<T> {
    /// Empty state with zeroed metadata.
    pub fn new(per_page: u32) -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::empty(per_page),
            error: String::new(),
            loading: false,
            refreshing: false,
            generation: 0,
            issued: None,
        }
    }

    /// Rows currently held.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Metadata of the last applied response.
    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Error banner text; empty when there is no error.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a pull-to-refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub(crate) fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    /// Generation of the latest issued request (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the latest issued request was for exactly this
    /// query and these extras.
    pub fn is_issued_for(&self, query: &QueryState, extra: &ExtraParams) -> bool {
        self.issued
            .as_ref()
            .is_some_and(|(q, e)| q == query && e == extra)
    }

    /// Records `query` plus `extra` as already requested without fetching,
    /// for rows that were loaded under it.
    pub(crate) fn mark_issued(&mut self, query: &QueryState, extra: &ExtraParams) {
        self.issued = Some((query.clone(), extra.clone()));
    }

    /// Issues a request for `query` plus `extra`.
    ///
    /// Sets `loading`, clears the error and bumps the generation.
    pub fn begin(&mut self, query: &QueryState, extra: &ExtraParams, merge: bool) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.error.clear();
        self.issued = Some((query.clone(), extra.clone()));
        FetchTicket {
            generation: self.generation,
            params: query.to_params(extra),
            merge,
            per_page: query.per_page,
        }
    }

    /// Applies the result of `ticket`.
    ///
    /// On success rows replace or append (deduplicated by `row_key`) and
    /// `meta` is taken from the response. On failure the banner is set; a
    /// replacing fetch also empties the rows and zeroes `meta`, an appending
    /// one keeps what was already loaded. Either way `loading` and
    /// `refreshing` end. Results of superseded tickets are dropped without
    /// touching anything.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ServerResponse<T>, ApiError>,
        row_key: impl Fn(&T) -> RowKey,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale response (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;
        self.refreshing = false;

        match result {
            Ok(response) => {
                let meta = response.meta_or_empty(ticket.per_page);
                let outcome = if ticket.merge {
                    let added = merge_rows(&mut self.data, response.data, row_key);
                    FetchOutcome::Appended { added }
                } else {
                    self.data = response.data;
                    FetchOutcome::Replaced {
                        rows: self.data.len(),
                    }
                };
                self.meta = meta;
                outcome
            }
            Err(err) => {
                log::warn!("Server list fetch failed: {err}");
                let message = err.banner_message();
                self.error = message.clone();
                if !ticket.merge {
                    self.data.clear();
                    self.meta = PageMeta::empty(ticket.per_page);
                }
                FetchOutcome::Failed { message }
            }
        }
    }
}

/// Appends rows whose key is not present yet, keeping existing order.
///
/// Returns the number of rows appended.
pub fn merge_rows<T>(existing: &mut Vec<T>, incoming: Vec<T>, row_key: impl Fn(&T) -> RowKey) -> usize {
    let mut seen: HashSet<RowKey> = existing.iter().map(&row_key).collect();
    let before = existing.len();
    for row in incoming {
        if seen.insert(row_key(&row)) {
            existing.push(row);
        }
    }
    existing.len() - before
}
