//! Query state for a server-backed list.
//!
//! # Types
//!
//! - [`QueryState`] - What to fetch: page, page size, sort, search, filters
//! - [`QueryStateManager`] - Owns a [`QueryState`] and its mutators
//! - [`FilterConfig`] / [`FilterValue`] - Per-column filter kinds and stored values
//! - [`SortDir`] - Sort direction
//!
//! Request parameters are produced by [`QueryState::to_params`] and read back
//! by [`QueryState::from_params`].

mod filter;
mod order;
mod params;
mod state;

pub use filter::FilterConfig;
pub use filter::FilterControl;
pub use filter::FilterEdit;
pub use filter::FilterValue;
pub use filter::PickerOption;
pub use filter::RangeDate;
pub use filter::SelectOption;
pub use order::SortDir;
pub use params::ExtraParams;
pub use params::Params;
pub use state::QueryDefaults;
pub use state::QueryState;
pub use state::QueryStateManager;
