//! Server-backed list engine
//!
//! A paginated, sortable, filterable and selectable list over a REST endpoint
//! answering `GET` with `{data, meta}`. The engine owns query state, fetch
//! coordination and layout; drawing is left to the front end through the
//! view models in [`render`].

pub mod column;
pub mod config;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod notify;
pub mod query;
pub mod render;
pub mod response;
pub mod selection;

mod client;
mod handle;
mod list;

pub use client::*;
pub use column::Alignment;
pub use column::Column;
pub use column::ColumnWidth;
pub use config::ClientConfig;
pub use config::ListOptions;
pub use config::PaginationMode;
pub use fetch::FetchOutcome;
pub use handle::ServerListHandle;
pub use layout::LayoutMode;
pub use list::*;
pub use query::ExtraParams;
pub use query::FilterConfig;
pub use query::FilterEdit;
pub use query::FilterValue;
pub use query::QueryState;
pub use query::SortDir;
pub use render::ListView;
pub use render::Viewport;
pub use response::PageMeta;
pub use response::ServerResponse;
pub use selection::RowKey;
pub use selection::SelectionProps;
