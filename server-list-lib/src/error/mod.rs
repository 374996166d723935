//! Error types

mod api;
mod config;
mod filter;

pub use api::*;
pub use config::*;
pub use filter::*;
