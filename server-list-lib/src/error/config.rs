//! Configuration error types

/// Errors raised while assembling a list or its client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Two columns share the same key.
    #[error("Duplicate column key: {0}")]
    DuplicateColumn(String),

    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// A column width is neither a pixel count nor a percentage.
    #[error("Invalid column width: {0}")]
    InvalidWidth(String),
}
