//! Filter input errors

/// Errors raised when a filter control receives input it cannot store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Input for a number filter did not parse as a number.
    #[error("Not a number: {0}")]
    InvalidNumber(String),

    /// No column with this key declares a filter.
    #[error("No filter for column: {0}")]
    UnknownFilter(String),

    /// The edit does not apply to this kind of filter.
    #[error("Edit does not apply to a {kind} filter")]
    MismatchedEdit {
        /// The filter kind that received the edit.
        kind: &'static str,
    },
}
