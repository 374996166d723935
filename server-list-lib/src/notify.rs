//! De-duplicated query change notifications.

use crate::query::QueryState;

/// Remembers the last state reported to the screen.
///
/// States are rebuilt on every evaluation, so comparison is structural.
#[derive(Debug, Clone, Default)]
pub struct QueryNotifier {
    last: Option<QueryState>,
}

impl QueryNotifier {
    /// Creates a notifier that has reported nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last reported state.
    pub fn last(&self) -> Option<&QueryState> {
        self.last.as_ref()
    }

    /// Returns the state to report if it differs from the last one, and
    /// records it as the new baseline.
    pub fn observe(&mut self, state: &QueryState) -> Option<QueryState> {
        if self.last.as_ref() == Some(state) {
            log::trace!("Query unchanged, notification suppressed");
            return None;
        }
        self.last = Some(state.clone());
        Some(state.clone())
    }
}
