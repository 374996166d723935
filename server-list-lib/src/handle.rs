//! Imperative surface for parent screens.

use async_trait::async_trait;

use crate::fetch::FetchOutcome;
use crate::list::ServerList;
use crate::query::QueryState;

/// What a parent screen may do with a list it does not otherwise drive.
///
/// Object safe and independent of the row type, so a screen can hold an
/// `Arc<dyn ServerListHandle>` next to lists of different rows.
#[async_trait]
pub trait ServerListHandle: Send + Sync {
    /// Re-fetches with the current query, replacing the rows.
    async fn reload(&self) -> FetchOutcome;

    /// Snapshot of the current query.
    fn get_query(&self) -> QueryState;
}

#[async_trait]
impl<T: Send + Sync + 'static> ServerListHandle for ServerList<T> {
    async fn reload(&self) -> FetchOutcome {
        ServerList::reload(self).await
    }

    fn get_query(&self) -> QueryState {
        self.query()
    }
}
