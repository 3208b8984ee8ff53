use crate::models::{Project, Task, TaskFilter, User};
use crate::Result;

/// Trait between domain logic and the wire client - makes testing easier
///
/// Resolution and aggregation only ever talk to the tracker through this
/// trait, so tests can script responses without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrackerSource: Send + Sync {
    /// The full project listing, in listing order.
    async fn projects(&self) -> Result<Vec<Project>>;

    /// The full user listing, newest accounts first.
    async fn users(&self) -> Result<Vec<User>>;

    /// Exact-match lookup of one username.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Generic name-to-PHID lookup; `None` when nothing matched.
    async fn lookup_phid(&self, name: &str) -> Result<Option<String>>;

    /// One task query, paginated to exhaustion, in server order.
    async fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
}
