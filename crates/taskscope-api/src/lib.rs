// Conduit wire client for Phabricator-compatible trackers
pub mod conduit;
pub mod types;

// Re-export common types
pub use conduit::{Conduit, ConduitClient, ConduitError, PagedQuery, ParamMap};
pub use types::{LookupEntry, ProjectData, TaskData, UserData};
