// Tracker backends
pub mod conduit;

pub use conduit::ConduitTracker;
