// Domain logic lives here - resolution, aggregation, reporting
pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod providers;
pub mod report;
pub mod resolver;
pub mod source;

pub use aggregator::TaskAggregator;
pub use config::Config;
pub use error::Error;
pub use export::CsvExporter;
pub use models::{
    CombineMode, DateField, Project, ProjectDirectory, Task, TaskFilter, TimeWindow, User,
};
pub use providers::ConduitTracker;
pub use source::TrackerSource;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
