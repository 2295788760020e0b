// Save Alarm - Core Library
// Entry store, aggregation and configuration shared by the UI binary and tests

pub mod aggregator;
pub mod config;
pub mod db;
pub mod display;
pub mod entities;
pub mod error;
pub mod store;
pub mod tracker;
pub mod validation;

// Re-export commonly used types
pub use aggregator::{
    progress_fraction, progress_fraction_with_ceiling, total_by_source, total_of,
    totals_by_source, Summary, DEFAULT_PROGRESS_CEILING,
};
pub use config::{ConfigError, TrackerConfig};
pub use display::{format_timestamp, format_usd, SourceDisplayTable, SourceStyle};
pub use entities::{Amount, Entry, EntryId, Source, UnknownSource, MAX_SUM};
pub use error::{Result, TrackerError};
pub use store::{RecordStore, StoreChange, StoreObserver, SubscriptionId};
pub use tracker::SavingsTracker;
pub use validation::{parse_sum, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
