#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Monitor configuration types.
pub mod config;
/// Centralized constants used across aggregation, reporting, and transports.
pub mod constants;
/// Resource record and warning types.
pub mod data;
/// Reusable example runners shared by the demo binaries.
pub mod example_apps;
/// Resource feed traits and the in-memory push feed.
pub mod feed;
/// Incremental duplicate aggregation.
pub mod ingestion;
/// Warning sinks.
pub mod reporter;
/// Monitoring session lifecycle.
pub mod session;
/// File-backed feeds (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// URL normalization helpers.
pub mod utils;

mod errors;

pub use config::MonitorConfig;
pub use data::{DuplicateGroup, DuplicateWarning, ResourceRecord};
pub use errors::MonitorError;
pub use feed::{FeedCapability, InMemoryFeed, ResourceFeed, Subscription};
pub use ingestion::DuplicateAggregator;
pub use reporter::{CollectingReporter, ConsoleReporter, Reporter, TracingReporter};
pub use session::{MonitorSession, SessionState};
pub use transport::{JsonLinesFeed, file_capability};
pub use types::{IdentityKey, InitiatorType, LogMessage, ResourceUrl};
pub use utils::identity_key;
