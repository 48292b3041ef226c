use std::io;

use thiserror::Error;

use crate::types::ResourceUrl;

/// Error type for feed, decoding, and configuration failures.
///
/// None of these are fatal to a monitoring session: the session degrades to
/// doing less work instead of surfacing them to its host.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("resource feed is unavailable: {reason}")]
    FeedUnavailable { reason: String },
    #[error("resource feed rejected subscription: {reason}")]
    SubscriptionFailed { reason: String },
    #[error("resource url '{url}' is not an absolute url: {source}")]
    MalformedUrl {
        url: ResourceUrl,
        #[source]
        source: url::ParseError,
    },
    #[error("resource record on line {line} could not be decoded: {source}")]
    RecordDecode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
