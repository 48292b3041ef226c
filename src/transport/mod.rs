/// File-backed resource feeds.
pub mod fs;

pub use fs::{JsonLinesFeed, file_capability};
