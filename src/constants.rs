/// Constants used by duplicate aggregation and warning output.
pub mod aggregation {
    /// Initiator types grouped when no explicit set is configured.
    pub const DEFAULT_INITIATOR_TYPES: [&str; 3] = ["script", "link", "css"];
    /// Group size at which an identity counts as duplicated.
    pub const DUPLICATE_THRESHOLD: usize = 2;
}

/// Constants used by reporters and log output.
pub mod reporting {
    /// `tracing` target used for duplicate warnings and session logs.
    pub const LOG_TARGET: &str = "resource_monitor";
    /// Prefix for console warning lines.
    pub const CONSOLE_PREFIX: &str = "[resource_monitor]";
}

/// Constants used by file-backed feeds.
pub mod transport {
    /// Default delay between polls of a tailing file subscription (demo app).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
}
