//! Warning sinks.
//!
//! A reporter receives one fully formatted message per duplicated identity. Calls
//! are independent and fire-and-forget; reporters hold no monitoring state.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::constants::reporting::{CONSOLE_PREFIX, LOG_TARGET};
use crate::types::LogMessage;

/// Sink for duplicate-resource warnings.
pub trait Reporter {
    /// Deliver one warning message.
    fn report(&self, message: &str);
}

impl<F> Reporter for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Reports warnings through `tracing` at `WARN` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str) {
        warn!(target: LOG_TARGET, "{message}");
    }
}

/// Writes one prefixed line per warning to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, message: &str) {
        eprintln!("{CONSOLE_PREFIX} {message}");
    }
}

/// In-memory reporter; clones share the same message log.
#[derive(Clone, Debug, Default)]
pub struct CollectingReporter {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl CollectingReporter {
    /// Return a copy of every message reported so far, in order.
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .expect("collecting reporter poisoned")
            .clone()
    }

    /// Number of messages reported so far.
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .expect("collecting reporter poisoned")
            .len()
    }

    /// Returns `true` when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .expect("collecting reporter poisoned")
            .push(message.to_string());
    }
}
