//! Monitoring session lifecycle.
//!
//! A session bridges a resource feed to a reporter through a [`DuplicateAggregator`]
//! that it owns exclusively:
//!
//! ```text
//! Idle ──start (enabled + feed available)──▶ Active ──stop──▶ Stopped
//! ```
//!
//! `Idle` is permanent for a session that was disabled or found no feed, and
//! `Stopped` is terminal. A new session must be started to monitor again.

use tracing::debug;

use crate::config::MonitorConfig;
use crate::constants::reporting::LOG_TARGET;
use crate::feed::{FeedCapability, Subscription};
use crate::ingestion::DuplicateAggregator;
use crate::reporter::Reporter;

/// Lifecycle state of a [`MonitorSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Never activated (disabled, or the feed capability is absent).
    Idle,
    /// Snapshot ingested; live batches are ingested on [`MonitorSession::pump`].
    Active,
    /// Torn down; no further ingestion.
    Stopped,
}

/// One run of the duplicate-resource monitor.
pub struct MonitorSession {
    state: SessionState,
    aggregator: Option<DuplicateAggregator>,
    subscription: Option<Box<dyn Subscription>>,
    reporter: Box<dyn Reporter>,
}

impl MonitorSession {
    /// Start a session.
    ///
    /// `probe` is only invoked for an enabled config. When it reports a feed, the
    /// feed's snapshot is ingested immediately and a single subscription attempt is
    /// made.
    pub fn start<P, R>(config: MonitorConfig, probe: P, reporter: R) -> Self
    where
        P: FnOnce() -> FeedCapability,
        R: Reporter + 'static,
    {
        let mut session = Self {
            state: SessionState::Idle,
            aggregator: None,
            subscription: None,
            reporter: Box::new(reporter),
        };
        if config.disabled {
            debug!(target: LOG_TARGET, "resource monitor disabled");
            return session;
        }
        let feed = match probe() {
            FeedCapability::Available(feed) => feed,
            FeedCapability::Unavailable { reason } => {
                debug!(target: LOG_TARGET, %reason, "resource feed unavailable");
                return session;
            }
        };

        let mut aggregator = DuplicateAggregator::new(config);
        let snapshot = feed.loaded_resources();
        let snapshot_len = snapshot.len();
        let emitted = aggregator.ingest(snapshot, &*session.reporter);

        // A rejected subscription leaves the session running on snapshot data only.
        session.subscription = match feed.subscribe() {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                debug!(
                    target: LOG_TARGET,
                    error = %err,
                    "continuing without live resource updates"
                );
                None
            }
        };
        debug!(
            target: LOG_TARGET,
            snapshot = snapshot_len,
            warnings = emitted,
            live = session.subscription.is_some(),
            "resource monitor active"
        );
        session.aggregator = Some(aggregator);
        session.state = SessionState::Active;
        session
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` when the session receives live batches.
    pub fn has_live_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Read-only access to the aggregator while the session is active.
    pub fn aggregator(&self) -> Option<&DuplicateAggregator> {
        self.aggregator.as_ref()
    }

    /// Ingest every batch the feed has delivered since the last pump, in order.
    ///
    /// Returns the number of warnings emitted. Does nothing unless the session is
    /// active with a live subscription.
    pub fn pump(&mut self) -> usize {
        let (Some(aggregator), Some(subscription)) =
            (self.aggregator.as_mut(), self.subscription.as_mut())
        else {
            return 0;
        };
        let mut emitted = 0;
        while let Some(batch) = subscription.next_batch() {
            emitted += aggregator.ingest(batch, &*self.reporter);
        }
        emitted
    }

    /// Tear the session down: cancel the subscription and discard all state.
    ///
    /// An idle session stays idle; stopping twice is a no-op.
    pub fn stop(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if let Some(aggregator) = self.aggregator.take() {
            debug!(
                target: LOG_TARGET,
                history = aggregator.history_len(),
                reported = aggregator.reported_keys().count(),
                "resource monitor stopped"
            );
        }
        self.state = SessionState::Stopped;
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::ResourceRecord;
    use crate::feed::InMemoryFeed;
    use crate::reporter::CollectingReporter;

    fn script(url: &str) -> ResourceRecord {
        ResourceRecord::new(url, "script")
    }

    fn probe_for(feed: &InMemoryFeed) -> impl FnOnce() -> FeedCapability {
        let feed = feed.clone();
        move || FeedCapability::available(feed)
    }

    #[test]
    fn disabled_session_never_probes() {
        let probed = Cell::new(false);
        let session = MonitorSession::start(
            MonitorConfig::default().with_disabled(true),
            || {
                probed.set(true);
                FeedCapability::available(InMemoryFeed::new())
            },
            CollectingReporter::default(),
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!probed.get());
    }

    #[test]
    fn unavailable_feed_leaves_session_idle() {
        let reporter = CollectingReporter::default();
        let mut session = MonitorSession::start(
            MonitorConfig::default(),
            || FeedCapability::unavailable("no performance observer"),
            reporter.clone(),
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.pump(), 0);
        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.aggregator().is_none());
    }

    #[test]
    fn snapshot_is_ingested_on_start() {
        let feed = InMemoryFeed::with_loaded(vec![
            script("https://cdn/a.js"),
            script("https://cdn/a.js"),
        ]);
        let reporter = CollectingReporter::default();
        let session =
            MonitorSession::start(MonitorConfig::default(), probe_for(&feed), reporter.clone());
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.has_live_subscription());
        assert_eq!(reporter.len(), 1);
        assert_eq!(session.aggregator().map(|a| a.history_len()), Some(2));
    }

    #[test]
    fn subscription_failure_keeps_session_active() {
        let feed = InMemoryFeed::with_loaded(vec![script("https://cdn/a.js")])
            .failing_subscriptions("observe() threw");
        let reporter = CollectingReporter::default();
        let mut session =
            MonitorSession::start(MonitorConfig::default(), probe_for(&feed), reporter.clone());
        assert_eq!(session.state(), SessionState::Active);
        assert!(!session.has_live_subscription());
        assert_eq!(feed.subscribe_attempts(), 1);

        feed.push(vec![script("https://cdn/a.js")]);
        assert_eq!(session.pump(), 0);
        assert!(reporter.is_empty());
    }

    #[test]
    fn stop_cancels_subscription_and_is_terminal() {
        let feed = InMemoryFeed::new();
        let reporter = CollectingReporter::default();
        let mut session =
            MonitorSession::start(MonitorConfig::default(), probe_for(&feed), reporter.clone());
        assert_eq!(feed.live_subscribers(), 1);
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(feed.live_subscribers(), 0);
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.aggregator().is_none());
    }

    #[test]
    fn drop_releases_subscription() {
        let feed = InMemoryFeed::new();
        {
            let _session = MonitorSession::start(
                MonitorConfig::default(),
                probe_for(&feed),
                CollectingReporter::default(),
            );
            assert_eq!(feed.live_subscribers(), 1);
        }
        assert_eq!(feed.live_subscribers(), 0);
    }
}
