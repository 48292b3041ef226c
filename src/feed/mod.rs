//! Resource feed interfaces and the in-memory push feed.
//!
//! Ownership model:
//! - `ResourceFeed` is the session-facing interface: a synchronous snapshot of
//!   already-loaded records plus a subscription for records loaded later.
//! - `Subscription` owns delivery of pushed batches. Delivery is pull-based: the
//!   session drains pending batches in order, so no callback ever needs shared
//!   access to session state.
//! - `FeedCapability` is the result of probing the host for a feed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use crate::data::ResourceRecord;
use crate::errors::MonitorError;

/// Source of resource-load records.
pub trait ResourceFeed {
    /// Records that were loaded before the session started.
    fn loaded_resources(&self) -> Vec<ResourceRecord>;

    /// Subscribe to records loaded from now on.
    ///
    /// May fail when the host platform rejects the observation request.
    fn subscribe(&self) -> Result<Box<dyn Subscription>, MonitorError>;
}

/// Live delivery of newly loaded records.
pub trait Subscription {
    /// Next pending batch in delivery order, or `None` when nothing is pending.
    fn next_batch(&mut self) -> Option<Vec<ResourceRecord>>;

    /// Stop delivery. Batches still buffered are dropped.
    fn cancel(&mut self);
}

/// Outcome of probing the host for a resource feed.
pub enum FeedCapability {
    /// The host exposes a usable feed.
    Available(Box<dyn ResourceFeed>),
    /// The host lacks the observation capability.
    Unavailable {
        /// Why the capability is absent.
        reason: String,
    },
}

impl FeedCapability {
    /// Wrap a concrete feed.
    pub fn available(feed: impl ResourceFeed + 'static) -> Self {
        Self::Available(Box::new(feed))
    }

    /// Describe a missing capability.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns `true` when a feed is available.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Clonable push feed backed by in-process queues; clones share state.
///
/// `push` appends to the loaded-resources buffer (as a browser's performance
/// timeline does) and delivers the batch to every live subscription.
#[derive(Clone, Default)]
pub struct InMemoryFeed {
    inner: Arc<Mutex<InMemoryFeedInner>>,
}

type BatchQueue = VecDeque<Vec<ResourceRecord>>;

#[derive(Default)]
struct InMemoryFeedInner {
    loaded: Vec<ResourceRecord>,
    subscribers: Vec<Weak<Mutex<BatchQueue>>>,
    subscribe_failure: Option<String>,
    subscribe_attempts: usize,
}

impl InMemoryFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a feed whose snapshot already holds `records`.
    pub fn with_loaded(records: Vec<ResourceRecord>) -> Self {
        let feed = Self::default();
        feed.inner.lock().expect("in-memory feed poisoned").loaded = records;
        feed
    }

    /// Make every future `subscribe` call fail with `reason`.
    pub fn failing_subscriptions(self, reason: impl Into<String>) -> Self {
        self.inner
            .lock()
            .expect("in-memory feed poisoned")
            .subscribe_failure = Some(reason.into());
        self
    }

    /// Record a newly loaded batch and deliver it to live subscriptions.
    ///
    /// Returns the number of subscriptions that received the batch.
    pub fn push(&self, batch: Vec<ResourceRecord>) -> usize {
        let mut inner = self.inner.lock().expect("in-memory feed poisoned");
        inner.loaded.extend(batch.iter().cloned());
        inner.subscribers.retain(|queue| queue.strong_count() > 0);
        for queue in inner.subscribers.iter().filter_map(Weak::upgrade) {
            queue
                .lock()
                .expect("subscription queue poisoned")
                .push_back(batch.clone());
        }
        inner.subscribers.len()
    }

    /// Number of subscriptions that have not been cancelled or dropped.
    pub fn live_subscribers(&self) -> usize {
        self.inner
            .lock()
            .expect("in-memory feed poisoned")
            .subscribers
            .iter()
            .filter(|queue| queue.strong_count() > 0)
            .count()
    }

    /// Number of times `subscribe` has been called, successful or not.
    pub fn subscribe_attempts(&self) -> usize {
        self.inner
            .lock()
            .expect("in-memory feed poisoned")
            .subscribe_attempts
    }
}

impl ResourceFeed for InMemoryFeed {
    fn loaded_resources(&self) -> Vec<ResourceRecord> {
        self.inner
            .lock()
            .expect("in-memory feed poisoned")
            .loaded
            .clone()
    }

    fn subscribe(&self) -> Result<Box<dyn Subscription>, MonitorError> {
        let mut inner = self.inner.lock().expect("in-memory feed poisoned");
        inner.subscribe_attempts += 1;
        if let Some(reason) = inner.subscribe_failure.clone() {
            return Err(MonitorError::SubscriptionFailed { reason });
        }
        let queue = Arc::new(Mutex::new(BatchQueue::new()));
        inner.subscribers.push(Arc::downgrade(&queue));
        Ok(Box::new(InMemorySubscription { queue: Some(queue) }))
    }
}

/// Subscription handed out by [`InMemoryFeed`].
pub struct InMemorySubscription {
    queue: Option<Arc<Mutex<BatchQueue>>>,
}

impl Subscription for InMemorySubscription {
    fn next_batch(&mut self) -> Option<Vec<ResourceRecord>> {
        self.queue
            .as_ref()?
            .lock()
            .expect("subscription queue poisoned")
            .pop_front()
    }

    fn cancel(&mut self) {
        self.queue = None;
    }
}
