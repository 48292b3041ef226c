use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::config::MonitorConfig;
use crate::constants::aggregation::DUPLICATE_THRESHOLD;
use crate::constants::reporting::LOG_TARGET;
use crate::data::{DuplicateGroup, DuplicateWarning, ResourceRecord};
use crate::reporter::Reporter;
use crate::types::IdentityKey;
use crate::utils::identity_key;

/// Incremental duplicate detector over an append-only stream of resource records.
///
/// Every call to [`ingest`](Self::ingest) appends the batch to the session history and
/// re-derives the identity groups from the full history. A group is reported the
/// first time it holds at least two records; an identity is never reported twice.
pub struct DuplicateAggregator {
    config: MonitorConfig,
    history: Vec<ResourceRecord>,
    reported: IndexSet<IdentityKey>,
}

impl DuplicateAggregator {
    /// Create an aggregator with empty history.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
            reported: IndexSet::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Ingest a batch and report every identity that newly became duplicated.
    ///
    /// Returns the number of warnings emitted by this call. Records whose URL cannot
    /// be parsed are left out of grouping; the rest of the batch is still processed.
    pub fn ingest<I>(&mut self, batch: I, reporter: &dyn Reporter) -> usize
    where
        I: IntoIterator<Item = ResourceRecord>,
    {
        if self.config.disabled {
            return 0;
        }
        let before = self.history.len();
        self.history.extend(batch);
        let added = self.history.len() - before;
        if added == 0 {
            return 0;
        }

        let warnings = self.pending_warnings();
        for warning in &warnings {
            reporter.report(&warning.to_string());
            self.reported.insert(warning.identity_key.clone());
        }
        debug!(
            target: LOG_TARGET,
            added,
            history = self.history.len(),
            reported_total = self.reported.len(),
            new_warnings = warnings.len(),
            "resource batch ingested"
        );
        warnings.len()
    }

    /// Number of records retained in history (tracked or not).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Identity keys reported so far, in report order.
    pub fn reported_keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.reported.iter()
    }

    /// Returns `true` when `key` has already been reported.
    pub fn is_reported(&self, key: &str) -> bool {
        self.reported.contains(key)
    }

    /// Current duplicated identities in first-seen order.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        self.group_history()
            .into_iter()
            .filter(|(_, group)| group.len() >= DUPLICATE_THRESHOLD)
            .map(|(key, group)| DuplicateGroup {
                reported: self.reported.contains(&key),
                initiator_type: group[0].initiator_type.clone(),
                occurrences: group.len(),
                identity_key: key,
            })
            .collect()
    }

    fn pending_warnings(&self) -> Vec<DuplicateWarning> {
        self.group_history()
            .into_iter()
            .filter(|(key, group)| {
                group.len() >= DUPLICATE_THRESHOLD && !self.reported.contains(key)
            })
            .map(|(key, group)| DuplicateWarning {
                initiator_type: group[0].initiator_type.clone(),
                occurrences: group.len(),
                identity_key: key,
            })
            .collect()
    }

    /// Group tracked history records by identity key, preserving arrival order.
    fn group_history(&self) -> IndexMap<IdentityKey, Vec<&ResourceRecord>> {
        let mut groups: IndexMap<IdentityKey, Vec<&ResourceRecord>> = IndexMap::new();
        let mut skipped = 0usize;
        for record in self
            .history
            .iter()
            .filter(|record| self.config.tracks(&record.initiator_type))
        {
            match identity_key(&record.url, self.config.ignore_query) {
                Ok(key) => groups.entry(key).or_default().push(record),
                Err(err) => {
                    skipped += 1;
                    debug!(target: LOG_TARGET, error = %err, "skipping resource record");
                }
            }
        }
        if skipped > 0 {
            debug!(
                target: LOG_TARGET,
                skipped, "resource records excluded from grouping"
            );
        }
        groups
    }
}
