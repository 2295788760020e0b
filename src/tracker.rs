// Savings Tracker - the surface the UI talks to: add, remove, list, summary
//
// Aggregates are recomputed on demand from a fresh snapshot. Callers that
// want to refresh on change subscribe through the store.

use crate::aggregator::{Summary, DEFAULT_PROGRESS_CEILING};
use crate::config::TrackerConfig;
use crate::entities::{Amount, Entry, EntryId, Source};
use crate::error::Result;
use crate::store::{RecordStore, StoreObserver, SubscriptionId};
use crate::validation::parse_sum;
use tracing::warn;

pub struct SavingsTracker {
    store: RecordStore,
    ceiling: Amount,
}

impl SavingsTracker {
    /// Open the store named by the configuration
    pub fn open(config: &TrackerConfig) -> Result<Self> {
        let store = RecordStore::open(&config.resolved_database_path())?;
        Ok(Self::with_store(store, config.progress_ceiling))
    }

    /// In-memory tracker with the default ceiling
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(
            RecordStore::open_in_memory()?,
            DEFAULT_PROGRESS_CEILING,
        ))
    }

    pub fn with_store(store: RecordStore, ceiling: Amount) -> Self {
        SavingsTracker { store, ceiling }
    }

    pub fn ceiling(&self) -> Amount {
        self.ceiling
    }

    /// Record a new saving, stamped now
    pub fn add(&mut self, source: Source, sum: Amount) -> Result<Entry> {
        self.store.insert(Entry::new(source, sum))
    }

    /// Record a new saving from raw form text
    pub fn add_input(&mut self, source: Source, raw_sum: &str) -> Result<Entry> {
        let sum = parse_sum(raw_sum).inspect_err(|err| {
            warn!(input = raw_sum, error = %err, "rejected sum input");
        })?;
        self.add(source, sum)
    }

    /// Remove an entry. Returns false if it was already gone.
    pub fn remove(&mut self, entry: &Entry) -> Result<bool> {
        self.remove_by_id(&entry.id())
    }

    pub fn remove_by_id(&mut self, id: &EntryId) -> Result<bool> {
        self.store.delete(id)
    }

    /// Entries newest first; for equal timestamps the later insert comes first
    pub fn list(&self) -> Result<Vec<Entry>> {
        let mut entries = self.store.all()?;
        // Reverse first so the stable sort keeps later inserts ahead on ties
        entries.reverse();
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(entries)
    }

    pub fn summary(&self) -> Result<Summary> {
        let entries = self.store.all()?;
        Ok(Summary::from_entries(&entries, self.ceiling))
    }

    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
