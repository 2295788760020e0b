// Record Store - durable entry collection backed by SQLite
//
// Every mutation runs in its own SQLite transaction, so a crash mid-write
// leaves either the whole change or none of it. Observers are told about a
// change only after it has committed.

use crate::db;
use crate::entities::{Entry, EntryId, MAX_SUM};
use crate::error::{Result, TrackerError};
use crate::validation::ValidationError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A committed change to the entry collection
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Inserted(Entry),
    Deleted(Entry),
}

/// Subscriber told about every committed change
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, change: &StoreChange);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreChange) + Send + Sync,
{
    fn on_change(&self, change: &StoreChange) {
        self(change)
    }
}

/// Handle returned by [`RecordStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct RecordStore {
    conn: Connection,
    observers: Vec<(SubscriptionId, Arc<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl RecordStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| TrackerError::Storage {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened entry store");
        Self::from_connection(conn)
    }

    /// Non-durable store for tests and previews
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        db::setup_database(&conn)?;
        Ok(RecordStore {
            conn,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Append an entry. A sum SQLite cannot hold is a validation error.
    pub fn insert(&mut self, entry: Entry) -> Result<Entry> {
        if entry.sum() > MAX_SUM {
            return Err(ValidationError::TooLarge(entry.sum().to_string()).into());
        }

        let tx = self.conn.transaction()?;
        db::insert_entry(&tx, &entry)?;
        tx.commit()?;

        info!(id = %entry.id(), source = %entry.source(), sum = entry.sum(), "entry added");
        self.notify(&StoreChange::Inserted(entry.clone()));
        Ok(entry)
    }

    /// Remove an entry by identity. Returns false if it was already absent.
    pub fn delete(&mut self, id: &EntryId) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let removed = db::delete_entry(&tx, id)?;

        let Some(entry) = removed else {
            // Nothing to commit
            debug!(id = %id, "delete of absent entry ignored");
            return Ok(false);
        };

        tx.commit()?;

        info!(id = %id, sum = entry.sum(), "entry removed");
        self.notify(&StoreChange::Deleted(entry));
        Ok(true)
    }

    /// All entries in insertion order
    pub fn all(&self) -> Result<Vec<Entry>> {
        db::get_all_entries(&self.conn)
    }

    pub fn get(&self, id: &EntryId) -> Result<Option<Entry>> {
        db::get_entry(&self.conn, id)
    }

    pub fn count(&self) -> Result<usize> {
        let count = db::verify_count(&self.conn)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the subscription was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&self, change: &StoreChange) {
        for (_, observer) in &self.observers {
            observer.on_change(change);
        }
    }
}
