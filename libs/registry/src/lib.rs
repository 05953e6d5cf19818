//! Lock-guarded keyed stores.
//!
//! A [`Registry`] maps keys to shared, individually lockable records. It is
//! the one store used for jobs, tasks and resources alike.
//!
//! # Concurrency
//!
//! - Reads take the map's shared lock; writes take its exclusive lock
//! - A lock is held for exactly one map operation, never across calls
//! - Records are handed out as [`Shared`] handles: the registry and every
//!   caller that looked a record up observe the same value, so a record can
//!   be updated in place without a write-back call
//!
//! A poisoned lock is recovered rather than propagated. Every critical
//! section is a single `HashMap` operation, which cannot leave the map
//! half-updated.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A record handle shared between the registry and its readers.
pub type Shared<V> = Arc<RwLock<V>>;

/// Wraps a record in a fresh shared handle.
pub fn shared<V>(value: V) -> Shared<V> {
    Arc::new(RwLock::new(value))
}

/// Locks a shared record for reading.
pub fn read<V>(record: &Shared<V>) -> RwLockReadGuard<'_, V> {
    record.read().unwrap_or_else(PoisonError::into_inner)
}

/// Locks a shared record for writing.
pub fn write<V>(record: &Shared<V>) -> RwLockWriteGuard<'_, V> {
    record.write().unwrap_or_else(PoisonError::into_inner)
}

/// A concurrent key → record store.
#[derive(Debug)]
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, Shared<V>>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> RwLockReadGuard<'_, HashMap<K, Shared<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, HashMap<K, Shared<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the record for `key`, or `default` if the key is absent.
    pub fn find_with_default(&self, key: &K, default: Shared<V>) -> Shared<V> {
        self.entries().get(key).cloned().unwrap_or(default)
    }

    /// Returns the record for `key`, if present.
    pub fn find_ptr_or_null(&self, key: &K) -> Option<Shared<V>> {
        self.entries().get(key).cloned()
    }

    /// Inserts or replaces the record for `key`.
    ///
    /// Returns true if an insert took place, false if an existing record was
    /// replaced. Handles obtained before a replacement keep pointing at the
    /// old record.
    pub fn insert_or_update(&self, key: K, value: V) -> bool {
        self.entries_mut().insert(key, shared(value)).is_none()
    }

    /// Inserts the record only if `key` is absent.
    ///
    /// Returns true if an insert took place, false if the key was already
    /// present (the existing record is left untouched).
    pub fn insert_if_not_present(&self, key: K, value: V) -> bool {
        let mut entries = self.entries_mut();
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, shared(value));
        true
    }

    /// Returns an owned copy of the record for `key`.
    ///
    /// The copy never aliases registry storage; later changes to the record
    /// are not visible through it.
    pub fn find_copy(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let record = self.find_ptr_or_null(key)?;
        let copy = read(&record).clone();
        Some(copy)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries().contains_key(key)
    }

    /// Removes and returns the record for `key`.
    pub fn remove(&self, key: &K) -> Option<Shared<V>> {
        self.entries_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Snapshot of the keys, taken under one read lock.
    pub fn keys(&self) -> Vec<K> {
        self.entries().keys().cloned().collect()
    }

    /// Snapshot of the (key, record) pairs, taken under one read lock.
    pub fn entries_snapshot(&self) -> Vec<(K, Shared<V>)> {
        self.entries()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }
}
