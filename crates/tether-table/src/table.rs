//! The weak-keyed table itself.

use std::fmt;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use tether_core::{Gc, IdentityKey, PinError, ReclaimQueue, WeakSlot};
use tracing::{debug, trace};

use crate::config::TableConfig;

struct Entry<K, V> {
    slot: WeakSlot<K>,
    value: V,
}

type EntryMap<K, V> = IndexMap<IdentityKey, Entry<K, V>>;

/// Entries and values evicted under the lock, dropped after it is released
/// so that value destructors never run inside the table's critical section.
type Evicted<K, V> = SmallVec<[Entry<K, V>; 8]>;

/// Concurrent map from object identity to a value, alive only while the key
/// object is alive.
///
/// At most one live entry exists per key identity. Keys are compared by
/// identity, never by value, regardless of what `PartialEq` the key type
/// implements.
pub struct WeakKeyTable<K, V> {
    entries: RwLock<EntryMap<K, V>>,
    reclaimed: ReclaimQueue<IdentityKey>,
}

impl<K, V> WeakKeyTable<K, V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Create an empty table with the given configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            entries: RwLock::new(IndexMap::with_capacity(config.initial_capacity)),
            reclaimed: ReclaimQueue::new(),
        }
    }

    /// Associate `value` with `key`.
    ///
    /// Fails with [`PinError::AlreadyExists`] if `key` already has a live
    /// entry; the existing value is left untouched.
    pub fn add(&self, key: &Gc<K>, value: V) -> Result<(), PinError> {
        let mut entries = self.entries.write();
        let evicted = self.purge_locked(&mut entries);
        let id = IdentityKey::of(key);
        let result = if entries.contains_key(&id) {
            Err(PinError::AlreadyExists)
        } else {
            self.insert_locked(&mut entries, key, id, value);
            Ok(())
        };
        drop(entries);
        drop(evicted);
        result
    }

    /// Associate `value` with `key`, replacing any existing live value.
    pub fn add_or_update(&self, key: &Gc<K>, value: V) {
        let mut entries = self.entries.write();
        let evicted = self.purge_locked(&mut entries);
        let id = IdentityKey::of(key);
        let replaced = match entries.get_mut(&id) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.insert_locked(&mut entries, key, id, value);
                None
            }
        };
        drop(entries);
        drop(evicted);
        drop(replaced);
    }

    /// Remove the live entry for `key`. Returns whether one was removed.
    pub fn remove(&self, key: &Gc<K>) -> bool {
        let mut entries = self.entries.write();
        let evicted = self.purge_locked(&mut entries);
        let removed = entries.swap_remove(&IdentityKey::of(key));
        drop(entries);
        drop(evicted);
        removed.is_some()
    }

    /// Whether `key` has a live entry.
    pub fn contains_key(&self, key: &Gc<K>) -> bool {
        self.try_purge();
        self.entries.read().contains_key(&IdentityKey::of(key))
    }

    /// Number of entries. May include collected entries whose purge lost
    /// the race for the exclusive lock.
    pub fn len(&self) -> usize {
        self.try_purge();
        self.entries.read().len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain every pending collection notice. Returns the number of
    /// entries removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.write();
        let evicted = self.purge_locked(&mut entries);
        drop(entries);
        evicted.len()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let mut evicted = self.purge_locked(&mut entries);
        evicted.extend(entries.drain(..).map(|(_, entry)| entry));
        drop(entries);
        drop(evicted);
    }

    /// Opportunistic purge for the read paths: only when notices are
    /// pending, and only if the exclusive lock is free right now.
    fn try_purge(&self) {
        if self.reclaimed.is_empty() {
            return;
        }
        if let Some(mut entries) = self.entries.try_write() {
            let evicted = self.purge_locked(&mut entries);
            drop(entries);
            drop(evicted);
        }
    }

    fn purge_locked(&self, entries: &mut EntryMap<K, V>) -> Evicted<K, V> {
        let mut evicted = Evicted::new();
        for id in self.reclaimed.drain(usize::MAX) {
            // A notice may race with an explicit remove; only evict dead slots.
            if entries.get(&id).is_some_and(|e| !e.slot.is_alive()) {
                if let Some(entry) = entries.swap_remove(&id) {
                    evicted.push(entry);
                }
            }
        }
        if !evicted.is_empty() {
            debug!(removed = evicted.len(), remaining = entries.len(), "purged collected keys");
        }
        evicted
    }

    fn insert_locked(
        &self,
        entries: &mut EntryMap<K, V>,
        key: &Gc<K>,
        id: IdentityKey,
        value: V,
    ) {
        let slot = WeakSlot::new(key, &self.reclaimed, id);
        entries.insert(id, Entry { slot, value });
    }
}

impl<K, V: Clone> WeakKeyTable<K, V> {
    /// The value associated with `key`, if `key` has a live entry.
    pub fn try_get_value(&self, key: &Gc<K>) -> Option<V> {
        self.try_purge();
        self.entries
            .read()
            .get(&IdentityKey::of(key))
            .map(|entry| entry.value.clone())
    }

    /// The value associated with `key`, creating it with `factory` if absent.
    ///
    /// `factory` runs outside any lock. Under contention it may run more than
    /// once for the same key; exactly one result is committed and every
    /// caller receives that one. The losers' results are dropped. `factory`
    /// must not re-enter this table for the same key.
    pub fn get_value<F>(&self, key: &Gc<K>, factory: F) -> V
    where
        F: FnOnce(&Gc<K>) -> V,
    {
        if let Some(value) = self.try_get_value(key) {
            return value;
        }
        let fresh = factory(key);
        self.commit(key, fresh)
    }

    /// The value associated with `key`, associating `value` first if absent.
    ///
    /// Same winner-takes-all commit as [`get_value`](Self::get_value).
    pub fn get_or_add(&self, key: &Gc<K>, value: V) -> V {
        if let Some(existing) = self.try_get_value(key) {
            return existing;
        }
        self.commit(key, value)
    }

    /// Live pairs, with strong references to their keys, in table order.
    pub fn snapshot(&self) -> Vec<(Gc<K>, V)> {
        self.try_purge();
        self.entries
            .read()
            .values()
            .filter_map(|entry| Some((entry.slot.target()?, entry.value.clone())))
            .collect()
    }

    /// Second phase of `get_value`/`get_or_add`: commit `fresh` unless
    /// another caller got there first, in which case return the winner.
    fn commit(&self, key: &Gc<K>, fresh: V) -> V {
        let mut entries = self.entries.write();
        let evicted = self.purge_locked(&mut entries);
        let id = IdentityKey::of(key);
        let (result, discarded) = match entries.get(&id) {
            Some(winner) => {
                trace!(key = id.hash_value(), "association race lost, discarding value");
                (winner.value.clone(), Some(fresh))
            }
            None => {
                trace!(key = id.hash_value(), "association committed");
                let result = fresh.clone();
                self.insert_locked(&mut entries, key, id, fresh);
                (result, None)
            }
        };
        drop(entries);
        drop(evicted);
        drop(discarded);
        result
    }
}

impl<K, V> Default for WeakKeyTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for WeakKeyTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakKeyTable")
            .field("entries", &self.entries.read().len())
            .field("pending_reclaim", &self.reclaimed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_try_get() {
        let table = WeakKeyTable::new();
        let key = Gc::new("k");
        table.add(&key, 10u32).unwrap();
        assert_eq!(table.try_get_value(&key), Some(10));
        assert!(table.contains_key(&key));
    }

    #[test]
    fn duplicate_add_rejected_and_original_kept() {
        let table = WeakKeyTable::new();
        let key = Gc::new(());
        table.add(&key, 1u32).unwrap();
        assert_eq!(table.add(&key, 2u32), Err(PinError::AlreadyExists));
        assert_eq!(table.try_get_value(&key), Some(1));
    }

    #[test]
    fn keys_compare_by_identity() {
        let table = WeakKeyTable::new();
        let a = Gc::new(String::from("same"));
        let b = Gc::new(String::from("same"));
        table.add(&a, 'a').unwrap();
        table.add(&b, 'b').unwrap();
        assert_eq!(table.try_get_value(&a), Some('a'));
        assert_eq!(table.try_get_value(&b), Some('b'));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn remove_reports_presence() {
        let table = WeakKeyTable::new();
        let key = Gc::new(0u8);
        assert!(!table.remove(&key));
        table.add(&key, 5u8).unwrap();
        assert!(table.remove(&key));
        assert!(!table.remove(&key));
        assert_eq!(table.try_get_value(&key), None);
        // Removal detaches the weak observer.
        assert_eq!(Gc::watcher_count(&key), 0);
    }

    #[test]
    fn add_after_remove_succeeds() {
        let table = WeakKeyTable::new();
        let key = Gc::new(0u8);
        table.add(&key, 1u8).unwrap();
        table.remove(&key);
        table.add(&key, 2u8).unwrap();
        assert_eq!(table.try_get_value(&key), Some(2));
    }

    #[test]
    fn entry_does_not_keep_key_alive() {
        let table = WeakKeyTable::new();
        let key = Gc::new(0u8);
        table.add(&key, "v").unwrap();
        assert_eq!(Gc::strong_count(&key), 1);
        drop(key);
        assert_eq!(table.purge(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn get_value_runs_factory_once_when_uncontended() {
        let table = WeakKeyTable::new();
        let key = Gc::new(3u32);
        let mut calls = 0;
        let v = table.get_value(&key, |k| {
            calls += 1;
            **k * 2
        });
        assert_eq!(v, 6);
        let again = table.get_value(&key, |_| unreachable!("value already present"));
        assert_eq!(again, 6);
        assert_eq!(calls, 1);
    }

    #[test]
    fn commit_discards_loser() {
        let table = WeakKeyTable::new();
        let key = Gc::new(());
        table.add(&key, 1u32).unwrap();
        assert_eq!(table.commit(&key, 2), 1);
        assert_eq!(table.try_get_value(&key), Some(1));
    }

    #[test]
    fn get_or_add_returns_existing() {
        let table = WeakKeyTable::new();
        let key = Gc::new(());
        assert_eq!(table.get_or_add(&key, 'x'), 'x');
        assert_eq!(table.get_or_add(&key, 'y'), 'x');
    }

    #[test]
    fn add_or_update_replaces() {
        let table = WeakKeyTable::new();
        let key = Gc::new(());
        table.add_or_update(&key, 1u8);
        table.add_or_update(&key, 2u8);
        assert_eq!(table.try_get_value(&key), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clear_empties_table() {
        let table = WeakKeyTable::new();
        let keys: Vec<_> = (0..4).map(Gc::new).collect();
        for k in &keys {
            table.add(k, ()).unwrap();
        }
        table.clear();
        assert!(table.is_empty());
        for k in &keys {
            assert_eq!(Gc::watcher_count(k), 0);
        }
    }

    #[test]
    fn snapshot_skips_collected_keys() {
        let table = WeakKeyTable::new();
        let a = Gc::new(1);
        let b = Gc::new(2);
        table.add(&a, "a").unwrap();
        table.add(&b, "b").unwrap();
        drop(b);
        let snap = table.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(Gc::ptr_eq(&snap[0].0, &a));
        assert_eq!(snap[0].1, "a");
    }
}
