//! The id ↔ weak-slot table.

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tether_core::{ConfigError, Gc, ObjectId, ReclaimQueue, WeakSlot};
use tether_table::{TableConfig, WeakKeyTable};
use tracing::{debug, trace, warn};

use crate::config::RegistryConfig;

/// Generation cursor, guarded by the registry's generate lock.
struct Cursor {
    /// Last raw id handed out; 0 before the first `generate`.
    last: u32,
}

/// Registry mapping [`ObjectId`]s to weak observations of objects.
///
/// Entries are never removed explicitly. An entry disappears only after its
/// object is collected *and* a purge has drained the collection notice;
/// until then its id is not reissued to anyone else.
///
/// Each live object also remembers the first id it was given, so every
/// component sharing the registry can reuse it through
/// [`get_or_generate`](Self::get_or_generate).
///
/// The registry is an ordinary value: construct it once and share it with
/// `Arc` between whichever components need pinning services.
pub struct IdentifierRegistry<T> {
    slots: DashMap<ObjectId, WeakSlot<T>>,
    reclaimed: ReclaimQueue<ObjectId>,
    /// Object identity to its first live id. Written under the cursor lock.
    first_ids: WeakKeyTable<T, ObjectId>,
    cursor: Mutex<Cursor>,
    config: RegistryConfig,
}

impl<T> IdentifierRegistry<T> {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            max_id = config.max_id,
            purge_batch = config.purge_batch,
            "identifier registry created"
        );
        Ok(Self {
            slots: DashMap::with_capacity(config.initial_capacity),
            reclaimed: ReclaimQueue::new(),
            first_ids: WeakKeyTable::with_config(TableConfig::with_capacity(
                config.initial_capacity,
            )),
            cursor: Mutex::new(Cursor { last: 0 }),
            config,
        })
    }

    /// Assign a fresh id to `object`.
    ///
    /// The whole sequence (bounded purge, counter advance, collision retry,
    /// insert) runs under one lock, so concurrent callers always receive
    /// distinct ids. Every call issues a new id, even for an object that is
    /// already registered.
    ///
    /// If every id up to `max_id` is held by a live object this loops until
    /// one is collected.
    pub fn generate(&self, object: &Gc<T>) -> ObjectId {
        let mut cursor = self.cursor.lock();
        let id = self.generate_locked(&mut cursor, object);
        // Keeps the earlier id if the object already has one.
        self.first_ids.get_or_add(object, id);
        id
    }

    /// The object's existing live id, or a freshly generated one.
    ///
    /// Every caller sharing this registry gets the same id for the same
    /// object until the object is collected.
    pub fn get_or_generate(&self, object: &Gc<T>) -> ObjectId {
        if let Some(id) = self.id_of(object) {
            return id;
        }
        let mut cursor = self.cursor.lock();
        if let Some(id) = self.id_of(object) {
            return id;
        }
        let id = self.generate_locked(&mut cursor, object);
        self.first_ids.add_or_update(object, id);
        id
    }

    /// The first id issued for `object`, if it is registered.
    pub fn id_of(&self, object: &Gc<T>) -> Option<ObjectId> {
        self.first_ids.try_get_value(object)
    }

    fn generate_locked(&self, cursor: &mut Cursor, object: &Gc<T>) -> ObjectId {
        self.purge_batch(self.config.purge_batch);

        let mut attempts: u64 = 0;
        loop {
            let raw = self.advance(cursor);
            let Some(id) = ObjectId::new(raw) else {
                continue;
            };
            attempts += 1;
            if attempts == u64::from(self.config.max_id) + 1 {
                warn!(max_id = self.config.max_id, "identifier space exhausted, retrying");
            }

            match self.slots.entry(id) {
                Entry::Occupied(mut occupied) => {
                    if occupied.get().is_alive() {
                        continue;
                    }
                    // Collected but not yet purged: purge it here and reuse.
                    occupied.insert(WeakSlot::new(object, &self.reclaimed, id));
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(WeakSlot::new(object, &self.reclaimed, id));
                }
            }
            trace!(%id, "identifier generated");
            return id;
        }
    }

    /// The object registered under `id`, or `None` if the id is unknown or
    /// its object has been collected. Never takes the generate lock.
    pub fn get_object(&self, id: ObjectId) -> Option<Gc<T>> {
        self.slots.get(&id)?.target()
    }

    /// Whether `id` currently resolves to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.is_alive())
    }

    /// Drain every pending collection notice and drop the matching entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        let _cursor = self.cursor.lock();
        self.first_ids.purge();
        self.purge_batch(usize::MAX)
    }

    /// Number of entries physically present, including collected entries
    /// that have not been purged yet.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no entries are present.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Remove up to `limit` collected entries. Caller holds the cursor lock.
    fn purge_batch(&self, limit: usize) -> usize {
        let mut removed = 0;
        for id in self.reclaimed.drain(limit) {
            // The id may already have been reused by a live object.
            if self.slots.remove_if(&id, |_, slot| !slot.is_alive()).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, remaining = self.slots.len(), "purged collected identifiers");
        }
        removed
    }

    /// Step the cursor, wrapping from `max_id` back to 1.
    fn advance(&self, cursor: &mut Cursor) -> u32 {
        cursor.last = if cursor.last >= self.config.max_id {
            debug!(max_id = self.config.max_id, "identifier counter wrapped");
            1
        } else {
            cursor.last + 1
        };
        cursor.last
    }
}

impl<T> fmt::Debug for IdentifierRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierRegistry")
            .field("entries", &self.slots.len())
            .field("pending_reclaim", &self.reclaimed.len())
            .field("config", &self.config)
            .finish()
    }
}
