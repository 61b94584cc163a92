//! Weak observation of a single object.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use crate::gc::{Gc, GcBox, Watcher};
use crate::identity::IdentityKey;
use crate::queue::ReclaimQueue;

/// Source of watcher tokens, unique for the process lifetime.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// A weak observation of one object.
///
/// The slot never keeps its target alive. Once the target is collected,
/// [`target`](WeakSlot::target) returns `None` and the payload supplied at
/// construction is pushed onto the queue the slot was registered with.
///
/// Dropping a slot whose target is still alive detaches it, so no notice is
/// posted for slots that were removed explicitly. A notice can still race
/// with detachment; queue consumers must check [`is_alive`](WeakSlot::is_alive)
/// on the entry they are about to purge.
pub struct WeakSlot<T> {
    target: Weak<GcBox<T>>,
    key: IdentityKey,
    token: u64,
}

impl<T> WeakSlot<T> {
    /// Observe `target`, posting `payload` to `queue` when it is collected.
    pub fn new<P>(target: &Gc<T>, queue: &ReclaimQueue<P>, payload: P) -> Self
    where
        P: Send + 'static,
    {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        let tx = queue.sender();
        target.inner.watchers.lock().push(Watcher {
            token,
            notify: Box::new(move || {
                // The queue's owner may already be gone.
                let _ = tx.send(payload);
            }),
        });
        Self {
            target: Gc::downgrade(target),
            key: IdentityKey::of(target),
            token,
        }
    }

    /// The target, if it has not been collected.
    pub fn target(&self) -> Option<Gc<T>> {
        self.target.upgrade().map(Gc::from_inner)
    }

    /// Whether the target is still reachable.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<T> Drop for WeakSlot<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.target.upgrade() {
            let token = self.token;
            inner.watchers.lock().retain(|w| w.token != token);
        }
    }
}

impl<T> fmt::Debug for WeakSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSlot")
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_resolves_while_alive() {
        let queue = ReclaimQueue::new();
        let obj = Gc::new("payload");
        let slot = WeakSlot::new(&obj, &queue, 7u32);
        let resolved = slot.target().unwrap();
        assert!(Gc::ptr_eq(&resolved, &obj));
        assert!(slot.is_alive());
        assert!(queue.is_empty());
    }

    #[test]
    fn slot_does_not_keep_target_alive() {
        let queue = ReclaimQueue::new();
        let obj = Gc::new(3u64);
        let slot = WeakSlot::new(&obj, &queue, 1u32);
        assert_eq!(Gc::strong_count(&obj), 1);
        drop(obj);
        assert!(!slot.is_alive());
        assert!(slot.target().is_none());
    }

    #[test]
    fn collection_posts_payload() {
        let queue = ReclaimQueue::new();
        let obj = Gc::new(0u8);
        let _a = WeakSlot::new(&obj, &queue, 11u32);
        let _b = WeakSlot::new(&obj, &queue, 12u32);
        drop(obj);
        let mut notices = queue.drain(usize::MAX).into_vec();
        notices.sort_unstable();
        assert_eq!(notices, vec![11, 12]);
    }

    #[test]
    fn dropping_live_slot_detaches_watcher() {
        let queue = ReclaimQueue::new();
        let obj = Gc::new(0u8);
        let slot = WeakSlot::new(&obj, &queue, 5u32);
        assert_eq!(Gc::watcher_count(&obj), 1);
        drop(slot);
        assert_eq!(Gc::watcher_count(&obj), 0);
        drop(obj);
        assert!(queue.is_empty());
    }
}
