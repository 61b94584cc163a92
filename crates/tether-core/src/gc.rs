//! Strong object references with collection notification.
//!
//! [`Gc<T>`] stands in for a reference into a collected heap. The object is
//! "collected" the moment the last `Gc<T>` is dropped: its value is dropped
//! and every weak observer registered through [`WeakSlot`](crate::WeakSlot)
//! is notified. Weak observers keep the allocation (and therefore the
//! object's address identity) reserved, never the value.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::identity::IdentityKey;

/// Callback run once when the observed object is collected.
pub(crate) type Notify = Box<dyn FnOnce() + Send>;

pub(crate) struct Watcher {
    pub(crate) token: u64,
    pub(crate) notify: Notify,
}

pub(crate) struct GcBox<T> {
    pub(crate) watchers: Mutex<SmallVec<[Watcher; 2]>>,
    value: T,
}

impl<T> Drop for GcBox<T> {
    // Runs after the strong count reached zero, so every `Weak::upgrade`
    // already fails by the time a notification is observed.
    fn drop(&mut self) {
        let watchers = std::mem::take(self.watchers.get_mut());
        for watcher in watchers {
            (watcher.notify)();
        }
    }
}

/// A strong reference to a host object.
///
/// Cloning is cheap and shares the object. Equality of the referenced
/// *objects* is identity-based; see [`Gc::ptr_eq`] and [`IdentityKey`].
pub struct Gc<T> {
    pub(crate) inner: Arc<GcBox<T>>,
}

impl<T> Gc<T> {
    /// Allocate a new object.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(GcBox {
                watchers: Mutex::new(SmallVec::new()),
                value,
            }),
        }
    }

    /// Whether two references point at the same object.
    pub fn ptr_eq(a: &Gc<T>, b: &Gc<T>) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Identity hash of the object, stable for the object's lifetime.
    pub fn identity_hash(this: &Gc<T>) -> u64 {
        IdentityKey::of(this).hash_value()
    }

    /// Number of strong references currently keeping the object alive.
    pub fn strong_count(this: &Gc<T>) -> usize {
        Arc::strong_count(&this.inner)
    }

    /// Number of weak observers currently watching the object.
    pub fn watcher_count(this: &Gc<T>) -> usize {
        this.inner.watchers.lock().len()
    }

    pub(crate) fn address(this: &Gc<T>) -> usize {
        Arc::as_ptr(&this.inner) as *const () as usize
    }

    pub(crate) fn downgrade(this: &Gc<T>) -> Weak<GcBox<T>> {
        Arc::downgrade(&this.inner)
    }

    pub(crate) fn from_inner(inner: Arc<GcBox<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for Gc<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Deref for Gc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gc")
            .field("address", &format_args!("{:#x}", Gc::address(self)))
            .field("value", &self.inner.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn clone_shares_identity() {
        let a = Gc::new(5u32);
        let b = a.clone();
        assert!(Gc::ptr_eq(&a, &b));
        assert_eq!(Gc::identity_hash(&a), Gc::identity_hash(&b));
        assert_eq!(Gc::strong_count(&a), 2);
    }

    #[test]
    fn equal_values_have_distinct_identity() {
        let a = Gc::new(String::from("same"));
        let b = Gc::new(String::from("same"));
        assert_eq!(*a, *b);
        assert!(!Gc::ptr_eq(&a, &b));
    }

    #[test]
    fn value_dropped_with_last_reference() {
        let drops = Arc::new(AtomicUsize::new(0));
        let a = Gc::new(DropCounter(Arc::clone(&drops)));
        let b = a.clone();
        drop(a);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(b);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn watchers_run_once_on_collection() {
        let fired = Arc::new(AtomicUsize::new(0));
        let obj = Gc::new(1u8);
        for token in 0..3 {
            let fired = Arc::clone(&fired);
            obj.inner.watchers.lock().push(Watcher {
                token,
                notify: Box::new(move || {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            });
        }
        assert_eq!(Gc::watcher_count(&obj), 3);
        drop(obj);
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }
}
