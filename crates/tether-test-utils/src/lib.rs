//! Test utilities and fixtures for Tether development.
//!
//! Provides drop-counting [`Probe`] objects, so tests can tell exactly when a
//! host object was collected, and [`fan_out`], which releases N threads at
//! once against shared state to provoke races.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tether_core::Gc;

/// Shared counter of collected probes.
#[derive(Clone, Default)]
pub struct DropTracker {
    dropped: Arc<AtomicUsize>,
}

impl DropTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a probe tagged with `label`.
    pub fn probe(&self, label: u32) -> Gc<Probe> {
        Gc::new(Probe {
            label,
            dropped: Arc::clone(&self.dropped),
        })
    }

    /// Allocate `n` probes labelled `0..n`.
    pub fn probes(&self, n: u32) -> Vec<Gc<Probe>> {
        (0..n).map(|label| self.probe(label)).collect()
    }

    /// Number of probes from this tracker that have been collected.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// A host object that records its own collection.
#[derive(Debug)]
pub struct Probe {
    pub label: u32,
    dropped: Arc<AtomicUsize>,
}

impl PartialEq for Probe {
    /// Value equality on the label only; identity-keyed structures must
    /// ignore it.
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Run `f(i)` on `threads` scoped threads released together by a barrier,
/// returning the results in thread order.
pub fn fan_out<R, F>(threads: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync,
{
    let barrier = Barrier::new(threads);
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let barrier = &barrier;
                let f = &f;
                s.spawn(move || {
                    barrier.wait();
                    f(i)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("fan_out worker panicked"))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts_collections() {
        let tracker = DropTracker::new();
        let mut probes = tracker.probes(3);
        assert_eq!(tracker.dropped(), 0);
        probes.pop();
        assert_eq!(tracker.dropped(), 1);
        drop(probes);
        assert_eq!(tracker.dropped(), 3);
    }

    #[test]
    fn fan_out_preserves_order() {
        let out = fan_out(4, |i| i * 10);
        assert_eq!(out, vec![0, 10, 20, 30]);
    }
}
