//! Benchmark fixtures for the Tether handle subsystem.
//!
//! - [`populated_registry`]: a registry holding ids for `n` live objects
//! - [`populated_table`]: a weak-keyed table with `n` live entries
//! - [`pinned_allocator`]: an allocator with `n` objects already pinned

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use tether_core::{Gc, ObjectId};
use tether_handle::{HandleAllocator, HandleConfig, HandleMode};
use tether_registry::{IdentifierRegistry, RegistryConfig};
use tether_table::{TableConfig, WeakKeyTable};

/// Host object used by every benchmark.
pub type Payload = [u64; 4];

/// Allocate `n` distinct host objects.
pub fn objects(n: usize) -> Vec<Gc<Payload>> {
    (0..n as u64).map(|i| Gc::new([i; 4])).collect()
}

/// A registry with an id issued for each of `objects`.
pub fn populated_registry(
    objects: &[Gc<Payload>],
) -> (Arc<IdentifierRegistry<Payload>>, Vec<ObjectId>) {
    let config = RegistryConfig {
        initial_capacity: objects.len(),
        ..RegistryConfig::default()
    };
    let registry = match IdentifierRegistry::new(config) {
        Ok(registry) => Arc::new(registry),
        Err(e) => panic!("bench registry config rejected: {e}"),
    };
    let ids = objects.iter().map(|o| registry.generate(o)).collect();
    (registry, ids)
}

/// A table mapping each of `objects` to its index.
pub fn populated_table(objects: &[Gc<Payload>]) -> WeakKeyTable<Payload, usize> {
    let table = WeakKeyTable::with_config(TableConfig::with_capacity(objects.len()));
    for (i, object) in objects.iter().enumerate() {
        table.add_or_update(object, i);
    }
    table
}

/// An allocator with each of `objects` pinned, plus their addresses.
pub fn pinned_allocator(objects: &[Gc<Payload>]) -> (HandleAllocator<Payload>, Vec<usize>) {
    let (registry, _) = populated_registry(&[]);
    let allocator = match HandleAllocator::new(registry, HandleConfig::default()) {
        Ok(allocator) => allocator,
        Err(e) => panic!("bench handle config rejected: {e}"),
    };
    let addresses = objects
        .iter()
        .filter_map(|o| {
            allocator
                .allocate(Some(o), HandleMode::Pinned)
                .and_then(|h| h.address_of())
                .ok()
        })
        .collect();
    (allocator, addresses)
}
