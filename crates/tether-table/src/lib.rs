//! Weak-keyed association table for the Tether handle subsystem.
//!
//! [`WeakKeyTable`] associates an arbitrary value with an object, by
//! identity, for exactly as long as the object is alive. Once the key is
//! collected its entry becomes invisible and is physically removed by the
//! next operation that drains the table's reclamation queue.
//!
//! # Not an ephemeron
//!
//! Values are held strongly. A value that (directly or indirectly) holds a
//! strong reference to its own key keeps that key alive, and the pair is
//! never collected. This is an accepted limitation of the table, not a bug
//! to be worked around by callers.
//!
//! # Locking
//!
//! Each table owns one shared/exclusive lock. Lookups take the shared side
//! and only purge if the exclusive side happens to be free. Every write
//! purges under the exclusive side before deciding anything, so a write
//! never observes or resurrects a collected key.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod table;

pub use config::TableConfig;
pub use table::WeakKeyTable;
