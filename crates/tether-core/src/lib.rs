//! Core types for the Tether handle subsystem.
//!
//! This is the leaf crate with zero internal dependencies. It emulates the
//! pieces a garbage-collected host would provide to the registry, the
//! association table and the handle allocator:
//!
//! - [`Gc`]: a strong, cloneable object reference whose last drop "collects"
//!   the object and notifies every weak observer.
//! - [`WeakSlot`]: a weak observation that never keeps its target alive and
//!   posts a payload onto a [`ReclaimQueue`] once the target is collected.
//! - [`IdentityKey`]: identity equality and hashing, independent of whatever
//!   `PartialEq`/`Hash` the object type implements.
//! - [`ObjectId`] and the error types shared by every sub-crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod gc;
pub mod id;
pub mod identity;
pub mod queue;
pub mod slot;

pub use error::{ConfigError, PinError};
pub use gc::Gc;
pub use id::ObjectId;
pub use identity::IdentityKey;
pub use queue::ReclaimQueue;
pub use slot::WeakSlot;
