//! Tether: weak object handles, identity ids and weak-keyed tables for
//! interop boundaries.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tether sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tether::prelude::*;
//!
//! let registry = Arc::new(IdentifierRegistry::new(RegistryConfig::default()).unwrap());
//! let handles = HandleAllocator::new(Arc::clone(&registry), HandleConfig::default()).unwrap();
//!
//! let widget = Gc::new(String::from("widget"));
//! let pinned = handles.allocate(Some(&widget), HandleMode::Pinned).unwrap();
//! let address = pinned.address_of().unwrap();
//!
//! // ... the address crosses the boundary and comes back ...
//! let back = handles.resolve(address).unwrap();
//! assert!(Gc::ptr_eq(&back.target().unwrap().unwrap(), &widget));
//!
//! // Side data that lives exactly as long as the widget.
//! let notes: WeakKeyTable<String, &str> = WeakKeyTable::new();
//! notes.add(&widget, "shiny").unwrap();
//! assert_eq!(notes.try_get_value(&widget), Some("shiny"));
//!
//! drop(widget);
//! assert!(handles.resolve(address).is_err());
//! assert_eq!(notes.purge(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `tether-core` | `Gc`, `WeakSlot`, `ReclaimQueue`, `IdentityKey`, ids, errors |
//! | [`registry`] | `tether-registry` | Identifier registry |
//! | [`table`] | `tether-table` | Weak-keyed association table |
//! | [`handle`] | `tether-handle` | Handle allocator, address layout, status codes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Object model, weak slots and error types (`tether-core`).
pub use tether_core as core;

/// Identifier registry (`tether-registry`).
pub use tether_registry as registry;

/// Weak-keyed association table (`tether-table`).
pub use tether_table as table;

/// Handles and address resolution (`tether-handle`).
pub use tether_handle as handle;

/// Common imports.
pub mod prelude {
    pub use tether_core::{ConfigError, Gc, IdentityKey, ObjectId, PinError, WeakSlot};
    pub use tether_handle::{Handle, HandleAllocator, HandleConfig, HandleMode, HandleStatus};
    pub use tether_registry::{IdentifierRegistry, RegistryConfig};
    pub use tether_table::{TableConfig, WeakKeyTable};
}
