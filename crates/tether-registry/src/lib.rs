//! Identifier registry for the Tether handle subsystem.
//!
//! Maps small positive integers ([`ObjectId`](tether_core::ObjectId)) to weak
//! observations of objects. Ids are generated under one lock, looked up
//! without it, and recycled only after the collected entry holding them has
//! been purged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;

pub use config::RegistryConfig;
pub use registry::IdentifierRegistry;
