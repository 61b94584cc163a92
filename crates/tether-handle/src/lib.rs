//! Interop handles for the Tether handle subsystem.
//!
//! A [`HandleAllocator`] turns objects into [`Handle`]s in one of two
//! modes:
//!
//! - **Normal:** the handle owns a strong reference. It has no external
//!   address and never touches the registry.
//! - **Pinned:** the handle holds an identity id from the shared
//!   [`IdentifierRegistry`](tether_registry::IdentifierRegistry). Its
//!   external address packs that id into the high bits of a `usize`; the
//!   low bits stay free for offset arithmetic and are masked out again by
//!   [`HandleAllocator::resolve`].
//!
//! Pinning does not keep the object alive. It only gives the object a
//! stable, resolvable name until it is collected.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod config;
pub mod handle;
pub mod status;

pub use allocator::HandleAllocator;
pub use config::{AddressLayout, HandleConfig};
pub use handle::{Handle, HandleMode};
pub use status::HandleStatus;
