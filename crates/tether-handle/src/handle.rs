//! External object handles.
//!
//! A [`Handle`] is either *normal* (holds the object strongly for its own
//! lifetime) or *pinned* (holds only an identity id and resolves through
//! the registry). Only pinned handles have an external address.
//!
//! ```text
//! Unallocated ──allocate──► Allocated{Normal|Pinned} ──release──► Released
//! ```

use std::fmt;
use std::sync::Arc;

use tether_core::{Gc, ObjectId, PinError};
use tether_registry::IdentifierRegistry;

use crate::config::AddressLayout;

/// How a handle refers to its object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleMode {
    /// Direct strong reference; no registry interaction, no address.
    Normal,
    /// Identity id registered in the identifier registry.
    Pinned,
}

pub(crate) enum State<T> {
    Empty,
    Normal(Gc<T>),
    Pinned {
        id: ObjectId,
        registry: Arc<IdentifierRegistry<T>>,
        layout: AddressLayout,
    },
    Released,
}

/// A handle standing for one object across an interop boundary.
///
/// Cloning a handle yields another holder of the same reference or id.
/// Releasing one holder never affects the others.
pub struct Handle<T> {
    pub(crate) state: State<T>,
}

const RELEASED: PinError = PinError::InvalidOperation {
    reason: "handle was released",
};

impl<T> Handle<T> {
    /// The empty (zero) handle.
    pub fn empty() -> Self {
        Self { state: State::Empty }
    }

    /// Whether the handle currently holds a reference or id.
    pub fn is_allocated(&self) -> bool {
        matches!(self.state, State::Normal(_) | State::Pinned { .. })
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        matches!(self.state, State::Released)
    }

    /// The handle's mode, if allocated.
    pub fn mode(&self) -> Option<HandleMode> {
        match self.state {
            State::Normal(_) => Some(HandleMode::Normal),
            State::Pinned { .. } => Some(HandleMode::Pinned),
            State::Empty | State::Released => None,
        }
    }

    /// The identity id behind a pinned handle.
    pub fn id(&self) -> Option<ObjectId> {
        match self.state {
            State::Pinned { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The object this handle stands for.
    ///
    /// `Ok(None)` for the empty handle and for a pinned handle whose object
    /// has been collected. Fails on a released handle.
    pub fn target(&self) -> Result<Option<Gc<T>>, PinError> {
        match &self.state {
            State::Empty => Ok(None),
            State::Normal(object) => Ok(Some(object.clone())),
            State::Pinned { id, registry, .. } => Ok(registry.get_object(*id)),
            State::Released => Err(RELEASED),
        }
    }

    /// The external address of a pinned handle.
    ///
    /// The empty handle's address is 0. Normal handles have no address.
    pub fn address_of(&self) -> Result<usize, PinError> {
        match &self.state {
            State::Empty => Ok(0),
            State::Pinned { id, layout, .. } => Ok(layout.encode(*id)),
            State::Normal(_) => Err(PinError::InvalidOperation {
                reason: "address requested for a normal handle",
            }),
            State::Released => Err(RELEASED),
        }
    }

    /// Drop this handle's reference or id eagerly.
    ///
    /// The registry entry behind a pinned handle stays in place; other
    /// holders of the same id keep resolving until the object is collected.
    /// Releasing twice is a no-op.
    pub fn release(&mut self) {
        self.state = State::Released;
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        let state = match &self.state {
            State::Empty => State::Empty,
            State::Normal(object) => State::Normal(object.clone()),
            State::Pinned {
                id,
                registry,
                layout,
            } => State::Pinned {
                id: *id,
                registry: Arc::clone(registry),
                layout: *layout,
            },
            State::Released => State::Released,
        };
        Self { state }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Empty => write!(f, "Handle(empty)"),
            State::Normal(_) => write!(f, "Handle(normal)"),
            State::Pinned { id, .. } => write!(f, "Handle(pinned, id={id})"),
            State::Released => write!(f, "Handle(released)"),
        }
    }
}
