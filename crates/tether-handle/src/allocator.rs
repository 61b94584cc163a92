//! Handle allocation and address resolution.

use std::fmt;
use std::sync::Arc;

use tether_core::{ConfigError, Gc, ObjectId, PinError};
use tether_registry::IdentifierRegistry;
use tracing::trace;

use crate::config::{AddressLayout, HandleConfig};
use crate::handle::{Handle, HandleMode, State};

/// Builds [`Handle`]s and resolves external addresses back to them.
///
/// An object pinned several times keeps one id for as long as it lives,
/// across every allocator sharing the same registry.
pub struct HandleAllocator<T> {
    registry: Arc<IdentifierRegistry<T>>,
    layout: AddressLayout,
}

impl<T> HandleAllocator<T> {
    /// Create an allocator issuing ids from `registry`.
    pub fn new(
        registry: Arc<IdentifierRegistry<T>>,
        config: HandleConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry,
            layout: config.layout(),
        })
    }

    /// Allocate a handle for `target`.
    ///
    /// A normal handle for `None` is the empty handle. Pinning `None` fails
    /// with [`PinError::NullKey`].
    pub fn allocate(
        &self,
        target: Option<&Gc<T>>,
        mode: HandleMode,
    ) -> Result<Handle<T>, PinError> {
        let state = match (mode, target) {
            (HandleMode::Normal, None) => State::Empty,
            (HandleMode::Normal, Some(object)) => State::Normal(object.clone()),
            (HandleMode::Pinned, None) => return Err(PinError::NullKey),
            (HandleMode::Pinned, Some(object)) => {
                let id = self.registry.get_or_generate(object);
                trace!(%id, "pinned handle allocated");
                State::Pinned {
                    id,
                    registry: Arc::clone(&self.registry),
                    layout: self.layout,
                }
            }
        };
        Ok(Handle { state })
    }

    /// Resolve an external address to a pinned handle.
    ///
    /// Zero maps to the empty handle. Offset bits are masked out. Fails
    /// with [`PinError::UnknownHandle`] if the id was never issued or its
    /// object has been collected.
    pub fn resolve(&self, address: usize) -> Result<Handle<T>, PinError> {
        if address == 0 {
            return Ok(Handle::empty());
        }
        let (id, _offset) = self.layout.decode(address);
        match id {
            Some(id) if self.registry.contains(id) => Ok(Handle {
                state: State::Pinned {
                    id,
                    registry: Arc::clone(&self.registry),
                    layout: self.layout,
                },
            }),
            _ => Err(PinError::UnknownHandle { address }),
        }
    }

    /// Split an address into its id and the offset carried in its low bits.
    pub fn split_address(&self, address: usize) -> (Option<ObjectId>, usize) {
        self.layout.decode(address)
    }

    /// How ids are packed into addresses.
    pub fn layout(&self) -> AddressLayout {
        self.layout
    }

    /// The registry ids are issued from.
    pub fn registry(&self) -> &Arc<IdentifierRegistry<T>> {
        &self.registry
    }
}

impl<T> fmt::Debug for HandleAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleAllocator")
            .field("registry", &self.registry)
            .field("layout", &self.layout)
            .finish()
    }
}
