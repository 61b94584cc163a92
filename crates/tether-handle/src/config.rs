//! Handle allocator configuration and the external address layout.

use tether_core::{ConfigError, ObjectId};

/// Bits an id needs in an external address (`ObjectId::MAX` is `i32::MAX`).
const ID_BITS: u32 = 31;

/// Configuration for a [`HandleAllocator`](crate::HandleAllocator).
#[derive(Clone, Debug)]
pub struct HandleConfig {
    /// Number of low bits left free in a pinned handle's external address.
    ///
    /// Callers may add offsets below `1 << offset_bits` to an address and
    /// still resolve it to the same object. Default: 32 on 64-bit targets,
    /// 0 on 32-bit targets. At most `usize::BITS - 31`.
    pub offset_bits: u32,
}

impl HandleConfig {
    /// Default number of free low bits on this target.
    pub const DEFAULT_OFFSET_BITS: u32 = usize::BITS.saturating_sub(32);

    /// Largest accepted `offset_bits` on this target.
    pub const MAX_OFFSET_BITS: u32 = usize::BITS - ID_BITS;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offset_bits > Self::MAX_OFFSET_BITS {
            return Err(ConfigError::InvalidOffsetBits {
                value: self.offset_bits,
                max: Self::MAX_OFFSET_BITS,
            });
        }
        Ok(())
    }

    /// The address layout this config describes.
    pub fn layout(&self) -> AddressLayout {
        AddressLayout {
            offset_bits: self.offset_bits,
        }
    }
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            offset_bits: Self::DEFAULT_OFFSET_BITS,
        }
    }
}

/// Packing of an id into a pointer-sized address.
///
/// Address encoding: high bits = id, low `offset_bits` bits = free for the
/// caller's offset arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
}

impl AddressLayout {
    pub(crate) fn encode(self, id: ObjectId) -> usize {
        (id.get() as usize) << self.offset_bits
    }

    /// Split an address into its id part (if it names a valid id) and the
    /// offset carried in the low bits.
    pub fn decode(self, address: usize) -> (Option<ObjectId>, usize) {
        let offset = address & self.offset_mask();
        let id = u32::try_from(address >> self.offset_bits)
            .ok()
            .and_then(ObjectId::new);
        (id, offset)
    }

    fn offset_mask(self) -> usize {
        if self.offset_bits == 0 {
            0
        } else {
            usize::MAX >> (usize::BITS - self.offset_bits)
        }
    }
}
