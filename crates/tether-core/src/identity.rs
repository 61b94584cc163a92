//! Identity-based map keys.

use std::hash::{Hash, Hasher};

use crate::gc::Gc;

/// Map key comparing objects by identity rather than by value.
///
/// The hash is computed once, when the key is taken, and stays valid after
/// the object is collected. Two keys are equal iff they were taken from the
/// same allocation. A [`WeakSlot`](crate::WeakSlot) holding the key keeps
/// that allocation reserved, so a collected-but-unpurged key can never alias
/// a newer object.
#[derive(Clone, Copy, Debug)]
pub struct IdentityKey {
    address: usize,
    hash: u64,
}

impl IdentityKey {
    /// Take the identity key of an object.
    pub fn of<T>(object: &Gc<T>) -> Self {
        let address = Gc::address(object);
        Self {
            address,
            hash: mix(address as u64),
        }
    }

    /// The cached identity hash.
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Fibonacci hashing; spreads allocation addresses, whose low bits are
/// always zero, across the whole word.
fn mix(x: u64) -> u64 {
    let h = x.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^ (h >> 32)
}
