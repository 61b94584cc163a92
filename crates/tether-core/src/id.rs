//! Strongly-typed identity ids.

use std::fmt;
use std::num::NonZeroU32;

/// A small positive integer standing in for an object's identity.
///
/// Ids are handed out by the identifier registry and are always in
/// `1..=ObjectId::MAX`, so they survive a round trip through a signed
/// 32-bit field on the far side of an interop boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(NonZeroU32);

impl ObjectId {
    /// Largest id the registry will ever issue (`i32::MAX`).
    pub const MAX: u32 = i32::MAX as u32;

    /// The first id issued by a fresh registry.
    pub const FIRST: ObjectId = ObjectId(NonZeroU32::MIN);

    /// Wrap a raw value, rejecting zero and anything above [`ObjectId::MAX`].
    pub fn new(raw: u32) -> Option<Self> {
        if raw > Self::MAX {
            return None;
        }
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw integer value.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(ObjectId::new(0), None);
    }

    #[test]
    fn max_is_accepted_and_above_is_rejected() {
        assert_eq!(ObjectId::new(ObjectId::MAX).map(ObjectId::get), Some(ObjectId::MAX));
        assert_eq!(ObjectId::new(ObjectId::MAX + 1), None);
        assert_eq!(ObjectId::new(u32::MAX), None);
    }

    #[test]
    fn first_is_one() {
        assert_eq!(ObjectId::FIRST.get(), 1);
        assert_eq!(ObjectId::FIRST.to_string(), "1");
    }
}
