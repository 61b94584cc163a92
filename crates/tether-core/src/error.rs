//! Error types for the Tether handle subsystem.
//!
//! Every variant is a synchronous, local precondition violation. An object
//! that was collected between lookup and use is *not* an error: lookups
//! report it as `None`.

use std::error::Error;
use std::fmt;

/// Errors from registry, association-table and handle operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinError {
    /// `add` on a key that already has a live association.
    AlreadyExists,
    /// An interop address that was never issued, or whose object has been
    /// collected.
    UnknownHandle {
        /// The address as received from the caller.
        address: usize,
    },
    /// The operation is not valid for the handle's mode or state.
    InvalidOperation {
        /// What was attempted.
        reason: &'static str,
    },
    /// A null / absent target was supplied where an object is required.
    NullKey,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "an entry with the same key already exists"),
            Self::UnknownHandle { address } => {
                write!(f, "unknown or collected handle address {address:#x}")
            }
            Self::InvalidOperation { reason } => write!(f, "invalid operation: {reason}"),
            Self::NullKey => write!(f, "key or target must not be null"),
        }
    }
}

impl Error for PinError {}

/// Errors from validating a configuration struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_id` is zero or larger than [`ObjectId::MAX`](crate::ObjectId::MAX).
    InvalidMaxId {
        /// The rejected value.
        value: u32,
    },
    /// `purge_batch` is zero.
    InvalidPurgeBatch,
    /// `offset_bits` leaves no room for a full id in a `usize`.
    InvalidOffsetBits {
        /// The rejected value.
        value: u32,
        /// Largest accepted value on this target.
        max: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxId { value } => {
                write!(f, "max_id {value} is outside 1..={}", crate::ObjectId::MAX)
            }
            Self::InvalidPurgeBatch => write!(f, "purge_batch must be at least 1"),
            Self::InvalidOffsetBits { value, max } => {
                write!(f, "offset_bits {value} exceeds maximum {max}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_handle_displays_hex_address() {
        let err = PinError::UnknownHandle {
            address: 0x1_0000_0000,
        };
        assert_eq!(
            err.to_string(),
            "unknown or collected handle address 0x100000000"
        );
    }

    #[test]
    fn invalid_operation_carries_reason() {
        let err = PinError::InvalidOperation {
            reason: "handle was released",
        };
        assert!(err.to_string().contains("handle was released"));
    }

    #[test]
    fn config_errors_display() {
        assert_eq!(
            ConfigError::InvalidPurgeBatch.to_string(),
            "purge_batch must be at least 1"
        );
        assert!(ConfigError::InvalidMaxId { value: 0 }
            .to_string()
            .contains("max_id 0"));
    }
}
