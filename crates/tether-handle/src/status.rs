//! ABI-stable status codes for interop callers.
//!
//! [`HandleStatus`] is a `repr(i32)` enum an interop facade returns across
//! the boundary in place of a Rust error. Conversions from [`PinError`] and
//! [`ConfigError`] are provided.

use tether_core::{ConfigError, PinError};

/// Status code for interop entry points.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleStatus {
    /// Success.
    Ok = 0,
    /// The key already has a live association.
    AlreadyExists = -1,
    /// Address never issued, or its object was collected.
    UnknownHandle = -2,
    /// Operation not valid for the handle's mode or state.
    InvalidOperation = -3,
    /// Null key or target.
    NullKey = -4,
    /// Configuration validation error.
    ConfigError = -5,
}

impl From<&PinError> for HandleStatus {
    fn from(e: &PinError) -> Self {
        match e {
            PinError::AlreadyExists => HandleStatus::AlreadyExists,
            PinError::UnknownHandle { .. } => HandleStatus::UnknownHandle,
            PinError::InvalidOperation { .. } => HandleStatus::InvalidOperation,
            PinError::NullKey => HandleStatus::NullKey,
        }
    }
}

impl From<&ConfigError> for HandleStatus {
    fn from(_e: &ConfigError) -> Self {
        HandleStatus::ConfigError
    }
}

impl<T> From<&Result<T, PinError>> for HandleStatus {
    fn from(r: &Result<T, PinError>) -> Self {
        match r {
            Ok(_) => HandleStatus::Ok,
            Err(e) => HandleStatus::from(e),
        }
    }
}
