//! Registry configuration parameters.

use tether_core::{ConfigError, ObjectId};

/// Configuration for an [`IdentifierRegistry`](crate::IdentifierRegistry).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Largest id handed out before the counter wraps back to 1.
    ///
    /// Default: [`ObjectId::MAX`]. Must be in `1..=ObjectId::MAX`.
    pub max_id: u32,

    /// Maximum number of reclamation notices drained per `generate` call.
    ///
    /// Default: 64. Bounds the work a single `generate` spends purging.
    pub purge_batch: usize,

    /// Initial capacity of the id table.
    pub initial_capacity: usize,
}

impl RegistryConfig {
    /// Default purge batch size.
    pub const DEFAULT_PURGE_BATCH: usize = 64;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_id == 0 || self.max_id > ObjectId::MAX {
            return Err(ConfigError::InvalidMaxId { value: self.max_id });
        }
        if self.purge_batch == 0 {
            return Err(ConfigError::InvalidPurgeBatch);
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_id: ObjectId::MAX,
            purge_batch: Self::DEFAULT_PURGE_BATCH,
            initial_capacity: 0,
        }
    }
}
