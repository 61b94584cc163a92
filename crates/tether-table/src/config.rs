//! Association table configuration.

/// Configuration for a [`WeakKeyTable`](crate::WeakKeyTable).
#[derive(Clone, Debug, Default)]
pub struct TableConfig {
    /// Number of entries to reserve space for up front.
    pub initial_capacity: usize,
}

impl TableConfig {
    /// Config reserving room for `initial_capacity` entries.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }
}
