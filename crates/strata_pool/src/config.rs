//! # Pool Configuration
//!
//! Sizing of pools, loaded once at startup (TOML) or built in code.
//!
//! ```toml
//! initial_capacity = 1024
//! max_capacity = 1000000
//! max_refs = 64
//! chunk_slots = 4096
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Sizing parameters for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots allocated up-front.
    pub initial_capacity: usize,
    /// Hard maximum number of slots. `None` lets the pool grow without bound.
    pub max_capacity: Option<usize>,
    /// Maximum number of simultaneously outstanding reference handles.
    pub max_refs: usize,
    /// Slots per buffer for chunked backing arrays.
    pub chunk_slots: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_capacity: None,
            max_refs: 1024,
            chunk_slots: 4096,
        }
    }
}

impl PoolConfig {
    /// Default configuration with the given initial capacity.
    #[must_use]
    pub fn with_initial_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Sets the hard maximum number of slots.
    #[must_use]
    pub const fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Sets the maximum number of outstanding reference handles.
    #[must_use]
    pub const fn with_max_refs(mut self, max_refs: usize) -> Self {
        self.max_refs = max_refs;
        self
    }

    /// Sets the number of slots per chunk for chunked arrays.
    #[must_use]
    pub const fn with_chunk_slots(mut self, chunk_slots: usize) -> Self {
        self.chunk_slots = chunk_slots;
        self
    }

    /// Parses and validates a configuration from TOML.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the text is not valid TOML or
    /// the values are inconsistent.
    pub fn from_toml_str(text: &str) -> PoolResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| PoolError::InvalidConfig(format!("failed to parse pool config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] on zero handle or chunk limits, or
    /// an initial capacity above the hard maximum.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_refs == 0 {
            return Err(PoolError::InvalidConfig(
                "max_refs must be greater than zero".to_string(),
            ));
        }
        if self.chunk_slots == 0 {
            return Err(PoolError::InvalidConfig(
                "chunk_slots must be greater than zero".to_string(),
            ));
        }
        if let Some(max) = self.max_capacity {
            if self.initial_capacity > max {
                return Err(PoolError::InvalidConfig(format!(
                    "initial_capacity {} exceeds max_capacity {max}",
                    self.initial_capacity
                )));
            }
        }
        Ok(())
    }
}
