//! Scanner configuration
//!
//! Deserialized from a JS object in `configure()`, or built directly in Rust.

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Default number of scanners whose compiled patterns stay live at once
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Configuration for the pattern cache shared by scanners
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScannerConfig {
    /// Maximum number of cached compiled pattern sets. Default: 1000
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Log evictions and recompilations to the console. Default: false
    #[serde(default)]
    pub log_evictions: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            log_evictions: false,
        }
    }
}

impl ScannerConfig {
    pub fn with_capacity(cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.cache_capacity == 0 {
            return Err(ScanError::InvalidArgument(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
