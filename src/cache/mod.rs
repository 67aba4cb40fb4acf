//! Compiled pattern cache
//!
//! Scanners do not own compiled patterns. Each scanner has a `ScannerId`
//! and the cache compiles its patterns on first use, keeping a bounded
//! number of pattern sets alive in least-recently-used order.

pub mod pattern_cache;

pub use pattern_cache::*;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{ScannerConfig, DEFAULT_CACHE_CAPACITY};
use crate::console;
use crate::engine::RustRegexEngine;
use crate::error::ScanError;

static NEXT_SCANNER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one scanner instance; never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScannerId(u64);

impl ScannerId {
    pub fn next() -> Self {
        ScannerId(NEXT_SCANNER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScannerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ==================== DEFAULT CACHE ====================

thread_local! {
    static DEFAULT_CACHE: SharedPatternCache =
        PatternCache::new(Box::new(RustRegexEngine::new()), DEFAULT_CACHE_CAPACITY).into_shared();
}

/// The per-thread cache used by `OnigScanner::new`
pub fn default_cache() -> SharedPatternCache {
    DEFAULT_CACHE.with(Rc::clone)
}

/// Apply a configuration to the default cache. Shrinking releases the least
/// recently used entries that no longer fit.
pub fn configure_default_cache(config: &ScannerConfig) -> Result<(), ScanError> {
    config.validate()?;

    let cache = default_cache();
    let mut cache = cache.try_borrow_mut().map_err(|_| ScanError::CacheUnavailable)?;
    cache.set_log_evictions(config.log_evictions);
    let resized = cache.resize(config.cache_capacity);

    if config.log_evictions {
        console::log(&format!(
            "[PatternCache] Configured: capacity={}, entries={}",
            cache.capacity(),
            cache.len()
        ));
    }
    resized
}

/// Snapshot of the default cache counters
pub fn default_cache_stats() -> Result<CacheStats, ScanError> {
    let cache = default_cache();
    let cache = cache.try_borrow().map_err(|_| ScanError::CacheUnavailable)?;
    Ok(cache.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_ids_are_unique() {
        let a = ScannerId::next();
        let b = ScannerId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
        assert_eq!(format!("{}", ScannerId(7)), "#7");
    }

    #[test]
    fn test_default_cache_is_shared_per_thread() {
        let a = default_cache();
        let b = default_cache();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_configure_default_cache() {
        configure_default_cache(&ScannerConfig::with_capacity(5)).unwrap();
        assert_eq!(default_cache_stats().unwrap().capacity, 5);

        let err = configure_default_cache(&ScannerConfig::with_capacity(0)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(default_cache_stats().unwrap().capacity, 5);

        configure_default_cache(&ScannerConfig::default()).unwrap();
        assert_eq!(default_cache_stats().unwrap().capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_configure_logs_only_when_enabled() {
        configure_default_cache(&ScannerConfig::with_capacity(7)).unwrap();
        assert!(console::take_captured().is_empty());

        let verbose = ScannerConfig { cache_capacity: 9, log_evictions: true };
        configure_default_cache(&verbose).unwrap();
        assert_eq!(
            console::take_captured(),
            vec!["[PatternCache] Configured: capacity=9, entries=0".to_string()]
        );
    }

    #[test]
    fn test_stats_while_borrowed() {
        let cache = default_cache();
        let _guard = cache.borrow_mut();
        assert_eq!(default_cache_stats(), Err(ScanError::CacheUnavailable));
    }

    #[test]
    fn test_configure_while_borrowed() {
        let cache = default_cache();
        let _guard = cache.borrow_mut();
        assert_eq!(
            configure_default_cache(&ScannerConfig::default()),
            Err(ScanError::CacheUnavailable)
        );
    }
}
