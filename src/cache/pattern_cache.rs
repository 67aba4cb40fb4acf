//! PatternCache - bounded LRU of compiled pattern sets
//!
//! Keyed by scanner identity. The cache owns the engine, so it is the only
//! place compiled patterns are created or released. An entry leaving the
//! cache (eviction, explicit evict, resize, clear, drop) is always disposed
//! through the engine before it is forgotten.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use super::ScannerId;
use crate::config::ScannerConfig;
use crate::console;
use crate::engine::{BestMatch, PatternHandle, RegexEngine};
use crate::error::ScanError;
use crate::text::OnigString;

/// Shared handle to a cache; scanners keep one each
pub type SharedPatternCache = Rc<RefCell<PatternCache>>;

/// Compiled handles for one scanner, in pattern order
#[derive(Debug)]
struct CompiledPatterns {
    handles: Vec<PatternHandle>,
}

/// Counters describing cache behavior since creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Pattern sets compiled successfully
    pub compilations: u64,
    /// Entries displaced by the LRU policy or a shrink
    pub evictions: u64,
    pub release_failures: u64,
    pub live_entries: usize,
    pub capacity: usize,
}

pub struct PatternCache {
    engine: Box<dyn RegexEngine>,
    entries: LruCache<ScannerId, CompiledPatterns>,
    log_evictions: bool,
    stats: CacheStats,
}

impl PatternCache {
    /// Create a cache holding at most `capacity` pattern sets (minimum 1)
    pub fn new(engine: Box<dyn RegexEngine>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            engine,
            entries: LruCache::new(capacity),
            log_evictions: false,
            stats: CacheStats::default(),
        }
    }

    pub fn with_config(engine: Box<dyn RegexEngine>, config: &ScannerConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let mut cache = Self::new(engine, config.cache_capacity);
        cache.log_evictions = config.log_evictions;
        Ok(cache)
    }

    pub fn into_shared(self) -> SharedPatternCache {
        Rc::new(RefCell::new(self))
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a scanner currently has compiled patterns (does not touch recency)
    pub fn contains(&self, id: ScannerId) -> bool {
        self.entries.contains(&id)
    }

    /// Compiled patterns currently held by the engine
    pub fn live_pattern_count(&self) -> usize {
        self.engine.live_pattern_count()
    }

    pub fn set_log_evictions(&mut self, enabled: bool) {
        self.log_evictions = enabled;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live_entries: self.entries.len(),
            capacity: self.capacity(),
            ..self.stats.clone()
        }
    }

    /// Find the best match for a scanner, compiling its patterns on a miss.
    ///
    /// `text` is the UTF-8 text without the NUL terminator and `start` a byte
    /// offset into it.
    pub fn find_best_match(
        &mut self,
        id: ScannerId,
        patterns: &[String],
        text: &[u8],
        start: usize,
    ) -> Result<Option<BestMatch>, ScanError> {
        self.ensure_compiled(id, patterns)?;

        let handles = match self.entries.peek(&id) {
            Some(compiled) => &compiled.handles,
            None => return Err(ScanError::Match(format!("No compiled patterns for scanner {}", id))),
        };

        match self.engine.find_best_match(handles, text, start) {
            Ok(found) => Ok(found),
            Err(_) => Err(ScanError::Match(self.last_error_text())),
        }
    }

    /// Drop a scanner's entry, releasing its compiled patterns.
    /// Returns false when the scanner had nothing cached.
    pub fn evict(&mut self, id: ScannerId) -> Result<bool, ScanError> {
        match self.entries.pop(&id) {
            Some(compiled) => self.release(id, compiled).map(|_| true),
            None => Ok(false),
        }
    }

    /// Release every entry. All entries are released even if one fails; the
    /// first failure is returned.
    pub fn clear(&mut self) -> Result<(), ScanError> {
        let mut outcome = Ok(());
        while let Some((id, compiled)) = self.entries.pop_lru() {
            let released = self.release(id, compiled);
            if outcome.is_ok() {
                outcome = released;
            }
        }
        outcome
    }

    /// Change the capacity, releasing least recently used entries that no
    /// longer fit.
    pub fn resize(&mut self, capacity: usize) -> Result<(), ScanError> {
        let Some(capacity) = NonZeroUsize::new(capacity) else {
            return Err(ScanError::InvalidArgument(
                "cache_capacity must be at least 1".to_string(),
            ));
        };

        let mut outcome = Ok(());
        while self.entries.len() > capacity.get() {
            let Some((id, compiled)) = self.entries.pop_lru() else {
                break;
            };
            self.stats.evictions += 1;
            let released = self.release(id, compiled);
            if outcome.is_ok() {
                outcome = released;
            }
        }
        self.entries.resize(capacity);
        outcome
    }

    fn ensure_compiled(&mut self, id: ScannerId, patterns: &[String]) -> Result<(), ScanError> {
        if self.entries.get(&id).is_some() {
            self.stats.hits += 1;
            return Ok(());
        }
        self.stats.misses += 1;

        let compiled = self.compile(patterns)?;
        self.stats.compilations += 1;
        if self.log_evictions {
            console::log(&format!(
                "[PatternCache] Compiled {} patterns for scanner {}",
                compiled.handles.len(),
                id
            ));
        }
        self.insert(id, compiled)
    }

    /// Compile every pattern in order. On failure the handles compiled so far
    /// are released and nothing is cached.
    fn compile(&mut self, patterns: &[String]) -> Result<CompiledPatterns, ScanError> {
        let mut handles = Vec::with_capacity(patterns.len());

        for (pattern_index, pattern) in patterns.iter().enumerate() {
            let source = OnigString::from(pattern.as_str());
            match self.engine.compile_pattern(source.utf8_bytes()) {
                Ok(handle) => handles.push(handle),
                Err(_) => {
                    let message = self.last_error_text();
                    if !handles.is_empty() && self.engine.dispose_compiled_patterns(&handles).is_err() {
                        self.stats.release_failures += 1;
                        console::warn(&format!(
                            "[PatternCache] Failed to release partially compiled patterns: {}",
                            self.last_error_text()
                        ));
                    }
                    return Err(ScanError::Compilation { pattern_index, message });
                }
            }
        }

        Ok(CompiledPatterns { handles })
    }

    /// Insert a freshly compiled entry. At capacity, the least recently used
    /// entry is released first; a failed release is reported after the new
    /// entry is stored.
    fn insert(&mut self, id: ScannerId, compiled: CompiledPatterns) -> Result<(), ScanError> {
        let mut outcome = Ok(());
        if self.entries.len() >= self.capacity() {
            if let Some((evicted_id, evicted)) = self.entries.pop_lru() {
                self.stats.evictions += 1;
                outcome = self.release(evicted_id, evicted);
            }
        }
        self.entries.put(id, compiled);
        outcome
    }

    fn release(&mut self, id: ScannerId, compiled: CompiledPatterns) -> Result<(), ScanError> {
        if compiled.handles.is_empty() {
            return Ok(());
        }

        match self.engine.dispose_compiled_patterns(&compiled.handles) {
            Ok(()) => {
                if self.log_evictions {
                    console::log(&format!(
                        "[PatternCache] Released {} patterns of scanner {}",
                        compiled.handles.len(),
                        id
                    ));
                }
                Ok(())
            }
            Err(_) => {
                // the entry is already out of the table; it is not retried
                self.stats.release_failures += 1;
                Err(ScanError::ResourceRelease(self.last_error_text()))
            }
        }
    }

    fn last_error_text(&self) -> String {
        String::from_utf8_lossy(self.engine.last_error()).into_owned()
    }
}

impl Drop for PatternCache {
    fn drop(&mut self) {
        if let Err(e) = self.clear() {
            console::warn(&format!("[PatternCache] Release on drop failed: {}", e));
        }
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FaultyEngine;
    use crate::engine::RustRegexEngine;

    fn patterns(sources: &[&str]) -> Vec<String> {
        sources.iter().map(|s| s.to_string()).collect()
    }

    fn regex_cache(capacity: usize) -> PatternCache {
        PatternCache::new(Box::new(RustRegexEngine::new()), capacity)
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = regex_cache(4);
        let id = ScannerId::next();
        let p = patterns(&["a", "b"]);

        assert!(cache.find_best_match(id, &p, b"xb", 0).unwrap().is_some());
        assert!(cache.find_best_match(id, &p, b"xa", 0).unwrap().is_some());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.compilations, 1);
        assert_eq!(stats.live_entries, 1);
        assert_eq!(cache.live_pattern_count(), 2);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut cache = regex_cache(2);
        let ids: Vec<ScannerId> = (0..5).map(|_| ScannerId::next()).collect();
        let p = patterns(&["a"]);

        for id in &ids {
            cache.find_best_match(*id, &p, b"a", 0).unwrap();
            assert!(cache.len() <= 2);
        }

        assert_eq!(cache.stats().evictions, 3);
        assert_eq!(cache.live_pattern_count(), 2);
        assert!(cache.contains(ids[3]));
        assert!(cache.contains(ids[4]));
        assert!(!cache.contains(ids[0]));
    }

    #[test]
    fn test_recently_used_entry_survives() {
        let mut cache = regex_cache(2);
        let (a, b, c) = (ScannerId::next(), ScannerId::next(), ScannerId::next());
        let p = patterns(&["x"]);

        cache.find_best_match(a, &p, b"x", 0).unwrap();
        cache.find_best_match(b, &p, b"x", 0).unwrap();
        // touch a so b becomes least recently used
        cache.find_best_match(a, &p, b"x", 0).unwrap();
        cache.find_best_match(c, &p, b"x", 0).unwrap();

        assert!(cache.contains(a));
        assert!(!cache.contains(b));
        assert!(cache.contains(c));
    }

    #[test]
    fn test_compile_failure_caches_nothing_and_releases_partial() {
        let mut cache = regex_cache(4);
        let id = ScannerId::next();
        let p = patterns(&["ok", "also ok", "(broken"]);

        let err = cache.find_best_match(id, &p, b"ok", 0).unwrap_err();
        match err {
            ScanError::Compilation { pattern_index, ref message } => {
                assert_eq!(pattern_index, 2);
                assert!(!message.is_empty());
            }
            other => panic!("expected compilation error, got {:?}", other),
        }
        assert!(!cache.contains(id));
        assert_eq!(cache.live_pattern_count(), 0);
        assert_eq!(cache.stats().compilations, 0);
    }

    #[test]
    fn test_explicit_evict_and_recompile() {
        let (engine, faults) = FaultyEngine::new();
        let mut cache = PatternCache::new(Box::new(engine), 4);
        let id = ScannerId::next();
        let p = patterns(&["a", "b"]);

        cache.find_best_match(id, &p, b"a", 0).unwrap();
        assert_eq!(faults.compile_calls.get(), 2);

        assert!(cache.evict(id).unwrap());
        assert!(!cache.evict(id).unwrap());
        assert_eq!(faults.live.get(), 0);

        cache.find_best_match(id, &p, b"b", 0).unwrap();
        assert_eq!(faults.compile_calls.get(), 4);
        assert_eq!(faults.live.get(), 2);
    }

    #[test]
    fn test_match_failure_surfaces_engine_text() {
        let (engine, faults) = FaultyEngine::new();
        let mut cache = PatternCache::new(Box::new(engine), 4);
        let id = ScannerId::next();
        faults.fail_match.set(true);

        let err = cache.find_best_match(id, &patterns(&["a"]), b"a", 0).unwrap_err();
        assert_eq!(err, ScanError::Match("search failed: retry-limit-in-match over".to_string()));
        // compilation itself succeeded and stays cached
        assert!(cache.contains(id));
    }

    #[test]
    fn test_release_failure_on_eviction() {
        let (engine, faults) = FaultyEngine::new();
        let mut cache = PatternCache::new(Box::new(engine), 1);
        let (a, b) = (ScannerId::next(), ScannerId::next());
        let p = patterns(&["a"]);

        cache.find_best_match(a, &p, b"a", 0).unwrap();
        faults.fail_dispose.set(true);

        let err = cache.find_best_match(b, &p, b"a", 0).unwrap_err();
        assert_eq!(err, ScanError::ResourceRelease("dispose failed: corrupted region".to_string()));
        // the evicted entry is gone for good; the new one is cached
        assert!(!cache.contains(a));
        assert!(cache.contains(b));
        assert_eq!(cache.stats().release_failures, 1);

        faults.fail_dispose.set(false);
        assert!(cache.find_best_match(b, &p, b"a", 0).unwrap().is_some());
    }

    #[test]
    fn test_resize_releases_overflow() {
        let mut cache = regex_cache(4);
        let p = patterns(&["a"]);
        for _ in 0..4 {
            cache.find_best_match(ScannerId::next(), &p, b"a", 0).unwrap();
        }
        assert_eq!(cache.live_pattern_count(), 4);

        cache.resize(1).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.live_pattern_count(), 1);

        assert!(cache.resize(0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_clear_and_drop_release_everything() {
        let (engine, faults) = FaultyEngine::new();
        {
            let mut cache = PatternCache::new(Box::new(engine), 8);
            let p = patterns(&["a", "b", "c"]);
            cache.find_best_match(ScannerId::next(), &p, b"a", 0).unwrap();
            cache.find_best_match(ScannerId::next(), &p, b"a", 0).unwrap();
            assert_eq!(faults.live.get(), 6);

            cache.clear().unwrap();
            assert!(cache.is_empty());
            assert_eq!(faults.live.get(), 0);

            cache.find_best_match(ScannerId::next(), &p, b"a", 0).unwrap();
            assert_eq!(faults.live.get(), 3);
        }
        assert_eq!(faults.live.get(), 0);
    }

    #[test]
    fn test_compilations_and_releases_logged_only_when_enabled() {
        let p = patterns(&["a", "b"]);
        let quiet_id = ScannerId::next();
        {
            let mut quiet = regex_cache(1);
            quiet.find_best_match(quiet_id, &p, b"a", 0).unwrap();
            quiet.evict(quiet_id).unwrap();
        }
        assert!(console::take_captured().is_empty());

        let mut cache = regex_cache(1);
        cache.set_log_evictions(true);
        let (a, b) = (ScannerId::next(), ScannerId::next());
        cache.find_best_match(a, &p, b"a", 0).unwrap();
        cache.find_best_match(a, &p, b"a", 0).unwrap();
        cache.find_best_match(b, &p, b"a", 0).unwrap();

        assert_eq!(
            console::take_captured(),
            vec![
                format!("[PatternCache] Compiled 2 patterns for scanner {}", a),
                format!("[PatternCache] Compiled 2 patterns for scanner {}", b),
                format!("[PatternCache] Released 2 patterns of scanner {}", a),
            ]
        );
    }

    #[test]
    fn test_with_config() {
        let config = ScannerConfig { cache_capacity: 3, log_evictions: true };
        let cache = PatternCache::with_config(Box::new(RustRegexEngine::new()), &config).unwrap();
        assert_eq!(cache.capacity(), 3);

        let bad = ScannerConfig::with_capacity(0);
        assert!(PatternCache::with_config(Box::new(RustRegexEngine::new()), &bad).is_err());
    }
}
