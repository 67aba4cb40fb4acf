//! OnigScanner - best match across an ordered list of patterns
//!
//! A scanner holds only its pattern sources and an identity. Compiled
//! patterns live in a `PatternCache`, compiled lazily on the first search
//! and recompiled transparently if the cache evicted them in between.

use std::cell::RefMut;

use crate::cache::{default_cache, PatternCache, ScannerId, SharedPatternCache};
use crate::console;
use crate::engine::ByteSpan;
use crate::error::ScanError;
use crate::text::{OnigString, ScanInput};

use super::{CaptureIndex, OnigMatch};

#[derive(Debug)]
pub struct OnigScanner {
    id: ScannerId,
    sources: Vec<String>,
    cache: SharedPatternCache,
}

impl OnigScanner {
    /// Create a scanner backed by this thread's default cache
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self::with_cache(patterns, default_cache())
    }

    /// Create a scanner backed by a caller-provided cache
    pub fn with_cache<S: AsRef<str>>(patterns: &[S], cache: SharedPatternCache) -> Self {
        Self {
            id: ScannerId::next(),
            sources: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            cache,
        }
    }

    pub fn id(&self) -> ScannerId {
        self.id
    }

    /// Copy of the pattern sources, in priority order
    pub fn patterns(&self) -> Vec<String> {
        self.sources.clone()
    }

    pub fn cache(&self) -> &SharedPatternCache {
        &self.cache
    }

    /// Find the best match at or after `start_position` (UTF-16 units).
    ///
    /// The earliest match wins; among patterns matching at the same offset
    /// the lowest pattern index wins. `Ok(None)` means nothing matched.
    pub fn find_next_match_sync<'a>(
        &self,
        input: impl Into<ScanInput<'a>>,
        start_position: usize,
    ) -> Result<Option<OnigMatch>, ScanError> {
        if self.sources.is_empty() {
            return Ok(None);
        }

        let input = input.into();
        let text = input.as_onig_string();
        let utf8_start = text.convert_utf16_offset_to_utf8(to_offset(start_position));
        let content = text.utf8_content();

        let found = self
            .borrow_cache()?
            .find_best_match(self.id, &self.sources, content, utf8_start)?;
        let Some(found) = found else {
            return Ok(None);
        };

        // unmatched groups sit at the end of the text with zero length
        let unmatched = ByteSpan::new(content.len(), content.len());
        let translate = text.has_multi_byte_characters();
        let capture_indices = found
            .captures
            .iter()
            .enumerate()
            .map(|(index, span)| {
                let span = span.unwrap_or(unmatched);
                if translate {
                    CaptureIndex::new(index, to_utf16(text, span.start), to_utf16(text, span.end))
                } else {
                    CaptureIndex::new(index, span.start, span.end)
                }
            })
            .collect();

        Ok(Some(OnigMatch {
            index: found.pattern_index,
            capture_indices,
        }))
    }

    /// Callback form of `find_next_match_sync`. The callback runs before this
    /// returns and after the cache borrow is released, so it may search again.
    pub fn find_next_match<'a, F>(&self, input: impl Into<ScanInput<'a>>, start_position: usize, callback: F)
    where
        F: FnOnce(Result<Option<OnigMatch>, ScanError>),
    {
        let result = self.find_next_match_sync(input, start_position);
        callback(result);
    }

    /// Release this scanner's compiled patterns now. The scanner stays usable
    /// and recompiles on its next search. Returns false if nothing was cached.
    pub fn dispose(&self) -> Result<bool, ScanError> {
        self.borrow_cache()?.evict(self.id)
    }

    fn borrow_cache(&self) -> Result<RefMut<'_, PatternCache>, ScanError> {
        self.cache.try_borrow_mut().map_err(|_| ScanError::CacheUnavailable)
    }
}

impl Drop for OnigScanner {
    fn drop(&mut self) {
        match self.cache.try_borrow_mut() {
            Ok(mut cache) => {
                if let Err(e) = cache.evict(self.id) {
                    console::warn(&format!("[OnigScanner] Failed to release scanner {}: {}", self.id, e));
                }
            }
            Err(_) => {
                // left in place; the LRU policy releases it later
                console::warn(&format!(
                    "[OnigScanner] Cache busy while dropping scanner {}",
                    self.id
                ));
            }
        };
    }
}

fn to_offset(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

fn to_utf16(text: &OnigString, utf8_offset: usize) -> usize {
    text.convert_utf8_offset_to_utf16(to_offset(utf8_offset))
}
