//! Regex engine capability
//!
//! The scanner never matches text itself. It drives an engine through four
//! calls: compile one pattern, find the best match across compiled patterns,
//! dispose compiled patterns, and read the last error text. Compiled patterns
//! are referenced by opaque `PatternHandle` ids into a table the engine owns.

pub mod regex_engine;

#[cfg(test)]
pub(crate) mod testing;

pub use regex_engine::RustRegexEngine;

/// Opaque reference to a compiled pattern held by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternHandle(u32);

impl PatternHandle {
    pub(crate) fn from_slot(slot: u32) -> Self {
        PatternHandle(slot)
    }

    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Non-zero failure status returned by an engine call.
/// The failure detail is available from `RegexEngine::last_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus(pub i32);

impl EngineStatus {
    pub const COMPILE_FAILED: EngineStatus = EngineStatus(1);
    pub const INVALID_HANDLE: EngineStatus = EngineStatus(2);
    pub const INVALID_INPUT: EngineStatus = EngineStatus(3);
}

/// Half-open UTF-8 byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Winning match across a set of compiled patterns.
///
/// `captures[0]` is the whole match, `captures[k]` is group `k`; `None`
/// marks a group that did not take part in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMatch {
    pub pattern_index: usize,
    pub captures: Vec<Option<ByteSpan>>,
}

/// The compile / match / dispose capability the scanner is built on
pub trait RegexEngine {
    /// Compile one UTF-8, NUL-terminated pattern
    fn compile_pattern(&mut self, pattern: &[u8]) -> Result<PatternHandle, EngineStatus>;

    /// Earliest match at or after byte `start`. Among patterns matching at the
    /// same byte, the lowest index in `handles` wins. `text` excludes the NUL.
    fn find_best_match(
        &mut self,
        handles: &[PatternHandle],
        text: &[u8],
        start: usize,
    ) -> Result<Option<BestMatch>, EngineStatus>;

    /// Release a batch of compiled patterns
    fn dispose_compiled_patterns(&mut self, handles: &[PatternHandle]) -> Result<(), EngineStatus>;

    /// UTF-8 text of the most recent failure
    fn last_error(&self) -> &[u8];

    /// Number of compiled patterns currently held
    fn live_pattern_count(&self) -> usize;
}
