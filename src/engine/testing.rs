//! Fault-injecting engine for exercising error paths in tests

use std::cell::Cell;
use std::rc::Rc;

use super::{BestMatch, EngineStatus, PatternHandle, RegexEngine, RustRegexEngine};

/// Switches shared with the test after the engine moves into a cache
#[derive(Debug, Default, Clone)]
pub(crate) struct Faults {
    pub fail_match: Rc<Cell<bool>>,
    pub fail_dispose: Rc<Cell<bool>>,
    pub compile_calls: Rc<Cell<usize>>,
    pub live: Rc<Cell<usize>>,
}

pub(crate) struct FaultyEngine {
    inner: RustRegexEngine,
    faults: Faults,
    last_error: Vec<u8>,
}

impl FaultyEngine {
    pub fn new() -> (Self, Faults) {
        let faults = Faults::default();
        let engine = Self {
            inner: RustRegexEngine::new(),
            faults: faults.clone(),
            last_error: Vec::new(),
        };
        (engine, faults)
    }

    fn sync_live(&self) {
        self.faults.live.set(self.inner.live_pattern_count());
    }

    fn capture_error(&mut self) {
        self.last_error = self.inner.last_error().to_vec();
    }
}

impl RegexEngine for FaultyEngine {
    fn compile_pattern(&mut self, pattern: &[u8]) -> Result<PatternHandle, EngineStatus> {
        self.faults.compile_calls.set(self.faults.compile_calls.get() + 1);
        let result = self.inner.compile_pattern(pattern);
        if result.is_err() {
            self.capture_error();
        }
        self.sync_live();
        result
    }

    fn find_best_match(
        &mut self,
        handles: &[PatternHandle],
        text: &[u8],
        start: usize,
    ) -> Result<Option<BestMatch>, EngineStatus> {
        if self.faults.fail_match.get() {
            self.last_error = b"search failed: retry-limit-in-match over".to_vec();
            return Err(EngineStatus(-1));
        }
        let result = self.inner.find_best_match(handles, text, start);
        if result.is_err() {
            self.capture_error();
        }
        result
    }

    fn dispose_compiled_patterns(&mut self, handles: &[PatternHandle]) -> Result<(), EngineStatus> {
        if self.faults.fail_dispose.get() {
            self.last_error = b"dispose failed: corrupted region".to_vec();
            return Err(EngineStatus(-2));
        }
        let result = self.inner.dispose_compiled_patterns(handles);
        if result.is_err() {
            self.capture_error();
        }
        self.sync_live();
        result
    }

    fn last_error(&self) -> &[u8] {
        &self.last_error
    }

    fn live_pattern_count(&self) -> usize {
        self.inner.live_pattern_count()
    }
}
