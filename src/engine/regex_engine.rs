//! RustRegexEngine - RegexEngine backed by the `regex` crate
//!
//! Compiled patterns live in an arena of slots; a handle is a slot index.
//! Released slots go on a free list and are reused by later compilations.
//! Using a handle that is not live is an error, never a silent no-op.

use regex::bytes::{Regex, RegexBuilder};

use super::{BestMatch, ByteSpan, EngineStatus, PatternHandle, RegexEngine};

/// Arena-backed engine over `regex::bytes::Regex`
#[derive(Debug, Default)]
pub struct RustRegexEngine {
    slots: Vec<Option<Regex>>,
    free_slots: Vec<u32>,
    live: usize,
    last_error: String,
}

impl RustRegexEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, status: EngineStatus, message: String) -> EngineStatus {
        self.last_error = message;
        status
    }

    fn is_live(&self, handle: PatternHandle) -> bool {
        matches!(self.slots.get(handle.slot()), Some(Some(_)))
    }
}

impl RegexEngine for RustRegexEngine {
    fn compile_pattern(&mut self, pattern: &[u8]) -> Result<PatternHandle, EngineStatus> {
        let pattern = match pattern.split_last() {
            Some((0, rest)) => rest,
            _ => pattern,
        };
        let source = match std::str::from_utf8(pattern) {
            Ok(source) => source,
            Err(e) => {
                return Err(self.fail(
                    EngineStatus::INVALID_INPUT,
                    format!("Pattern is not valid UTF-8: {}", e),
                ))
            }
        };

        // `^` and `$` anchor at line boundaries, as in Ruby syntax
        let regex = match RegexBuilder::new(source).multi_line(true).build() {
            Ok(regex) => regex,
            Err(e) => return Err(self.fail(EngineStatus::COMPILE_FAILED, e.to_string())),
        };

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(regex);
                slot
            }
            None => {
                self.slots.push(Some(regex));
                (self.slots.len() - 1) as u32
            }
        };
        self.live += 1;
        Ok(PatternHandle::from_slot(slot))
    }

    fn find_best_match(
        &mut self,
        handles: &[PatternHandle],
        text: &[u8],
        start: usize,
    ) -> Result<Option<BestMatch>, EngineStatus> {
        if let Some(bad) = handles.iter().find(|h| !self.is_live(**h)) {
            let message = format!("Invalid pattern handle {}", bad.slot());
            return Err(self.fail(EngineStatus::INVALID_HANDLE, message));
        }
        if start > text.len() {
            return Ok(None);
        }

        let mut best: Option<(usize, regex::bytes::Captures<'_>)> = None;
        for (pattern_index, handle) in handles.iter().enumerate() {
            let Some(Some(regex)) = self.slots.get(handle.slot()) else {
                continue;
            };
            let Some(caps) = regex.captures_at(text, start) else {
                continue;
            };
            let match_start = caps.get(0).map_or(usize::MAX, |m| m.start());

            // strict `<` keeps the lowest pattern index on ties
            let is_better = match &best {
                None => true,
                Some((_, current)) => match_start < current.get(0).map_or(usize::MAX, |m| m.start()),
            };
            if is_better {
                best = Some((pattern_index, caps));
                if match_start == start {
                    break;
                }
            }
        }

        Ok(best.map(|(pattern_index, caps)| BestMatch {
            pattern_index,
            captures: caps
                .iter()
                .map(|group| group.map(|m| ByteSpan::new(m.start(), m.end())))
                .collect(),
        }))
    }

    fn dispose_compiled_patterns(&mut self, handles: &[PatternHandle]) -> Result<(), EngineStatus> {
        // validate the whole batch first so a bad batch releases nothing
        for (i, handle) in handles.iter().enumerate() {
            let repeated = handles[..i].contains(handle);
            if repeated || !self.is_live(*handle) {
                let message = format!("Pattern handle {} is not live", handle.slot());
                return Err(self.fail(EngineStatus::INVALID_HANDLE, message));
            }
        }

        for handle in handles {
            self.slots[handle.slot()] = None;
            self.free_slots.push(handle.slot() as u32);
            self.live -= 1;
        }
        Ok(())
    }

    fn last_error(&self) -> &[u8] {
        self.last_error.as_bytes()
    }

    fn live_pattern_count(&self) -> usize {
        self.live
    }
}
