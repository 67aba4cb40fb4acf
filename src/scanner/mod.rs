//! Scanners and their match results
//!
//! `OnigScanner` finds the best match across many patterns; `OnigRegExp` is
//! the single-pattern facade over it. All offsets in results are UTF-16
//! code unit indices into the searched text.

pub mod onig_regexp;
pub mod onig_scanner;


pub use onig_regexp::*;
pub use onig_scanner::*;

use serde::{Deserialize, Serialize};

/// One capture of a match: `index` 0 is the whole match
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaptureIndex {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

impl CaptureIndex {
    pub fn new(index: usize, start: usize, end: usize) -> Self {
        Self {
            index,
            start,
            end,
            length: end.saturating_sub(start),
        }
    }
}

/// Result of `OnigScanner::find_next_match_sync`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnigMatch {
    /// Index of the winning pattern in the scanner's pattern list
    pub index: usize,
    pub capture_indices: Vec<CaptureIndex>,
}

/// A capture decorated with the text it matched, as returned by `OnigRegExp::search_sync`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OnigCapture {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub length: usize,
    #[serde(rename = "match")]
    pub matched: String,
}
