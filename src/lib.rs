//! KittScan: Multi-Pattern Regex Scanner
//!
//! A Rust/WASM scanning layer for grammar-based syntax highlighters.
//!
//! # Architecture
//!
//! - `text` - OnigString: lazy UTF-8 encoding + sparse UTF-16 <-> UTF-8 offset table
//! - `engine` - RegexEngine: the compile / find-best-match / dispose capability
//! - `cache` - PatternCache: bounded LRU of compiled pattern sets per scanner
//! - `scanner` - OnigScanner (many patterns) and OnigRegExp (single pattern facade)
//! - `wasm` - JavaScript bindings (OnigScanner, OnigRegExp, OnigString classes)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { OnigScanner, OnigRegExp } from 'kittscan';
//!
//! await init();
//!
//! const scanner = new OnigScanner(['\\d+', '[a-z]+']);
//! const match = scanner.findNextMatchSync('ab12cd', 0);
//! console.log(match.index);           // 1
//! console.log(match.captureIndices);  // [{ index: 0, start: 0, end: 2, length: 2 }]
//!
//! const re = new OnigRegExp('é');
//! re.searchSync('café');              // [{ index: 0, start: 3, end: 4, length: 1, match: 'é' }]
//! ```
//!
//! # Usage (Rust)
//! ```ignore
//! use kittscan::OnigScanner;
//!
//! let scanner = OnigScanner::new(&[r"\d+", "[a-z]+"]);
//! let found = scanner.find_next_match_sync("ab12cd", 0)?.unwrap();
//! assert_eq!(found.index, 1);
//! ```

pub mod cache;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod scanner;
pub mod text;
pub mod wasm;

pub use cache::{default_cache, CacheStats, PatternCache, ScannerId, SharedPatternCache};
pub use config::ScannerConfig;
pub use engine::{BestMatch, ByteSpan, EngineStatus, PatternHandle, RegexEngine, RustRegexEngine};
pub use error::ScanError;
pub use scanner::*;
pub use text::{OnigString, ScanInput};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("kittscan v{}", env!("CARGO_PKG_VERSION"))
}
