//! JavaScript bindings
//!
//! Exposes `OnigScanner`, `OnigRegExp` and `OnigString` under the class and
//! method names TextMate tokenizers call, plus `configure()` and
//! `cacheStats()` for the shared pattern cache. Loose JS inputs are
//! normalized here so the Rust types below only see strings and integers.

use js_sys::{Array, Function, JsString};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::cache::{configure_default_cache, default_cache};
use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::scanner::{OnigCapture, OnigMatch, OnigRegExp, OnigScanner, RegExpSource, TestSubject};
use crate::text::{normalize_start_position, parse_start_position, OnigString};

#[wasm_bindgen]
extern "C" {
    /// The global `String(value)` conversion
    #[wasm_bindgen(js_name = String, catch)]
    fn js_string(value: &JsValue) -> Result<JsString, JsValue>;
}

// ==================== CONVERSIONS ====================

fn to_js_error(error: ScanError) -> JsValue {
    let message = error.to_string();
    if error.is_invalid_argument() {
        js_sys::TypeError::new(&message).into()
    } else {
        js_sys::Error::new(&message).into()
    }
}

fn type_error(message: &str) -> JsValue {
    js_sys::TypeError::new(message).into()
}

/// `undefined` and `null` become their names, strings keep their UTF-16
/// code units, anything else goes through `String(value)`
fn convert_to_string(value: &JsValue) -> Result<OnigString, JsValue> {
    let text = match value.dyn_ref::<JsString>() {
        Some(text) => text.clone(),
        None => js_string(value)?,
    };
    Ok(OnigString::from_utf16(text.iter().collect()))
}

/// `parseInt(value, 10)` clamped to a non-negative integer; absent means 0
fn convert_to_number(value: &JsValue) -> Result<usize, JsValue> {
    if let Some(number) = value.as_f64() {
        return Ok(normalize_start_position(number));
    }
    if value.is_undefined() || value.is_null() {
        return Ok(0);
    }
    let text = String::from(js_string(value)?);
    Ok(parse_start_position(&text))
}

/// Accept `(string, callback)` in place of `(string, startPosition, callback)`
fn split_callback(start_position: JsValue, callback: JsValue) -> (JsValue, Option<Function>) {
    if start_position.is_function() {
        (JsValue::UNDEFINED, start_position.dyn_into::<Function>().ok())
    } else {
        (start_position, callback.dyn_into::<Function>().ok())
    }
}

/// Node-style delivery: `callback(null, result)` or `callback(error)`
fn deliver(callback: &Function, result: Result<JsValue, JsValue>) -> Result<(), JsValue> {
    match result {
        Ok(value) => callback.call2(&JsValue::NULL, &JsValue::NULL, &value)?,
        Err(error) => callback.call1(&JsValue::NULL, &error)?,
    };
    Ok(())
}

fn match_to_js(found: Option<OnigMatch>) -> Result<JsValue, JsValue> {
    match found {
        Some(found) => serde_wasm_bindgen::to_value(&found).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(JsValue::NULL),
    }
}

fn captures_to_js(captures: Option<Vec<OnigCapture>>) -> Result<JsValue, JsValue> {
    match captures {
        Some(captures) => serde_wasm_bindgen::to_value(&captures).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(JsValue::NULL),
    }
}

// ==================== OnigString ====================

#[wasm_bindgen(js_name = OnigString)]
pub struct JsOnigString {
    inner: OnigString,
}

#[wasm_bindgen(js_class = OnigString)]
impl JsOnigString {
    #[wasm_bindgen(constructor)]
    pub fn new(content: JsValue) -> Result<JsOnigString, JsValue> {
        let Some(content) = content.dyn_ref::<JsString>() else {
            return Err(type_error("Argument must be a string"));
        };
        Ok(JsOnigString {
            inner: OnigString::from_utf16(content.iter().collect()),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn content(&self) -> JsString {
        JsString::from_char_code(self.inner.content())
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// UTF-8 encoding with the trailing NUL byte
    #[wasm_bindgen(getter, js_name = utf8Bytes)]
    pub fn utf8_bytes(&self) -> Vec<u8> {
        self.inner.utf8_bytes().to_vec()
    }

    #[wasm_bindgen(getter, js_name = hasMultiByteCharacters)]
    pub fn has_multi_byte_characters(&self) -> bool {
        self.inner.has_multi_byte_characters()
    }

    #[wasm_bindgen(js_name = convertUtf16OffsetToUtf8)]
    pub fn convert_utf16_offset_to_utf8(&self, offset: f64) -> usize {
        // NaN maps to 0 and out-of-range values saturate
        self.inner.convert_utf16_offset_to_utf8(offset.trunc() as i64)
    }

    #[wasm_bindgen(js_name = convertUtf8OffsetToUtf16)]
    pub fn convert_utf8_offset_to_utf16(&self, offset: f64) -> usize {
        self.inner.convert_utf8_offset_to_utf16(offset.trunc() as i64)
    }

    pub fn substring(&self, start: usize, end: usize) -> String {
        self.inner.substring(start, end)
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_js_string(&self) -> JsString {
        self.content()
    }
}

// ==================== OnigScanner ====================

#[wasm_bindgen(js_name = OnigScanner)]
pub struct JsOnigScanner {
    inner: OnigScanner,
}

#[wasm_bindgen(js_class = OnigScanner)]
impl JsOnigScanner {
    #[wasm_bindgen(constructor)]
    pub fn new(patterns: JsValue) -> Result<JsOnigScanner, JsValue> {
        const MESSAGE: &str = "First parameter to OnigScanner constructor must be array of (pattern) strings";

        if !Array::is_array(&patterns) {
            return Err(type_error(MESSAGE));
        }
        let sources = Array::from(&patterns)
            .iter()
            .map(|pattern| pattern.as_string().ok_or_else(|| type_error(MESSAGE)))
            .collect::<Result<Vec<String>, JsValue>>()?;

        Ok(JsOnigScanner {
            inner: OnigScanner::new(&sources),
        })
    }

    /// Copy of the pattern list
    #[wasm_bindgen(getter)]
    pub fn patterns(&self) -> Array {
        self.inner.patterns().iter().map(JsValue::from).collect()
    }

    #[wasm_bindgen(js_name = findNextMatchSync)]
    pub fn find_next_match_sync(&self, string: JsValue, start_position: JsValue) -> Result<JsValue, JsValue> {
        let text = convert_to_string(&string)?;
        let start = convert_to_number(&start_position)?;
        let found = self.inner.find_next_match_sync(text, start).map_err(to_js_error)?;
        match_to_js(found)
    }

    /// Search a prebuilt `OnigString`, reusing its UTF-8 encoding
    #[wasm_bindgen(js_name = findNextMatchInString)]
    pub fn find_next_match_in_string(&self, string: &JsOnigString, start_position: JsValue) -> Result<JsValue, JsValue> {
        let start = convert_to_number(&start_position)?;
        let found = self
            .inner
            .find_next_match_sync(&string.inner, start)
            .map_err(to_js_error)?;
        match_to_js(found)
    }

    #[wasm_bindgen(js_name = findNextMatch)]
    pub fn find_next_match(&self, string: JsValue, start_position: JsValue, callback: JsValue) -> Result<(), JsValue> {
        let (start_position, callback) = split_callback(start_position, callback);
        let callback = callback.ok_or_else(|| type_error("callback is not a function"))?;
        let result = self.find_next_match_sync(string, start_position);
        deliver(&callback, result)
    }

    /// Release compiled patterns now; the scanner recompiles on next use
    pub fn dispose(&self) -> Result<bool, JsValue> {
        self.inner.dispose().map_err(to_js_error)
    }
}

// ==================== OnigRegExp ====================

#[wasm_bindgen(js_name = OnigRegExp)]
pub struct JsOnigRegExp {
    inner: OnigRegExp,
}

#[wasm_bindgen(js_class = OnigRegExp)]
impl JsOnigRegExp {
    #[wasm_bindgen(constructor)]
    pub fn new(source: JsValue) -> Result<JsOnigRegExp, JsValue> {
        let source = if let Some(pattern) = source.as_string() {
            RegExpSource::Pattern(pattern)
        } else if let Some(literal) = source.as_bool() {
            RegExpSource::Literal(literal)
        } else {
            return Err(type_error("First parameter to OnigRegExp constructor must be a pattern string"));
        };
        Ok(JsOnigRegExp {
            inner: OnigRegExp::new(source),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn source(&self) -> JsValue {
        match self.inner.source() {
            RegExpSource::Pattern(pattern) => JsValue::from_str(pattern),
            RegExpSource::Literal(literal) => JsValue::from_bool(*literal),
        }
    }

    #[wasm_bindgen(js_name = searchSync)]
    pub fn search_sync(&self, string: JsValue, start_position: JsValue) -> Result<JsValue, JsValue> {
        let text = convert_to_string(&string)?;
        let start = convert_to_number(&start_position)?;
        let captures = self.inner.search_sync(text, start).map_err(to_js_error)?;
        captures_to_js(captures)
    }

    pub fn search(&self, string: JsValue, start_position: JsValue, callback: JsValue) -> Result<(), JsValue> {
        let (start_position, callback) = split_callback(start_position, callback);
        let callback = callback.ok_or_else(|| type_error("callback is not a function"))?;
        let result = self.search_sync(string, start_position);
        deliver(&callback, result)
    }

    #[wasm_bindgen(js_name = testSync)]
    pub fn test_sync(&self, string: JsValue) -> Result<bool, JsValue> {
        let subject = match string.as_bool() {
            Some(literal) => TestSubject::Literal(literal),
            None => TestSubject::from(convert_to_string(&string)?),
        };
        self.inner.test_sync(subject).map_err(to_js_error)
    }

    /// Callback is optional; without one the result is discarded
    pub fn test(&self, string: JsValue, callback: JsValue) -> Result<(), JsValue> {
        let result = self.test_sync(string).map(JsValue::from_bool);
        match callback.dyn_into::<Function>() {
            Ok(callback) => deliver(&callback, result),
            Err(_) => Ok(()),
        }
    }
}

// ==================== CACHE CONTROL ====================

/// Configure the shared pattern cache: `{ cache_capacity, log_evictions }`
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsValue> {
    let config: ScannerConfig = if config.is_undefined() || config.is_null() {
        ScannerConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| type_error(&format!("Invalid scanner config: {}", e)))?
    };

    configure_default_cache(&config).map_err(to_js_error)
}

/// Counters of the shared pattern cache
#[wasm_bindgen(js_name = cacheStats)]
pub fn cache_stats() -> Result<JsValue, JsValue> {
    let cache = default_cache();
    let cache = cache.try_borrow().map_err(|_| to_js_error(ScanError::CacheUnavailable))?;
    let stats = cache.stats();

    let status = serde_json::json!({
        "hits": stats.hits,
        "misses": stats.misses,
        "compilations": stats.compilations,
        "evictions": stats.evictions,
        "releaseFailures": stats.release_failures,
        "liveEntries": stats.live_entries,
        "livePatterns": cache.live_pattern_count(),
        "capacity": stats.capacity,
    });

    status
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
