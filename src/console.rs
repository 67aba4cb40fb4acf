//! Browser console logging
//!
//! Messages go to `console.log` / `console.warn` on wasm32. Native builds have
//! no console, so the calls compile to nothing there; native test builds keep
//! the messages per thread so tests can assert on them.

#[cfg(all(test, not(target_arch = "wasm32")))]
thread_local! {
    static CAPTURED: std::cell::RefCell<Vec<String>> = std::cell::RefCell::new(Vec::new());
}

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    capture(message);
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    capture(message);
}

#[cfg(all(test, not(target_arch = "wasm32")))]
fn capture(message: &str) {
    CAPTURED.with(|captured| captured.borrow_mut().push(message.to_string()));
}

#[cfg(all(not(test), not(target_arch = "wasm32")))]
fn capture(_message: &str) {}

/// Drain the messages logged on this thread
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) fn take_captured() -> Vec<String> {
    CAPTURED.with(|captured| std::mem::take(&mut *captured.borrow_mut()))
}
